use clap::Parser;
use profilechat::cli::*;
use profilechat::config::AppConfig;
use profilechat::Result;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::load()?,
    };

    // Initialize logging
    if cli.verbose {
        profilechat::logging::init_logging_with_level("debug")?;
    } else {
        profilechat::logging::init_logging_with_config(Some(&config))?;
    }
    info!("Configuration loaded successfully");

    // Execute the requested command
    match cli.command {
        Commands::Serve { host, port } => {
            handle_serve_command(&config, host, port).await?;
        }
        Commands::Ask { message, session } => {
            handle_ask_command(&config, &message, &session).await?;
        }
        Commands::Init => {
            handle_init_command(&config).await?;
        }
        Commands::Config => {
            handle_config_command(&config)?;
        }
    }

    Ok(())
}
