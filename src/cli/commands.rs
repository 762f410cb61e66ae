//! CLI command definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(name = "profilechat")]
#[command(about = "Conversational assistant answering questions about a professional profile")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging (default: info level)
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to the configuration file (default: config.toml, then config.example.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP chat server
    Serve {
        /// Host to bind (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Ask a single question through the chat pipeline
    Ask {
        /// The message to send
        message: String,
        /// Session id to attribute the exchange to
        #[arg(short, long, default_value = "cli")]
        session: String,
    },
    /// Initialize database schema and vector index
    Init,
    /// Show current configuration
    Config,
}
