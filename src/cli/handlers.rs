//! CLI command handlers

use std::sync::Arc;

use crate::api::serve_api;
use crate::cli::output::*;
use crate::database::Database;
use crate::rag::ChatOrchestrator;
use crate::session::SessionMemory;
use crate::AppConfig;
use crate::Result;

/// Handle serve command
pub async fn handle_serve_command(
    config: &AppConfig,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    println!("🚀 Starting Profile Chat API Server");
    println!("===================================\n");
    println!("📍 Host: {host}");
    println!("🔌 Port: {port}");
    println!(
        "🌐 CORS: {}",
        if config.server.enable_cors {
            "Enabled"
        } else {
            "Disabled"
        }
    );
    println!();

    serve_api(config, host, port).await
}

/// Handle ask command
pub async fn handle_ask_command(config: &AppConfig, message: &str, session: &str) -> Result<()> {
    let memory = Arc::new(SessionMemory::new());
    let orchestrator = ChatOrchestrator::from_config(config, memory).await?;

    let reply = orchestrator.handle(session, message).await?;
    print_reply(&reply);
    Ok(())
}

/// Handle init command
pub async fn handle_init_command(config: &AppConfig) -> Result<()> {
    config.validate()?;
    let db = Database::from_config(config).await?;
    db.init_schema().await?;
    print_success(&format!(
        "Schema initialized: table {} with index {}",
        config.retrieval.table, config.retrieval.index_name
    ));
    Ok(())
}

/// Handle config command
pub fn handle_config_command(config: &AppConfig) -> Result<()> {
    print_config(config);
    if let Err(e) = config.validate() {
        print_info(&format!("Configuration problem: {e}"));
    }
    Ok(())
}
