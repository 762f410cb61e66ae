//! Logging configuration for profilechat

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Registry;

use crate::Result;

const LOG_DIR: &str = "logs";
const LOG_FILE: &str = "profilechat.log";

/// Initialize logging from the `[logging]` section of the configuration
///
/// # Errors
/// - Failure to create the log directory
pub fn init_logging_with_config(config: Option<&crate::config::AppConfig>) -> Result<()> {
    // Fallback to RUST_LOG or a debug-friendly default when no config is present
    let env_filter = match config {
        Some(config) => filter_for_level(&config.logging.level),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,profilechat=debug")),
    };

    let level = config.map_or("info", |c| c.logging.level.as_str());
    install(env_filter, level)
}

/// Initialize logging with a custom log level
///
/// # Errors
/// - Failure to create the log directory
pub fn init_logging_with_level(level: &str) -> Result<()> {
    install(filter_for_level(level), level)
}

fn filter_for_level(level: &str) -> EnvFilter {
    EnvFilter::new(format!("{level},profilechat={level}"))
}

fn install(env_filter: EnvFilter, level: &str) -> Result<()> {
    let logs_dir = Path::new(LOG_DIR);
    if !logs_dir.exists() {
        std::fs::create_dir_all(logs_dir)?;
    }

    let file_appender = tracing_appender::rolling::daily(LOG_DIR, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);

    let file_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(non_blocking)
        .with_ansi(false); // No colors in file

    Registry::default()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    tracing::info!("Logging initialized with level: {} - console and file output enabled", level);
    tracing::info!("Log files will be saved to: {}/{}.YYYY-MM-DD", LOG_DIR, LOG_FILE);

    keep_guard(guard);
    Ok(())
}

// The non-blocking writer flushes only while its guard is alive; logging lives
// for the whole process.
fn keep_guard(guard: WorkerGuard) {
    std::mem::forget(guard);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_for_level_parses() {
        let filter = filter_for_level("warn");
        assert!(filter.to_string().contains("profilechat=warn"));
    }
}
