//! HTTP server implementation

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::compression::CompressionLayer;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::handlers::AppState;
use crate::api::routes;
use crate::config::AppConfig;
use crate::rag::ChatOrchestrator;
use crate::session::SessionMemory;
use crate::Result;

/// How often idle sessions are swept
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Build the application router around an orchestrator
pub fn build_router(state: AppState, enable_cors: bool, max_concurrent_requests: usize) -> Router {
    let mut app = routes::api_routes(state)
        .layer(ConcurrencyLimitLayer::new(max_concurrent_requests.max(1)))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    // Add CORS if enabled
    if enable_cors {
        info!("CORS enabled");
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

/// Start the API server
///
/// # Errors
/// - Service construction failures (config, database, HTTP clients)
/// - Bind or serve errors
pub async fn serve_api(config: &AppConfig, host: String, port: u16) -> Result<()> {
    info!("Starting profile chat API server...");

    let memory = Arc::new(SessionMemory::new());
    let orchestrator = Arc::new(ChatOrchestrator::from_config(config, Arc::clone(&memory)).await?);

    let _sweeper = memory.spawn_sweeper(
        Duration::from_secs(config.chat.session_timeout_secs),
        SWEEP_INTERVAL,
    );

    let app = build_router(
        AppState::new(orchestrator),
        config.server.enable_cors,
        config.server.max_concurrent_requests,
    );

    // Start server
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("API server listening on http://{}", addr);
    info!("Available endpoints:");
    info!("  GET  /health - Health check");
    info!("  POST /chat   - Chat with the profile assistant");

    axum::serve(listener, app).await?;

    Ok(())
}
