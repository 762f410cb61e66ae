//! API request handlers

use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::http::HeaderMap;
use axum::http::HeaderValue;
use axum::Json;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;
use tracing::warn;

use crate::api::types::ApiError;
use crate::api::types::ApiResponse;
use crate::api::types::ChatRequest;
use crate::api::types::ChatResponse;
use crate::api::types::HealthResponse;
use crate::errors::ProfileChatError;
use crate::rag::ChatOrchestrator;

/// Cookie carrying the session id between requests
pub const SESSION_COOKIE: &str = "session";

/// Session ids are echoed into `Set-Cookie`, so only token characters pass
static SESSION_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,128}$").expect("valid session id regex"));

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ChatOrchestrator>,
}

impl AppState {
    pub fn new(orchestrator: Arc<ChatOrchestrator>) -> Self {
        Self { orchestrator }
    }
}

/// Health check handler
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        active_sessions: state.orchestrator.memory().session_count(),
    }))
}

/// Chat (POST /chat)
pub async fn chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ChatRequest>,
) -> Result<(HeaderMap, Json<ChatResponse>), ApiError> {
    let session_id = resolve_session_id(req.session_id.as_deref(), &headers)?;
    info!("POST /chat for session {}", session_id);

    let reply = state.orchestrator.handle(&session_id, &req.message).await?;

    let mut response_headers = HeaderMap::new();
    if let Ok(cookie) =
        HeaderValue::from_str(&format!("{SESSION_COOKIE}={session_id}; Path=/; HttpOnly"))
    {
        response_headers.insert(header::SET_COOKIE, cookie);
    }

    Ok((
        response_headers,
        Json(ChatResponse {
            response: reply.response,
            session_id,
        }),
    ))
}

/// Body field first, then the session cookie, then a new id
///
/// A malformed id in the body is rejected. A malformed cookie is ignored and
/// the caller gets a fresh session.
fn resolve_session_id(explicit: Option<&str>, headers: &HeaderMap) -> Result<String, ApiError> {
    if let Some(id) = explicit.map(str::trim).filter(|id| !id.is_empty()) {
        if !SESSION_ID.is_match(id) {
            return Err(ProfileChatError::InvalidRequest(
                "session_id may only contain letters, digits, '-' and '_' (max 128)".to_string(),
            )
            .into());
        }
        return Ok(id.to_string());
    }

    Ok(session_from_cookie(headers).unwrap_or_else(|| uuid::Uuid::new_v4().to_string()))
}

fn session_from_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .and_then(|(_, value)| {
            if SESSION_ID.is_match(value) {
                Some(value.to_string())
            } else {
                warn!("Ignoring malformed session cookie");
                None
            }
        })
}
