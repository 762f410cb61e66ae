use thiserror::Error;

/// Upstream collaborators a request can depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamService {
    LanguageModel,
    Embeddings,
    DocumentStore,
}

impl std::fmt::Display for UpstreamService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LanguageModel => write!(f, "language model"),
            Self::Embeddings => write!(f, "embedding service"),
            Self::DocumentStore => write!(f, "document store"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ProfileChatError {
    #[error("{service} unavailable: {message}")]
    UpstreamUnavailable {
        service: UpstreamService,
        message: String,
    },

    #[error("Malformed upstream response: {0}")]
    MalformedUpstreamResponse(String),

    #[error("Stage '{stage}' timed out")]
    Timeout { stage: &'static str },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProfileChatError {
    /// Build an `UpstreamUnavailable` error for the given service
    pub fn upstream(service: UpstreamService, message: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            service,
            message: message.into(),
        }
    }

    /// True when the failure came from an external service rather than
    /// from missing data or a local problem.
    #[must_use]
    pub const fn is_upstream_failure(&self) -> bool {
        matches!(
            self,
            Self::UpstreamUnavailable { .. }
                | Self::MalformedUpstreamResponse(_)
                | Self::Timeout { .. }
                | Self::Database(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ProfileChatError>;

/// Pass a successful response through; turn any other status into an
/// `UpstreamUnavailable` carrying the status and body
pub(crate) async fn check_status(
    response: reqwest::Response,
    service: UpstreamService,
    provider: &str,
) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(ProfileChatError::upstream(
        service,
        format!("{provider} API error ({status}): {error_text}"),
    ))
}
