//! Embedding service used by the chat pipeline

use async_trait::async_trait;
use tracing::debug;
use tracing::warn;

use super::client::EmbeddingClient;
use super::preprocess_text_for_embedding;
use super::Embedder;
use crate::config::EmbeddingsConfig;
use crate::errors::ProfileChatError;
use crate::errors::Result;

/// Preprocesses text, calls the configured provider and checks the result
pub struct EmbeddingService {
    client: EmbeddingClient,
    dimension: usize,
}

impl EmbeddingService {
    /// Create a new embedding service
    ///
    /// # Errors
    /// - HTTP client build errors
    pub fn new(config: &EmbeddingsConfig) -> Result<Self> {
        let client = EmbeddingClient::new(
            config.provider,
            config.model.clone(),
            config.endpoint.clone(),
            config.api_key.clone(),
        )?;

        Ok(Self {
            client,
            dimension: config.dimension,
        })
    }
}

#[async_trait]
impl Embedder for EmbeddingService {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if self.client.missing_credential() {
            warn!(
                "No API key configured for {} embeddings; retrieval disabled",
                self.client.provider()
            );
            return Ok(Vec::new());
        }

        let Some(processed) = preprocess_text_for_embedding(text) else {
            debug!("Nothing to embed after preprocessing");
            return Ok(Vec::new());
        };

        let embedding = self.client.generate(&processed).await?;
        if embedding.is_empty() {
            warn!("Embedding provider returned an empty vector");
            return Ok(embedding);
        }
        if embedding.len() != self.dimension {
            return Err(ProfileChatError::MalformedUpstreamResponse(format!(
                "expected {}-dimensional embedding, got {}",
                self.dimension,
                embedding.len()
            )));
        }
        Ok(embedding)
    }
}
