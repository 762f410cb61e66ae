//! Embedding API clients for various providers

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::config::ProviderKind;
use crate::errors::check_status;
use crate::errors::ProfileChatError;
use crate::errors::Result;
use crate::errors::UpstreamService;

const SERVICE: UpstreamService = UpstreamService::Embeddings;

/// Client for generating embeddings from various providers
pub struct EmbeddingClient {
    provider: ProviderKind,
    model: String,
    endpoint: String,
    api_key: Option<String>,
    client: Client,
}

impl EmbeddingClient {
    /// Create a new embedding client
    ///
    /// # Errors
    /// - HTTP client build errors (invalid configuration)
    pub fn new(
        provider: ProviderKind,
        model: String,
        endpoint: String,
        api_key: Option<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ProfileChatError::HttpError(e.to_string()))?;

        Ok(Self {
            provider,
            model,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            client,
        })
    }

    /// Whether a credential is needed and absent
    #[must_use]
    pub const fn missing_credential(&self) -> bool {
        !matches!(self.provider, ProviderKind::Ollama) && self.api_key.is_none()
    }

    #[must_use]
    pub const fn provider(&self) -> ProviderKind {
        self.provider
    }

    /// Generate embedding for a single text
    ///
    /// # Errors
    /// - API request failures (network errors, timeouts, authentication failures)
    /// - Invalid API responses (malformed JSON)
    pub async fn generate(&self, text: &str) -> Result<Vec<f32>> {
        match self.provider {
            ProviderKind::Gemini => self.generate_gemini(text).await,
            ProviderKind::OpenAI => self.generate_openai(text).await,
            ProviderKind::Ollama => self.generate_ollama(text).await,
        }
    }

    fn key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ProfileChatError::upstream(SERVICE, "API key not provided"))
    }

    /// Generate embedding using the Gemini `embedContent` API
    async fn generate_gemini(&self, text: &str) -> Result<Vec<f32>> {
        #[derive(Serialize)]
        struct GeminiRequest<'a> {
            model: String,
            content: GeminiContent<'a>,
        }

        #[derive(Serialize)]
        struct GeminiContent<'a> {
            parts: [GeminiPart<'a>; 1],
        }

        #[derive(Serialize)]
        struct GeminiPart<'a> {
            text: &'a str,
        }

        #[derive(Deserialize)]
        struct GeminiResponse {
            embedding: Option<GeminiEmbedding>,
        }

        #[derive(Deserialize)]
        struct GeminiEmbedding {
            #[serde(default)]
            values: Vec<f32>,
        }

        let api_key = self.key()?;
        let url = format!("{}/models/{}:embedContent", self.endpoint, self.model);
        debug!("Calling Gemini embeddings API: {}", url);

        let request = GeminiRequest {
            model: format!("models/{}", self.model),
            content: GeminiContent {
                parts: [GeminiPart { text }],
            },
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|e| ProfileChatError::upstream(SERVICE, e.to_string()))?;
        let response = check_status(response, SERVICE, "Gemini").await?;

        let result: GeminiResponse = response.json().await.map_err(|e| {
            ProfileChatError::MalformedUpstreamResponse(format!("Failed to parse response: {e}"))
        })?;

        Ok(result.embedding.map(|e| e.values).unwrap_or_default())
    }

    /// Generate embedding using `OpenAI` API
    async fn generate_openai(&self, text: &str) -> Result<Vec<f32>> {
        #[derive(Serialize)]
        struct OpenAIRequest<'a> {
            input: &'a str,
            model: &'a str,
        }

        #[derive(Deserialize)]
        struct OpenAIResponse {
            #[serde(default)]
            data: Vec<EmbeddingData>,
        }

        #[derive(Deserialize)]
        struct EmbeddingData {
            embedding: Vec<f32>,
        }

        let api_key = self.key()?;
        let url = format!("{}/embeddings", self.endpoint);
        debug!("Calling OpenAI embeddings API: {}", url);

        let request = OpenAIRequest {
            input: text,
            model: &self.model,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&request)
            .send()
            .await
            .map_err(|e| ProfileChatError::upstream(SERVICE, e.to_string()))?;
        let response = check_status(response, SERVICE, "OpenAI").await?;

        let result: OpenAIResponse = response.json().await.map_err(|e| {
            ProfileChatError::MalformedUpstreamResponse(format!("Failed to parse response: {e}"))
        })?;

        Ok(result
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .unwrap_or_default())
    }

    /// Generate embedding using Ollama API
    async fn generate_ollama(&self, text: &str) -> Result<Vec<f32>> {
        #[derive(Serialize)]
        struct OllamaRequest<'a> {
            model: &'a str,
            prompt: &'a str,
        }

        #[derive(Deserialize)]
        struct OllamaResponse {
            #[serde(default)]
            embedding: Vec<f32>,
        }

        let url = format!("{}/api/embeddings", self.endpoint);
        debug!("Calling Ollama embeddings API: {}", url);

        let request = OllamaRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProfileChatError::upstream(SERVICE, e.to_string()))?;
        let response = check_status(response, SERVICE, "Ollama").await?;

        let result: OllamaResponse = response.json().await.map_err(|e| {
            ProfileChatError::MalformedUpstreamResponse(format!("Failed to parse response: {e}"))
        })?;

        Ok(result.embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_needs_no_credential() {
        let client = EmbeddingClient::new(
            ProviderKind::Ollama,
            "nomic-embed-text".to_string(),
            "http://localhost:11434".to_string(),
            None,
        )
        .unwrap();
        assert!(!client.missing_credential());
    }

    #[test]
    fn test_hosted_providers_need_credential() {
        for provider in [ProviderKind::Gemini, ProviderKind::OpenAI] {
            let client = EmbeddingClient::new(
                provider,
                "m".to_string(),
                "https://example.invalid".to_string(),
                Some(String::new()),
            )
            .unwrap();
            assert!(client.missing_credential(), "{provider} should need a key");
        }
    }

    #[tokio::test]
    #[ignore = "Requires API key"]
    async fn test_gemini_embedding() {
        let client = EmbeddingClient::new(
            ProviderKind::Gemini,
            "text-embedding-004".to_string(),
            "https://generativelanguage.googleapis.com/v1beta".to_string(),
            std::env::var("GOOGLE_API_KEY").ok(),
        )
        .unwrap();

        let embedding = client.generate("Hello, world!").await.unwrap();
        assert_eq!(embedding.len(), 768);
    }
}
