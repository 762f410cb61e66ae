//! Language model access
//!
//! The chat pipeline talks to the model only through [`LanguageModel`], which
//! is used for both message classification and answer generation. The
//! concrete [`LlmService`] speaks one of the supported HTTP APIs:
//! - Gemini (`generateContent`)
//! - OpenAI-compatible (`/chat/completions`)
//! - Ollama (`/api/generate`)

pub mod client;
pub mod prompts;

use async_trait::async_trait;

pub use client::LlmService;
pub use prompts::PromptTemplate;

use crate::errors::Result;

/// A text-in, text-out generation backend
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Short provider name for logs
    fn name(&self) -> &str;

    /// Generate a completion for `prompt`
    ///
    /// # Errors
    /// - `UpstreamUnavailable` when the service is unreachable or misconfigured
    /// - `MalformedUpstreamResponse` when the reply carries no text
    async fn generate(&self, prompt: &str) -> Result<String>;
}
