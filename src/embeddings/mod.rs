//! Embeddings generation module
//!
//! Message text is turned into a query vector by one of:
//! - Gemini (`embedContent`)
//! - OpenAI (text-embedding-3-small, etc.)
//! - Ollama (local models)
//!
//! # Examples
//!
//! ```rust,no_run
//! use profilechat::config::AppConfig;
//! use profilechat::embeddings::Embedder;
//! use profilechat::embeddings::EmbeddingService;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let service = EmbeddingService::new(&config.embeddings)?;
//!
//!     let embedding = service.embed("Rust and distributed systems").await?;
//!     println!("Generated embedding with {} dimensions", embedding.len());
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod generator;

use async_trait::async_trait;

pub use client::EmbeddingClient;
pub use generator::EmbeddingService;

use crate::errors::Result;

/// Longest text (in chars) sent to an embedding endpoint
pub const MAX_EMBEDDING_CHARS: usize = 2000;

/// Turns text into a query vector
///
/// An empty vector means "no embedding available" (for example a missing
/// credential); callers treat it as "no retrieval possible", not as a failure.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// # Errors
    /// - `UpstreamUnavailable` when the embedding endpoint cannot be reached
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Normalize text before embedding
///
/// Collapses whitespace, drops control characters and cuts at a word boundary
/// below [`MAX_EMBEDDING_CHARS`]. Returns `None` when nothing embeddable is
/// left.
#[must_use]
pub fn preprocess_text_for_embedding(text: &str) -> Option<String> {
    let cleaned = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ");

    if cleaned.is_empty() {
        return None;
    }
    if cleaned.chars().count() <= MAX_EMBEDDING_CHARS {
        return Some(cleaned);
    }

    let cut: String = cleaned.chars().take(MAX_EMBEDDING_CHARS).collect();
    let truncated = match cut.rfind(' ') {
        Some(idx) if idx > 0 => cut[..idx].to_string(),
        _ => cut,
    };
    Some(truncated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preprocess_collapses_whitespace() {
        assert_eq!(
            preprocess_text_for_embedding("  Python\n\n and\tRust  ").as_deref(),
            Some("Python and Rust")
        );
    }

    #[test]
    fn test_preprocess_rejects_blank() {
        assert!(preprocess_text_for_embedding("").is_none());
        assert!(preprocess_text_for_embedding(" \n\t\r ").is_none());
    }

    #[test]
    fn test_preprocess_truncates_at_word_boundary() {
        let long = "word ".repeat(1000);
        let processed = preprocess_text_for_embedding(&long).unwrap();
        assert!(processed.chars().count() <= MAX_EMBEDDING_CHARS);
        assert!(processed.ends_with("word"));
    }

    #[test]
    fn test_preprocess_handles_multibyte_text() {
        let long = "résumé ".repeat(400);
        let processed = preprocess_text_for_embedding(&long).unwrap();
        assert!(processed.chars().count() <= MAX_EMBEDDING_CHARS);
        assert!(processed.ends_with("résumé"));
    }
}
