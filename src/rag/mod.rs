//! Conversational retrieval pipeline
//!
//! Each chat message goes through:
//! - Classification as casual or context-specific
//! - Vector retrieval of profile documents (context-specific only)
//! - Prompt assembly from session context, documents and the message
//! - Generation and markup formatting
//! - Persisting the exchange into session memory
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use profilechat::config::AppConfig;
//! use profilechat::rag::ChatOrchestrator;
//! use profilechat::session::SessionMemory;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let memory = Arc::new(SessionMemory::new());
//!     let chat = ChatOrchestrator::from_config(&config, memory).await?;
//!
//!     let reply = chat.handle("demo-session", "What has the candidate built in Rust?").await?;
//!     println!("{}", reply.response);
//!
//!     Ok(())
//! }
//! ```

pub mod classifier;
pub mod context;
pub mod formatter;
pub mod pipeline;
pub mod prompts;
pub mod retriever;

pub use classifier::ClassificationLabel;
pub use classifier::Classifier;
pub use context::ContextAssembler;
pub use context::Prompt;
pub use formatter::format_response;
pub use pipeline::ChatOrchestrator;
pub use pipeline::ChatReply;
pub use pipeline::ChatSettings;
pub use pipeline::ChatStage;
pub use retriever::extract_field_texts;
pub use retriever::DocumentFilter;
pub use retriever::DocumentStore;
pub use retriever::Retriever;
pub use retriever::VectorQuery;
