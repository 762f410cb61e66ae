//! Profile chat: a conversational assistant that answers questions about one
//! person's professional profile, grounding specific questions in documents
//! retrieved by vector similarity.

pub mod api;
pub mod cli;
pub mod config;
pub mod database;
pub mod embeddings;
pub mod errors;
pub mod llm;
pub mod logging;
pub mod models;
pub mod rag;
pub mod session;

#[cfg(test)]
mod config_tests;

pub use config::AppConfig;
pub use errors::*;
