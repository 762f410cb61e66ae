//! CLI output formatting utilities

use crate::rag::ChatReply;
use crate::AppConfig;

/// Print configuration with secrets masked
pub fn print_config(config: &AppConfig) {
    let shown = config.redacted();
    let key = |k: &Option<String>| k.clone().unwrap_or_else(|| "(not set)".to_string());

    println!("📋 Profile Chat Configuration:");
    println!();

    println!("🗄️  Database:");
    println!("  URL: {}", shown.database_url());
    println!("  Max connections: {}", shown.database.max_connections);
    println!("  Min connections: {}", shown.database.min_connections);
    println!("  Connection timeout: {}s", shown.database.connection_timeout);
    println!();

    println!("📝 Logging:");
    println!("  Level: {}", shown.logging.level);
    println!("  Backtrace: {}", shown.logging.backtrace);
    println!();

    println!("🤖 LLM:");
    println!("  Provider: {}", shown.llm.provider);
    println!("  Endpoint: {}", shown.llm.endpoint);
    println!("  Model: {}", shown.llm.model);
    println!("  Key: {}", key(&shown.llm.api_key));
    println!();

    println!("🧠 Embeddings:");
    println!("  Provider: {}", shown.embeddings.provider);
    println!("  Model: {}", shown.embeddings.model);
    println!("  Dimension: {}", shown.embedding_dimension());
    println!("  Key: {}", key(&shown.embeddings.api_key));
    println!();

    println!("🔎 Retrieval:");
    println!("  Table: {}", shown.retrieval.table);
    println!("  Index: {}", shown.retrieval.index_name);
    println!("  Vector column: {}", shown.retrieval.collection_field);
    println!("  Limit: {}", shown.retrieval.limit);
    println!("  Candidates: {}", shown.retrieval.num_candidates);
    println!();

    println!("💬 Chat:");
    println!("  Assistant: {}", shown.chat.assistant_name);
    println!("  Max context tokens: {}", shown.chat.max_context_tokens);
    match shown.stage_timeout() {
        Some(limit) => println!("  Stage timeout: {}s", limit.as_secs()),
        None => println!("  Stage timeout: none"),
    }
    println!("  Session timeout: {}s", shown.chat.session_timeout_secs);
    println!();

    println!("🌐 Server:");
    println!("  Address: {}:{}", shown.server.host, shown.server.port);
    println!("  CORS: {}", shown.server.enable_cors);
    println!(
        "  Max concurrent requests: {}",
        shown.server.max_concurrent_requests
    );
}

/// Print a chat reply
pub fn print_reply(reply: &ChatReply) {
    println!("{}", reply.response);
    println!();
    println!(
        "({}, {} document(s) used)",
        reply.label.as_str(),
        reply.documents_used
    );
}

/// Print colored output functions
pub fn print_info(msg: &str) {
    println!("ℹ️  {msg}");
}

pub fn print_success(msg: &str) {
    println!("✅ {msg}");
}
