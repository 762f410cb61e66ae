//! Unit tests for configuration module
//!
//! These tests validate configuration parsing, defaults, and validation.

#[cfg(test)]
mod tests {
    use std::io::Write;

    use crate::config::*;
    use crate::errors::ProfileChatError;

    const MINIMAL: &str = r#"
[database]
url = "postgresql://user:secret@db:5432/profiles"
max_connections = 5
min_connections = 1
connection_timeout = 10

[logging]
level = "debug"
backtrace = false

[llm]
provider = "ollama"
endpoint = "http://localhost:11434"

[embeddings]
provider = "openai"
endpoint = "https://api.openai.com/v1"
model = "text-embedding-3-small"
dimension = 1536

[retrieval]
index_name = "profile_idx"
collection_field = "embedding"

[chat]
assistant_name = "Ada"

[server]
host = "0.0.0.0"
port = 8080
"#;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    // ====== Default Value Tests ======

    #[test]
    fn test_retrieval_defaults() {
        assert_eq!(default_retrieval_limit(), 3);
        assert_eq!(default_num_candidates(), 49);
    }

    #[test]
    fn test_chat_defaults() {
        assert_eq!(default_max_context_tokens(), 1000);
        assert_eq!(default_session_timeout_secs(), 3600);
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.llm.provider, ProviderKind::Gemini);
        assert!(config.stage_timeout().is_none());
    }

    // ====== File Loading Tests ======

    #[test]
    fn test_from_file_fills_defaults() {
        let file = write_config(MINIMAL);
        let config = AppConfig::from_file(file.path()).unwrap();

        assert_eq!(config.llm.provider, ProviderKind::Ollama);
        assert_eq!(config.llm.model, "gemini-1.5-flash");
        assert_eq!(config.embeddings.provider, ProviderKind::OpenAI);
        assert_eq!(config.retrieval.table, "profile_documents");
        assert_eq!(config.retrieval.limit, 3);
        assert_eq!(config.retrieval.num_candidates, 49);
        assert_eq!(config.chat.assistant_name, "Ada");
        assert_eq!(config.chat.max_context_tokens, 1000);
        assert!(config.server.enable_cors);
        assert_eq!(config.server.max_concurrent_requests, default_max_concurrent_requests());
    }

    #[test]
    fn test_from_file_rejects_unknown_provider() {
        let broken = MINIMAL.replace("provider = \"ollama\"", "provider = \"watson\"");
        let file = write_config(&broken);
        let result = AppConfig::from_file(file.path());
        assert!(matches!(result, Err(crate::ProfileChatError::TomlParsing(_))));
    }

    #[test]
    fn test_from_file_missing_file() {
        let result = AppConfig::from_file("/definitely/not/here/config.toml");
        assert!(matches!(result, Err(crate::ProfileChatError::Io(_))));
    }

    #[test]
    fn test_stage_timeout_parsed() {
        let with_timeout = MINIMAL.replace(
            "assistant_name = \"Ada\"",
            "assistant_name = \"Ada\"\nstage_timeout_secs = 12",
        );
        let file = write_config(&with_timeout);
        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.stage_timeout(), Some(std::time::Duration::from_secs(12)));
    }

    // ====== Validation Tests ======

    #[test]
    fn test_validate_rejects_zero_limit() {
        let mut config = AppConfig::default();
        config.retrieval.limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_small_candidate_pool() {
        let mut config = AppConfig::default();
        config.retrieval.limit = 10;
        config.retrieval.num_candidates = 5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("num_candidates"));
    }

    #[test]
    fn test_validate_caps_candidate_pool() {
        let mut config = AppConfig::default();
        config.retrieval.num_candidates = MAX_NUM_CANDIDATES;
        assert!(config.validate().is_ok());

        config.retrieval.num_candidates = MAX_NUM_CANDIDATES + 1;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ProfileChatError::ConfigError(_)));
        assert!(err.to_string().contains("hnsw.ef_search"));
    }

    #[test]
    fn test_validate_rejects_zero_context_budget() {
        let mut config = AppConfig::default();
        config.chat.max_context_tokens = 0;
        assert!(config.validate().is_err());
    }

    // ====== Redaction Tests ======

    #[test]
    fn test_redacted_masks_secrets() {
        let mut config = AppConfig::default();
        config.llm.api_key = Some("sk-live".to_string());
        config.database.url = "postgresql://user:secret@db:5432/profiles".to_string();

        let shown = config.redacted();
        assert_eq!(shown.llm.api_key.as_deref(), Some("********"));
        assert!(shown.embeddings.api_key.is_none());
        assert_eq!(shown.database.url, "postgresql://********@db:5432/profiles");
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-live"));
    }
}
