//! Chat pipeline: Classify -> (Retrieve -> Assemble | Assemble) -> Generate -> Format -> Persist

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::debug;
use tracing::info;
use tracing::info_span;
use tracing::Instrument;

use crate::config::AppConfig;
use crate::database::Database;
use crate::embeddings::Embedder;
use crate::embeddings::EmbeddingService;
use crate::errors::ProfileChatError;
use crate::errors::Result;
use crate::llm::LanguageModel;
use crate::llm::LlmService;
use crate::rag::classifier::ClassificationLabel;
use crate::rag::classifier::Classifier;
use crate::rag::context::ContextAssembler;
use crate::rag::formatter::format_response;
use crate::rag::retriever::DocumentFilter;
use crate::rag::retriever::DocumentStore;
use crate::rag::retriever::Retriever;
use crate::rag::retriever::DEFAULT_LIMIT;
use crate::rag::retriever::DEFAULT_NUM_CANDIDATES;
use crate::session::SessionMemory;

/// Where a request is in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatStage {
    Received,
    Classified,
    Retrieving,
    Assembling,
    AssemblingCasual,
    Generating,
    Formatting,
    Persisted,
    Responded,
}

impl ChatStage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Classified => "classified",
            Self::Retrieving => "retrieving",
            Self::Assembling => "assembling",
            Self::AssemblingCasual => "assembling-casual",
            Self::Generating => "generating",
            Self::Formatting => "formatting",
            Self::Persisted => "persisted",
            Self::Responded => "responded",
        }
    }
}

/// Per-deployment knobs for the pipeline
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub max_context_tokens: usize,
    pub index_name: String,
    pub collection_field: String,
    pub limit: usize,
    pub filter: DocumentFilter,
    pub stage_timeout: Option<Duration>,
}

impl ChatSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_context_tokens: config.chat.max_context_tokens,
            index_name: config.retrieval.index_name.clone(),
            collection_field: config.retrieval.collection_field.clone(),
            limit: config.retrieval.limit,
            filter: DocumentFilter::new(),
            stage_timeout: config.stage_timeout(),
        }
    }
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            max_context_tokens: 1000,
            index_name: "profile_documents_embedding_idx".to_string(),
            collection_field: "embedding".to_string(),
            limit: DEFAULT_LIMIT,
            filter: DocumentFilter::new(),
            stage_timeout: None,
        }
    }
}

/// Outcome of one chat request
#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    /// Formatted answer shown to the user
    pub response: String,
    pub label: ClassificationLabel,
    /// Documents retrieved for grounding; zero for casual messages
    pub documents_used: usize,
}

/// Composes classification, retrieval, assembly, generation and memory
pub struct ChatOrchestrator {
    memory: Arc<SessionMemory>,
    classifier: Classifier,
    embedder: Arc<dyn Embedder>,
    retriever: Retriever,
    assembler: ContextAssembler,
    llm: Arc<dyn LanguageModel>,
    settings: ChatSettings,
}

impl ChatOrchestrator {
    /// Create from existing services
    #[must_use]
    pub fn from_services(
        memory: Arc<SessionMemory>,
        llm: Arc<dyn LanguageModel>,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn DocumentStore>,
        assistant_name: &str,
        settings: ChatSettings,
    ) -> Self {
        Self::with_retriever(
            memory,
            llm,
            embedder,
            Retriever::with_candidates(store, DEFAULT_NUM_CANDIDATES),
            assistant_name,
            settings,
        )
    }

    fn with_retriever(
        memory: Arc<SessionMemory>,
        llm: Arc<dyn LanguageModel>,
        embedder: Arc<dyn Embedder>,
        retriever: Retriever,
        assistant_name: &str,
        settings: ChatSettings,
    ) -> Self {
        Self {
            memory,
            classifier: Classifier::new(Arc::clone(&llm)),
            embedder,
            retriever,
            assembler: ContextAssembler::new(assistant_name),
            llm,
            settings,
        }
    }

    /// Wire the pipeline to the configured model, embedding service and database
    ///
    /// # Errors
    /// - Invalid configuration
    /// - Database connection errors
    /// - HTTP client build errors
    pub async fn from_config(config: &AppConfig, memory: Arc<SessionMemory>) -> Result<Self> {
        config.validate()?;
        let database = Arc::new(Database::from_config(config).await?);
        let embedder = Arc::new(EmbeddingService::new(&config.embeddings)?);
        let llm = Arc::new(LlmService::new(&config.llm)?);

        Ok(Self::with_retriever(
            memory,
            llm,
            embedder,
            Retriever::with_candidates(database, config.retrieval.num_candidates),
            &config.chat.assistant_name,
            ChatSettings::from_config(config),
        ))
    }

    /// Answer one message within a session
    ///
    /// Nothing is written to session memory unless the whole request succeeds.
    ///
    /// # Errors
    /// - `InvalidRequest` for a blank message
    /// - Upstream failures or timeouts from classification, embedding,
    ///   retrieval or generation
    pub async fn handle(&self, session_id: &str, message: &str) -> Result<ChatReply> {
        let span = info_span!("chat", session_id = %session_id);
        self.run(session_id, message).instrument(span).await
    }

    async fn run(&self, session_id: &str, message: &str) -> Result<ChatReply> {
        if message.trim().is_empty() {
            return Err(ProfileChatError::InvalidRequest(
                "message must not be empty".to_string(),
            ));
        }
        info!("Processing chat message: {}", message);
        trace_stage(ChatStage::Received);

        let context = self
            .memory
            .get_context(session_id, self.settings.max_context_tokens)
            .await;

        let label = self
            .stage("classify", self.classifier.classify(message))
            .await?;
        trace_stage(ChatStage::Classified);

        let (prompt, documents_used) = match label {
            ClassificationLabel::ContextSpecific => {
                trace_stage(ChatStage::Retrieving);
                let embedding = self
                    .stage("embed", self.embedder.embed(message))
                    .await?;
                let documents = self
                    .stage(
                        "retrieve",
                        self.retriever.retrieve(
                            &embedding,
                            &self.settings.index_name,
                            &self.settings.collection_field,
                            self.settings.limit,
                            &self.settings.filter,
                        ),
                    )
                    .await?;
                debug!("Grounding with {} document(s)", documents.len());
                trace_stage(ChatStage::Assembling);
                let prompt = self
                    .assembler
                    .assemble(label, &context, message, &documents);
                (prompt, documents.len())
            }
            ClassificationLabel::Casual => {
                trace_stage(ChatStage::AssemblingCasual);
                (self.assembler.assemble(label, &context, message, &[]), 0)
            }
        };

        trace_stage(ChatStage::Generating);
        let raw = self
            .stage("generate", self.llm.generate(prompt.as_str()))
            .await?;

        trace_stage(ChatStage::Formatting);
        let response = format_response(&raw);

        self.memory
            .append_turn(session_id, message, &response)
            .await;
        trace_stage(ChatStage::Persisted);

        info!(
            label = label.as_str(),
            documents_used, "Chat request completed successfully"
        );
        trace_stage(ChatStage::Responded);

        Ok(ChatReply {
            response,
            label,
            documents_used,
        })
    }

    /// Run an upstream stage under the configured deadline, if any
    async fn stage<T, F>(&self, stage: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match self.settings.stage_timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| ProfileChatError::Timeout { stage })?,
            None => fut.await,
        }
    }

    /// Get session memory reference
    #[must_use]
    pub fn memory(&self) -> &Arc<SessionMemory> {
        &self.memory
    }
}

fn trace_stage(stage: ChatStage) {
    debug!(stage = stage.as_str(), "Chat stage reached");
}
