//! Casual vs. context-specific message classification

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;
use tracing::warn;

use crate::errors::Result;
use crate::llm::LanguageModel;
use crate::rag::prompts::ChatPrompts;

/// Whether a message needs grounding in profile documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassificationLabel {
    Casual,
    ContextSpecific,
}

impl ClassificationLabel {
    /// Label used when the model's answer names neither label
    pub const FALLBACK: Self = Self::Casual;

    /// Read a label out of raw model output
    ///
    /// Output mentioning `context-specific` anywhere wins; output mentioning
    /// only `casual` is casual; anything else is unrecognized.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        if normalized.contains("context-specific") {
            Some(Self::ContextSpecific)
        } else if normalized.contains("casual") {
            Some(Self::Casual)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Casual => "casual",
            Self::ContextSpecific => "context-specific",
        }
    }
}

/// Asks the language model to label incoming messages
pub struct Classifier {
    llm: Arc<dyn LanguageModel>,
    prompts: ChatPrompts,
}

impl Classifier {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self {
            llm,
            prompts: ChatPrompts::default(),
        }
    }

    /// Label a message with a single model call
    ///
    /// Unrecognized answers fall back to [`ClassificationLabel::FALLBACK`].
    ///
    /// # Errors
    /// - The model call itself failed
    pub async fn classify(&self, message: &str) -> Result<ClassificationLabel> {
        let prompt = self.prompts.classification(message);
        let raw = self.llm.generate(&prompt).await?;

        let label = ClassificationLabel::parse(&raw).unwrap_or_else(|| {
            warn!(
                "Unrecognized classification {:?}, falling back to {}",
                raw.trim(),
                ClassificationLabel::FALLBACK.as_str()
            );
            ClassificationLabel::FALLBACK
        });
        debug!("Classified message as {}", label.as_str());
        Ok(label)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::errors::ProfileChatError;
    use crate::errors::UpstreamService;

    struct FixedModel {
        reply: std::result::Result<String, ()>,
        prompts: Mutex<Vec<String>>,
    }

    impl FixedModel {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LanguageModel for FixedModel {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply
                .clone()
                .map_err(|()| ProfileChatError::upstream(UpstreamService::LanguageModel, "down"))
        }
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!(
            ClassificationLabel::parse("Context-Specific\n"),
            Some(ClassificationLabel::ContextSpecific)
        );
        assert_eq!(
            ClassificationLabel::parse("'casual'"),
            Some(ClassificationLabel::Casual)
        );
        assert_eq!(ClassificationLabel::parse("I am not sure"), None);
        assert_eq!(ClassificationLabel::parse(""), None);
    }

    #[tokio::test]
    async fn test_classify_sends_fixed_instruction() {
        let model = FixedModel::replying("context-specific");
        let classifier = Classifier::new(model.clone());

        let label = classifier
            .classify("Tell me about the candidate's Python experience")
            .await
            .unwrap();

        assert_eq!(label, ClassificationLabel::ContextSpecific);
        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert_eq!(
            prompts[0],
            "Classify the following message as 'casual' or 'context-specific': \
             Tell me about the candidate's Python experience"
        );
    }

    #[tokio::test]
    async fn test_garbled_answer_defaults_to_casual() {
        let classifier = Classifier::new(FixedModel::replying("¯\\_(ツ)_/¯"));
        let label = classifier.classify("What's the weather?").await.unwrap();
        assert_eq!(label, ClassificationLabel::FALLBACK);
    }

    #[tokio::test]
    async fn test_model_failure_propagates() {
        let model = Arc::new(FixedModel {
            reply: Err(()),
            prompts: Mutex::new(Vec::new()),
        });
        let classifier = Classifier::new(model);
        let err = classifier.classify("hi").await.unwrap_err();
        assert!(err.is_upstream_failure());
    }
}
