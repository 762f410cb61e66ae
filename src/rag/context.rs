//! Prompt assembly from session context, retrieved documents and the message

use std::fmt;

use crate::models::ProfileDocument;
use crate::rag::classifier::ClassificationLabel;
use crate::rag::prompts::ChatPrompts;
use crate::rag::retriever::extract_field_texts;

/// The final text handed to the language model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt(String);

impl Prompt {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Assembler for creating the generation prompt
pub struct ContextAssembler {
    assistant_name: String,
    prompts: ChatPrompts,
}

impl ContextAssembler {
    /// Create a new context assembler
    pub fn new(assistant_name: impl Into<String>) -> Self {
        Self {
            assistant_name: assistant_name.into(),
            prompts: ChatPrompts::default(),
        }
    }

    /// Build the prompt for a classified message
    ///
    /// Context-specific messages get the persona instruction and every
    /// parseable document field; casual messages get only the prior context
    /// and a `User:`/`Bot:` continuation, whatever `documents` holds.
    #[must_use]
    pub fn assemble(
        &self,
        label: ClassificationLabel,
        prior_context: &str,
        message: &str,
        documents: &[ProfileDocument],
    ) -> Prompt {
        let text = match label {
            ClassificationLabel::ContextSpecific => {
                let grounding = extract_field_texts(documents).join("\n");
                self.prompts
                    .grounded(prior_context, &self.assistant_name, &grounding, message)
            }
            ClassificationLabel::Casual => self.prompts.casual(prior_context, message),
        };
        Prompt(text)
    }
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::new("the candidate")
    }
}
