//! Prompts used by the chat pipeline

use std::collections::HashMap;

use crate::llm::PromptTemplate;

const CLASSIFICATION: &str =
    "Classify the following message as 'casual' or 'context-specific': {{message}}";

const GROUNDED: &str = "{{context}}\nYou are {{assistant}}'s AI assistant and I need you to \
understand the following information: \n{{grounding}}\n\nNow the user wants a crisp answer for \
the following question: {{message}}";

const CASUAL: &str = "{{context}}\nUser: {{message}}\nBot:";

/// Prompt templates for classification and answer generation
#[derive(Debug, Clone)]
pub struct ChatPrompts {
    classification: PromptTemplate,
    grounded: PromptTemplate,
    casual: PromptTemplate,
}

impl Default for ChatPrompts {
    fn default() -> Self {
        Self {
            classification: PromptTemplate::new(CLASSIFICATION),
            grounded: PromptTemplate::new(GROUNDED),
            casual: PromptTemplate::new(CASUAL),
        }
    }
}

impl ChatPrompts {
    #[must_use]
    pub fn classification(&self, message: &str) -> String {
        self.classification
            .render(&HashMap::from([("message", message)]))
    }

    #[must_use]
    pub fn grounded(&self, context: &str, assistant: &str, grounding: &str, message: &str) -> String {
        self.grounded.render(&HashMap::from([
            ("context", context),
            ("assistant", assistant),
            ("grounding", grounding),
            ("message", message),
        ]))
    }

    #[must_use]
    pub fn casual(&self, context: &str, message: &str) -> String {
        self.casual
            .render(&HashMap::from([("context", context), ("message", message)]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_casual_prompt_shape() {
        let prompts = ChatPrompts::default();
        assert_eq!(prompts.casual("", "Hi"), "\nUser: Hi\nBot:");
        assert_eq!(
            prompts.casual("User: a\nBot: b", "Hi"),
            "User: a\nBot: b\nUser: Hi\nBot:"
        );
    }

    #[test]
    fn test_grounded_prompt_shape() {
        let prompts = ChatPrompts::default();
        let prompt = prompts.grounded("ctx", "Naisarg", "{\"a\": 1}", "Skills?");
        assert_eq!(
            prompt,
            "ctx\nYou are Naisarg's AI assistant and I need you to understand the following \
             information: \n{\"a\": 1}\n\nNow the user wants a crisp answer for the following \
             question: Skills?"
        );
    }
}
