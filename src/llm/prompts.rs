//! Prompt templates with `{{name}}` placeholders

use std::collections::HashMap;

/// Template for generating prompts
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Create a new prompt template
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Fill in the template in a single left-to-right pass
    ///
    /// Substituted values are copied verbatim and never rescanned, so user text
    /// that happens to contain `{{...}}` stays literal. Placeholders without a
    /// value are kept as written.
    #[must_use]
    pub fn render(&self, values: &HashMap<&str, &str>) -> String {
        let mut result = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();

        while let Some(start) = rest.find("{{") {
            result.push_str(&rest[..start]);
            let after_open = &rest[start + 2..];
            let Some(end) = after_open.find("}}") else {
                result.push_str(&rest[start..]);
                return result;
            };
            let name = &after_open[..end];
            match values.get(name) {
                Some(value) => result.push_str(value),
                None => result.push_str(&rest[start..start + 2 + end + 2]),
            }
            rest = &after_open[end + 2..];
        }
        result.push_str(rest);
        result
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_render() {
        let template = PromptTemplate::new("Hello {{name}}!");
        let values = HashMap::from([("name", "Alice")]);
        assert_eq!(template.render(&values), "Hello Alice!");
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let template = PromptTemplate::new("{{context}} | {{message}}");
        let values = HashMap::from([("context", "literal {{message}}"), ("message", "hi")]);
        assert_eq!(template.render(&values), "literal {{message}} | hi");
    }

    #[test]
    fn test_missing_value_and_unclosed_placeholder_stay_literal() {
        let template = PromptTemplate::new("a {{unknown}} b {{open");
        assert_eq!(template.render(&HashMap::new()), "a {{unknown}} b {{open");
    }
}
