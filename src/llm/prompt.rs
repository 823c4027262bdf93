// file: src/llm/prompt.rs
// description: fixed prompt templates with named placeholders
// reference: placeholder substitution in the style of the file header templates

use crate::error::{RagError, Result};

pub const ANSWER_TEMPLATE: &str = "
Answer the question based only on the following context:

{context}

---

Answer the question based on the above context. If the question cannot be properly answered based on the context, say you dont know.: {question}
";

pub const REDACT_TEMPLATE: &str = "
Change the following text to hide sensitive information:
{text}
";

pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn answer() -> Self {
        Self::new(ANSWER_TEMPLATE)
    }

    pub fn redact() -> Self {
        Self::new(REDACT_TEMPLATE)
    }

    /// Placeholder names in order of first appearance.
    pub fn variables(&self) -> Vec<String> {
        let mut names = Vec::new();
        let mut rest = self.template.as_str();

        while let Some(open) = rest.find('{') {
            let after = &rest[open + 1..];
            let Some(close) = after.find('}') else { break };
            let name = &after[..close];
            if !name.is_empty()
                && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                && !names.iter().any(|n| n == name)
            {
                names.push(name.to_string());
            }
            rest = &after[close + 1..];
        }

        names
    }

    /// Substitute every placeholder in a single pass; values are inserted
    /// verbatim, so braces inside them are never re-interpreted.
    pub fn format(&self, values: &[(&str, &str)]) -> Result<String> {
        for name in self.variables() {
            if !values.iter().any(|(key, _)| *key == name) {
                return Err(RagError::Validation(format!(
                    "Missing value for prompt variable '{}'",
                    name
                )));
            }
        }

        let mut output = String::with_capacity(self.template.len());
        let mut rest = self.template.as_str();

        while let Some(open) = rest.find('{') {
            output.push_str(&rest[..open]);
            let after = &rest[open + 1..];

            let replaced = after.find('}').and_then(|close| {
                let name = &after[..close];
                values
                    .iter()
                    .find(|(key, _)| *key == name)
                    .map(|(_, value)| (close, *value))
            });

            match replaced {
                Some((close, value)) => {
                    output.push_str(value);
                    rest = &after[close + 1..];
                }
                None => {
                    output.push('{');
                    rest = after;
                }
            }
        }
        output.push_str(rest);

        Ok(output)
    }
}

/// Join retrieved chunk texts into the context block.
pub fn build_context<'a>(texts: impl IntoIterator<Item = &'a str>) -> String {
    texts
        .into_iter()
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_template_variables() {
        assert_eq!(PromptTemplate::answer().variables(), vec!["context", "question"]);
        assert_eq!(PromptTemplate::redact().variables(), vec!["text"]);
    }

    #[test]
    fn test_format_answer_prompt() {
        let prompt = PromptTemplate::answer()
            .format(&[("context", "ctx body"), ("question", "why?")])
            .unwrap();

        assert!(prompt.contains("following context:\n\nctx body\n\n---"));
        assert!(prompt.trim_end().ends_with("say you dont know.: why?"));
    }

    #[test]
    fn test_values_with_braces_are_not_reexpanded() {
        let prompt = PromptTemplate::redact()
            .format(&[("text", "my {question} and {text}")])
            .unwrap();

        assert!(prompt.contains("my {question} and {text}"));
    }

    #[test]
    fn test_missing_variable_is_error() {
        let result = PromptTemplate::answer().format(&[("context", "x")]);
        assert!(matches!(result, Err(RagError::Validation(_))));
    }

    #[test]
    fn test_build_context() {
        assert_eq!(build_context(["a", "b"]), "a\n\n---\n\nb");
        assert_eq!(build_context(["only"]), "only");
    }
}
