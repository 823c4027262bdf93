// file: src/parser/frontmatter.rs
// description: YAML frontmatter extraction from markdown notes
// reference: https://docs.rs/yaml-rust

use crate::error::{RagError, Result};
use std::collections::HashMap;
use yaml_rust::{Yaml, YamlLoader};

pub struct FrontmatterParser;

#[derive(Debug, Clone, Default)]
pub struct Frontmatter {
    pub fields: HashMap<String, String>,
}

impl Frontmatter {
    pub fn title(&self) -> Option<&str> {
        self.fields
            .get("title")
            .map(String::as_str)
            .filter(|t| !t.trim().is_empty())
    }
}

impl FrontmatterParser {
    pub fn new() -> Self {
        Self
    }

    /// Split leading `---` delimited YAML from the body. Returns `None` when
    /// the content has no frontmatter block.
    pub fn extract(&self, file: &str, content: &str) -> Result<Option<(Frontmatter, String)>> {
        if !content.starts_with("---") {
            return Ok(None);
        }

        let parts: Vec<&str> = content.splitn(3, "---").collect();

        if parts.len() < 3 {
            return Ok(None);
        }

        let yaml_content = parts[1].trim();
        let remaining_content = parts[2].trim_start();

        let docs = YamlLoader::load_from_str(yaml_content).map_err(|e| RagError::MarkdownParse {
            file: file.to_string(),
            message: format!("YAML parse error: {}", e),
        })?;

        let mut fields = HashMap::new();

        if let Some(Yaml::Hash(hash)) = docs.first() {
            for (key, value) in hash {
                let Yaml::String(k) = key else { continue };
                let v = match value {
                    Yaml::String(s) => s.clone(),
                    Yaml::Integer(i) => i.to_string(),
                    Yaml::Real(r) => r.clone(),
                    Yaml::Boolean(b) => b.to_string(),
                    other => format!("{:?}", other),
                };
                fields.insert(k.clone(), v);
            }
        }

        Ok(Some((
            Frontmatter { fields },
            remaining_content.to_string(),
        )))
    }
}

impl Default for FrontmatterParser {
    fn default() -> Self {
        Self::new()
    }
}
