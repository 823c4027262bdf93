// file: src/models/chunk.rs
// description: bounded slice of a document, the unit of embedding and storage
// reference: internal data structures

use crate::models::Document;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub source: String,
    pub relative_path: String,
    pub title: Option<String>,
    /// Character offset of the chunk within its document
    pub start_index: usize,
    pub content: String,
}

impl Chunk {
    pub fn from_document(document: &Document, content: String, start_index: usize) -> Self {
        let id = Self::compute_id(&document.source, start_index, &content);

        Self {
            id,
            source: document.source.clone(),
            relative_path: document.relative_path.clone(),
            title: document.title.clone(),
            start_index,
            content,
        }
    }

    fn compute_id(source: &str, start_index: usize, content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(source.as_bytes());
        hasher.update(start_index.to_le_bytes());
        hasher.update(content.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Document {
        Document::new(
            "data/Personal/a.md".to_string(),
            "a.md".to_string(),
            "alpha beta".to_string(),
            0,
        )
        .with_title(Some("Alpha".to_string()))
    }

    #[test]
    fn test_chunk_inherits_source_metadata() {
        let chunk = Chunk::from_document(&doc(), "beta".to_string(), 6);
        assert_eq!(chunk.source, "data/Personal/a.md");
        assert_eq!(chunk.relative_path, "a.md");
        assert_eq!(chunk.title.as_deref(), Some("Alpha"));
        assert_eq!(chunk.start_index, 6);
    }

    #[test]
    fn test_id_is_deterministic_and_position_sensitive() {
        let a = Chunk::from_document(&doc(), "beta".to_string(), 6);
        let b = Chunk::from_document(&doc(), "beta".to_string(), 6);
        let c = Chunk::from_document(&doc(), "beta".to_string(), 0);

        assert_eq!(a.id, b.id);
        assert_ne!(a.id, c.id);
        assert_eq!(a.id.len(), 64);
    }
}
