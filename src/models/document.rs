// file: src/models/document.rs
// description: loaded source document with path metadata
// reference: internal data structures

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Path the document was loaded from, as given to the loader
    pub source: String,
    pub relative_path: String,
    pub content: String,
    pub title: Option<String>,
    pub file_size: u64,
    pub last_modified: u64,
}

impl Document {
    pub fn new(source: String, relative_path: String, content: String, last_modified: u64) -> Self {
        let file_size = content.len() as u64;

        Self {
            source,
            relative_path,
            content,
            title: None,
            file_size,
            last_modified,
        }
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    /// Size of the file on disk, which differs from `content` once markup is stripped.
    pub fn with_file_size(mut self, file_size: u64) -> Self {
        self.file_size = file_size;
        self
    }

    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}
