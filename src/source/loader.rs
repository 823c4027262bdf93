// file: src/source/loader.rs
// description: loads matching files from the data directory into documents
// reference: scanner output -> frontmatter stripping -> markdown rendering

use crate::config::SourceConfig;
use crate::error::{RagError, Result};
use crate::models::Document;
use crate::parser::{FrontmatterParser, MarkdownParser};
use crate::source::scanner::{FileScanner, ScannedFile};
use std::fs;
use tracing::{debug, info, warn};

pub struct DirectoryLoader {
    config: SourceConfig,
    scanner: FileScanner,
    frontmatter: FrontmatterParser,
    markdown: MarkdownParser,
}

impl DirectoryLoader {
    pub fn new(config: SourceConfig) -> Result<Self> {
        Ok(Self {
            scanner: FileScanner::new(config.clone())?,
            config,
            frontmatter: FrontmatterParser::new(),
            markdown: MarkdownParser::new(),
        })
    }

    pub fn load(&self) -> Result<Vec<Document>> {
        let files = self.scanner.scan_directory(&self.config.data_path)?;

        let mut documents = Vec::with_capacity(files.len());
        for file in &files {
            match self.load_file(file)? {
                Some(document) => documents.push(document),
                None => warn!("Skipping empty document: {}", file.relative_path),
            }
        }

        info!(
            "Loaded {} documents from {}",
            documents.len(),
            self.config.data_path.display()
        );
        Ok(documents)
    }

    fn load_file(&self, file: &ScannedFile) -> Result<Option<Document>> {
        let raw = fs::read_to_string(&file.path).map_err(|source| RagError::FileOperation {
            path: file.path.clone(),
            source,
        })?;

        let (title, body) = match self.frontmatter.extract(&file.relative_path, &raw) {
            Ok(Some((frontmatter, body))) => (frontmatter.title().map(str::to_string), body),
            Ok(None) => (None, raw),
            Err(e) => {
                warn!("Ignoring unreadable frontmatter: {}", e);
                (None, raw)
            }
        };

        let (title, text) = if self.config.strip_markdown {
            let parsed = self.markdown.parse(&body)?;
            let title = title.or_else(|| parsed.first_title().map(str::to_string));
            (title, parsed.plain_text)
        } else {
            (title, body)
        };

        if text.trim().is_empty() {
            return Ok(None);
        }

        debug!("Loaded {} ({} bytes)", file.relative_path, text.len());

        let document = Document::new(
            file.path.display().to_string(),
            file.relative_path.clone(),
            text,
            file.modified,
        )
        .with_title(title)
        .with_file_size(file.size);

        Ok(Some(document))
    }
}
