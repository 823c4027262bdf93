// file: src/source/scanner.rs
// description: Directory walking and file discovery with pattern filtering
// reference: https://docs.rs/walkdir

use crate::config::SourceConfig;
use crate::error::{RagError, Result};
use crate::utils::Validator;
use glob::Pattern;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

pub struct FileScanner {
    config: SourceConfig,
    pattern: Pattern,
}

#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub relative_path: String,
    pub size: u64,
    pub modified: u64,
}

impl FileScanner {
    pub fn new(config: SourceConfig) -> Result<Self> {
        let pattern = Pattern::new(&config.pattern).map_err(|e| {
            RagError::Config(format!("Invalid file pattern '{}': {}", config.pattern, e))
        })?;

        Ok(Self { config, pattern })
    }

    /// List files under `root` whose name matches the configured pattern,
    /// sorted by path.
    pub fn scan_directory(&self, root: &Path) -> Result<Vec<ScannedFile>> {
        Validator::validate_directory(root)?;
        info!("Scanning directory: {}", root.display());

        let max_depth = if self.config.recursive { usize::MAX } else { 1 };
        let mut files = Vec::new();

        for entry in WalkDir::new(root)
            .follow_links(false)
            .max_depth(max_depth)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| RagError::FileOperation {
                path: e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf()),
                source: e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("directory walk failed")),
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let file_name = entry.file_name().to_string_lossy();

            if !self.pattern.matches(&file_name) {
                debug!("Skipping file: {}", path.display());
                continue;
            }

            let metadata = entry.metadata().map_err(|e| RagError::FileOperation {
                path: path.to_path_buf(),
                source: e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("metadata unavailable")),
            })?;

            let modified = metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
                .map(|d| d.as_secs())
                .unwrap_or(0);

            let relative_path = path
                .strip_prefix(root)
                .unwrap_or(path)
                .to_string_lossy()
                .to_string();

            files.push(ScannedFile {
                path: path.to_path_buf(),
                relative_path,
                size: metadata.len(),
                modified,
            });
        }

        info!(
            "Found {} files matching '{}'",
            files.len(),
            self.config.pattern
        );
        Ok(files)
    }
}
