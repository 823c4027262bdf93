// file: src/pipeline/ingest.rs
// description: load -> split -> embed -> rebuild store
// reference: sequential ingestion workflow with progress reporting

use crate::config::Config;
use crate::database::VectorStore;
use crate::error::Result;
use crate::llm::Embedder;
use crate::models::Chunk;
use crate::pipeline::progress::{IngestStats, ProgressTracker};
use crate::source::DirectoryLoader;
use crate::splitter::RecursiveCharacterSplitter;
use tracing::{info, warn};

pub struct IngestPipeline<'a> {
    config: &'a Config,
    embedder: &'a dyn Embedder,
    store: &'a dyn VectorStore,
    show_progress: bool,
    colored: bool,
}

impl<'a> IngestPipeline<'a> {
    pub fn new(config: &'a Config, embedder: &'a dyn Embedder, store: &'a dyn VectorStore) -> Self {
        Self {
            config,
            embedder,
            store,
            show_progress: true,
            colored: true,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn with_color(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }

    /// Replace the whole store with chunks from the current data directory.
    pub async fn run(&self) -> Result<IngestStats> {
        let splitter = RecursiveCharacterSplitter::from_config(&self.config.splitter)?;
        let loader = DirectoryLoader::new(self.config.source.clone())?;

        let documents = loader.load()?;
        if documents.is_empty() {
            warn!(
                "No documents found in {} matching '{}'",
                self.config.source.data_path.display(),
                self.config.source.pattern
            );
        }

        let chunks = splitter.split_documents(&documents);

        let progress = if self.show_progress {
            ProgressTracker::with_color(chunks.len(), self.colored)
        } else {
            ProgressTracker::hidden(chunks.len())
        };

        let embeddings = self.embed_chunks(&chunks, &progress).await?;
        progress.set_message("writing store".to_string());

        let saved = self.store.rebuild(&chunks, &embeddings).await?;
        progress.finish();

        info!("Saved {} chunks to {}", saved, self.config.database.uri);

        Ok(IngestStats {
            documents_loaded: documents.len(),
            chunks_created: chunks.len(),
            chunks_saved: saved,
            total_bytes_processed: documents.iter().map(|d| d.file_size).sum(),
            duration_ms: progress.elapsed_ms(),
        })
    }

    async fn embed_chunks(&self, chunks: &[Chunk], progress: &ProgressTracker) -> Result<Vec<Vec<f32>>> {
        let batch_size = self.config.database.batch_size.max(1);
        let mut embeddings = Vec::with_capacity(chunks.len());

        for batch in chunks.chunks(batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            embeddings.extend(self.embedder.embed_documents(&texts).await?);
            progress.add_embedded(batch.len());
        }

        Ok(embeddings)
    }
}
