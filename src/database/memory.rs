// file: src/database/memory.rs
// description: brute-force in-memory vector store for tests and dry runs
// reference: in-memory store backends behind the same port as the persistent one

use crate::database::VectorStore;
use crate::database::insert::validate_embeddings;
use crate::error::{RagError, Result};
use crate::models::{Chunk, SearchResult};
use async_trait::async_trait;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<RwLock<Vec<(Chunk, Vec<f32>)>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chunks currently stored, in insertion order.
    pub fn chunks(&self) -> Result<Vec<Chunk>> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.iter().map(|(chunk, _)| chunk.clone()).collect())
    }
}

fn poisoned<T>(_: T) -> RagError {
    RagError::Database("in-memory store lock poisoned".to_string())
}

/// Cosine distance in [0, 2]; zero vectors are treated as maximally distant.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStore for InMemoryStore {
    async fn rebuild(&self, chunks: &[Chunk], embeddings: &[Vec<f32>]) -> Result<usize> {
        validate_embeddings(chunks, embeddings)?;

        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.clear();
        entries.extend(chunks.iter().cloned().zip(embeddings.iter().cloned()));
        Ok(entries.len())
    }

    async fn similarity_search(&self, embedding: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        let entries = self.entries.read().map_err(poisoned)?;

        let mut results: Vec<SearchResult> = entries
            .iter()
            .map(|(chunk, vector)| {
                SearchResult::from_cosine_distance(chunk.clone(), cosine_distance(embedding, vector))
            })
            .collect();

        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(k);
        Ok(results)
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.entries.read().map_err(poisoned)?.len() as u64)
    }
}
