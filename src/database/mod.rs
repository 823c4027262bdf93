// file: src/database/mod.rs
// description: vector store port and its LanceDB / in-memory backends
// reference: internal module structure

pub mod client;
pub mod insert;
pub mod memory;
pub mod schema;

use crate::error::Result;
use crate::models::{Chunk, SearchResult};
use async_trait::async_trait;

pub use client::LanceDbClient;
pub use insert::ChunkWriter;
pub use memory::InMemoryStore;
pub use schema::SchemaManager;

/// Persistent chunk storage. The store is only ever rebuilt wholesale or
/// queried; there is no incremental update.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Delete whatever is stored, then persist `chunks` with their embeddings.
    /// Returns the number of chunks written.
    async fn rebuild(&self, chunks: &[Chunk], embeddings: &[Vec<f32>]) -> Result<usize>;

    /// Up to `k` nearest chunks, most relevant first.
    async fn similarity_search(&self, embedding: &[f32], k: usize) -> Result<Vec<SearchResult>>;

    async fn count(&self) -> Result<u64>;
}
