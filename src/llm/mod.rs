// file: src/llm/mod.rs
// description: hosted model ports and OpenAI-compatible clients
// reference: internal module structure

pub mod chat;
pub mod embeddings;
pub mod prompt;

use crate::error::Result;
use async_trait::async_trait;

pub use chat::OpenAiChatClient;
pub use embeddings::OpenAiEmbeddingClient;
pub use prompt::PromptTemplate;

/// Turns text into embedding vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, one vector per input, in input order.
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;
}

/// Single-turn text generation.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}
