// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod config;
pub mod database;
pub mod error;
pub mod llm;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod source;
pub mod splitter;
pub mod utils;

pub use config::{Config, DatabaseConfig, OpenAiConfig, QueryConfig, SourceConfig, SplitterConfig};
pub use database::{ChunkWriter, InMemoryStore, LanceDbClient, SchemaManager, VectorStore};
pub use error::{RagError, Result};
pub use llm::{ChatModel, Embedder, OpenAiChatClient, OpenAiEmbeddingClient, PromptTemplate};
pub use models::{Chunk, Document, SearchResult};
pub use parser::{Frontmatter, FrontmatterParser, MarkdownParser, ParsedMarkdown};
pub use pipeline::{
    IngestPipeline, IngestStats, PreparedQuery, ProgressTracker, QueryAnswer, QueryOutcome,
    QueryPipeline, Retrieval,
};
pub use source::{DirectoryLoader, FileScanner, ScannedFile};
pub use splitter::RecursiveCharacterSplitter;
pub use utils::Validator;
