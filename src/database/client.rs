// file: src/database/client.rs
// description: LanceDB client wrapper with connection management and similarity search
// reference: https://docs.rs/lancedb

use crate::config::DatabaseConfig;
use crate::database::VectorStore;
use crate::database::insert::ChunkWriter;
use crate::error::{RagError, Result};
use crate::models::{Chunk, SearchResult};
use arrow_array::{Array, Float32Array, RecordBatch, StringArray, UInt64Array};
use async_trait::async_trait;
use futures::StreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{Connection, DistanceType, Table, connect};
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct LanceDbClient {
    connection: Connection,
    config: DatabaseConfig,
}

impl LanceDbClient {
    pub async fn new(config: DatabaseConfig) -> Result<Self> {
        info!("Connecting to LanceDB at {}", config.uri);

        let connection = connect(&config.uri)
            .execute()
            .await
            .map_err(|e| RagError::Database(format!("Failed to connect to LanceDB: {}", e)))?;

        Ok(Self { connection, config })
    }

    pub fn get_connection(&self) -> &Connection {
        &self.connection
    }

    pub async fn table_exists(&self, table_name: &str) -> Result<bool> {
        let table_names = self
            .connection
            .table_names()
            .execute()
            .await
            .map_err(|e| RagError::Database(format!("Failed to list tables: {}", e)))?;

        Ok(table_names.iter().any(|name| name == table_name))
    }

    pub async fn get_table(&self, table_name: &str) -> Result<Table> {
        self.connection
            .open_table(table_name)
            .execute()
            .await
            .map_err(|e| RagError::Database(format!("Failed to open table {}: {}", table_name, e)))
    }

    pub async fn get_chunk_count(&self) -> Result<u64> {
        if !self.table_exists(&self.config.table_name).await? {
            return Ok(0);
        }

        let table = self.get_table(&self.config.table_name).await?;
        let count = table
            .count_rows(None)
            .await
            .map_err(|e| RagError::Database(format!("Failed to count rows: {}", e)))?;

        Ok(count as u64)
    }

    pub fn batch_size(&self) -> usize {
        self.config.batch_size.max(1)
    }

    pub fn table_name(&self) -> &str {
        &self.config.table_name
    }

    pub fn uri(&self) -> &str {
        &self.config.uri
    }

    /// Search for chunks by cosine similarity, most relevant first.
    pub async fn vector_search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        if !self.table_exists(&self.config.table_name).await? {
            warn!("Table does not exist, returning empty results");
            return Ok(Vec::new());
        }

        let table = self.get_table(&self.config.table_name).await?;

        debug!("Performing vector search with limit {}", limit);

        let mut results_stream = table
            .vector_search(query_embedding.to_vec())
            .map_err(|e| RagError::Database(format!("Failed to create vector search: {}", e)))?
            .distance_type(DistanceType::Cosine)
            .limit(limit)
            .execute()
            .await
            .map_err(|e| RagError::Database(format!("Vector search failed: {}", e)))?;

        let mut search_results = Vec::new();

        while let Some(batch_result) = results_stream.next().await {
            let batch = batch_result
                .map_err(|e| RagError::Database(format!("Failed to read result batch: {}", e)))?;
            search_results.extend(Self::batch_to_results(&batch)?);
        }

        search_results.sort_by(|a, b| b.score.total_cmp(&a.score));

        info!("Vector search returned {} results", search_results.len());
        Ok(search_results)
    }

    fn batch_to_results(batch: &RecordBatch) -> Result<Vec<SearchResult>> {
        let ids = string_column(batch, "id")?;
        let sources = string_column(batch, "source")?;
        let relative_paths = string_column(batch, "relative_path")?;
        let titles = string_column(batch, "title")?;
        let contents = string_column(batch, "content")?;
        let start_indices = batch
            .column_by_name("start_index")
            .ok_or_else(|| RagError::Database("Missing 'start_index' column".to_string()))?
            .as_any()
            .downcast_ref::<UInt64Array>()
            .ok_or_else(|| RagError::Database("Invalid 'start_index' column type".to_string()))?;

        // LanceDB reports the distance in a special column
        let distances = batch
            .column_by_name("_distance")
            .and_then(|col| col.as_any().downcast_ref::<Float32Array>());

        let results = (0..batch.num_rows())
            .map(|i| {
                let chunk = Chunk {
                    id: ids.value(i).to_string(),
                    source: sources.value(i).to_string(),
                    relative_path: relative_paths.value(i).to_string(),
                    title: (!titles.is_null(i)).then(|| titles.value(i).to_string()),
                    start_index: start_indices.value(i) as usize,
                    content: contents.value(i).to_string(),
                };

                match distances {
                    Some(dist) => SearchResult::from_cosine_distance(chunk, dist.value(i)),
                    None => SearchResult::new(chunk, 0.0, None),
                }
            })
            .collect();

        Ok(results)
    }
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .ok_or_else(|| RagError::Database(format!("Missing '{}' column", name)))?
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| RagError::Database(format!("Invalid '{}' column type", name)))
}

#[async_trait]
impl VectorStore for LanceDbClient {
    async fn rebuild(&self, chunks: &[Chunk], embeddings: &[Vec<f32>]) -> Result<usize> {
        ChunkWriter::new(self).rebuild(chunks, embeddings).await
    }

    async fn similarity_search(&self, embedding: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        self.vector_search(embedding, k).await
    }

    async fn count(&self) -> Result<u64> {
        self.get_chunk_count().await
    }
}
