// file: src/database/insert.rs
// description: rebuilds the LanceDB chunk table from a fresh chunk set
// reference: https://docs.rs/lancedb

use crate::database::client::LanceDbClient;
use crate::database::schema::SchemaManager;
use crate::error::{RagError, Result};
use crate::models::Chunk;
use arrow_array::{
    FixedSizeListArray, Float32Array, Int64Array, RecordBatch, RecordBatchIterator, StringArray,
    UInt64Array,
};
use arrow_schema::{ArrowError, Schema};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct ChunkWriter<'a> {
    client: &'a LanceDbClient,
}

impl<'a> ChunkWriter<'a> {
    pub fn new(client: &'a LanceDbClient) -> Self {
        Self { client }
    }

    /// Drop the existing table, then create it from `chunks`.
    ///
    /// A failure after the drop leaves the store without a table; nothing is
    /// restored.
    pub async fn rebuild(&self, chunks: &[Chunk], embeddings: &[Vec<f32>]) -> Result<usize> {
        let embedding_dim = validate_embeddings(chunks, embeddings)?;

        SchemaManager::new(self.client).drop_chunks_table().await?;

        if chunks.is_empty() {
            warn!("No chunks to write; store left empty");
            return Ok(0);
        }

        let schema = SchemaManager::get_chunks_schema(embedding_dim);
        let ingested_at = chrono::Utc::now().timestamp();

        let batches: Vec<std::result::Result<RecordBatch, ArrowError>> = chunks
            .chunks(self.client.batch_size())
            .zip(embeddings.chunks(self.client.batch_size()))
            .map(|(chunk_batch, embedding_batch)| {
                Self::create_record_batch(schema.clone(), chunk_batch, embedding_batch, ingested_at)
            })
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .map(Ok)
            .collect();

        debug!("Writing {} record batches", batches.len());

        let table_name = self.client.table_name();
        self.client
            .get_connection()
            .create_table(
                table_name,
                RecordBatchIterator::new(batches.into_iter(), schema),
            )
            .execute()
            .await
            .map_err(|e| RagError::Database(format!("Failed to create table: {}", e)))?;

        info!("Created table {} with {} chunks", table_name, chunks.len());
        Ok(chunks.len())
    }

    /// Create an Arrow RecordBatch from chunks and their embeddings
    fn create_record_batch(
        schema: Arc<Schema>,
        chunks: &[Chunk],
        embeddings: &[Vec<f32>],
        ingested_at: i64,
    ) -> Result<RecordBatch> {
        let ids: StringArray = chunks.iter().map(|c| Some(c.id.as_str())).collect();
        let sources: StringArray = chunks.iter().map(|c| Some(c.source.as_str())).collect();
        let relative_paths: StringArray = chunks
            .iter()
            .map(|c| Some(c.relative_path.as_str()))
            .collect();
        let titles: StringArray = chunks.iter().map(|c| c.title.as_deref()).collect();
        let start_indices: UInt64Array = chunks
            .iter()
            .map(|c| Some(c.start_index as u64))
            .collect();
        let contents: StringArray = chunks.iter().map(|c| Some(c.content.as_str())).collect();
        let ingested: Int64Array = chunks.iter().map(|_| Some(ingested_at)).collect();

        let dim = embeddings.first().map(Vec::len).unwrap_or(0);
        let embedding_values: Float32Array = embeddings
            .iter()
            .flat_map(|emb| emb.iter().copied())
            .collect();

        let embedding_list = FixedSizeListArray::try_new_from_values(embedding_values, dim as i32)
            .map_err(|e| RagError::Database(format!("Failed to create embedding array: {}", e)))?;

        RecordBatch::try_new(
            schema,
            vec![
                Arc::new(ids),
                Arc::new(sources),
                Arc::new(relative_paths),
                Arc::new(titles),
                Arc::new(start_indices),
                Arc::new(contents),
                Arc::new(ingested),
                Arc::new(embedding_list),
            ],
        )
        .map_err(|e| RagError::Database(format!("Failed to create record batch: {}", e)))
    }
}

/// Every chunk needs one embedding and all embeddings share one dimension.
/// Returns that dimension (0 when there are no chunks).
pub(crate) fn validate_embeddings(chunks: &[Chunk], embeddings: &[Vec<f32>]) -> Result<usize> {
    if chunks.len() != embeddings.len() {
        return Err(RagError::Validation(format!(
            "{} chunks but {} embeddings",
            chunks.len(),
            embeddings.len()
        )));
    }

    let dim = embeddings.first().map(Vec::len).unwrap_or(0);
    if !embeddings.is_empty() && dim == 0 {
        return Err(RagError::Validation("Embeddings are empty".to_string()));
    }

    if let Some(bad) = embeddings.iter().position(|e| e.len() != dim) {
        return Err(RagError::Validation(format!(
            "Embedding {} has dimension {}, expected {}",
            bad,
            embeddings[bad].len(),
            dim
        )));
    }

    Ok(dim)
}
