// file: src/database/schema.rs
// description: LanceDB schema management for the chunk table
// reference: https://docs.rs/lancedb

use crate::database::client::LanceDbClient;
use crate::error::{RagError, Result};
use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;
use tracing::{info, warn};

pub struct SchemaManager<'a> {
    client: &'a LanceDbClient,
}

impl<'a> SchemaManager<'a> {
    pub fn new(client: &'a LanceDbClient) -> Self {
        Self { client }
    }

    pub async fn verify_schema(&self) -> Result<bool> {
        let table_name = self.client.table_name();

        if !self.client.table_exists(table_name).await? {
            warn!("Table '{}' does not exist", table_name);
            return Ok(false);
        }

        info!("Table '{}' exists", table_name);
        Ok(true)
    }

    /// Returns the Arrow schema for the chunk table with vector embeddings
    pub fn get_chunks_schema(embedding_dim: usize) -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new("source", DataType::Utf8, false),
            Field::new("relative_path", DataType::Utf8, false),
            Field::new("title", DataType::Utf8, true),
            Field::new("start_index", DataType::UInt64, false),
            Field::new("content", DataType::Utf8, false),
            Field::new("ingested_at", DataType::Int64, false),
            Field::new(
                "embedding",
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, true)),
                    embedding_dim as i32,
                ),
                false,
            ),
        ]))
    }

    /// Drop the chunk table if present. Returns whether anything was dropped.
    pub async fn drop_chunks_table(&self) -> Result<bool> {
        let table_name = self.client.table_name();

        if !self.client.table_exists(table_name).await? {
            return Ok(false);
        }

        warn!("Dropping table: {}", table_name);
        self.client
            .get_connection()
            .drop_table(table_name)
            .await
            .map_err(|e| {
                RagError::Database(format!("Failed to drop table {}: {}", table_name, e))
            })?;
        info!("Dropped table: {}", table_name);

        Ok(true)
    }
}
