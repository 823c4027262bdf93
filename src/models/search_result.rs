// file: src/models/search_result.rs
// description: Search result model with relevance scores
// reference: Used for vector similarity search results

use crate::models::Chunk;
use crate::utils::Validator;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub chunk: Chunk,

    /// Relevance score in [0, 1], higher is more relevant
    pub score: f32,

    /// Raw distance reported by the store, lower is closer
    pub distance: Option<f32>,
}

impl SearchResult {
    pub fn new(chunk: Chunk, score: f32, distance: Option<f32>) -> Self {
        Self {
            chunk,
            score,
            distance,
        }
    }

    /// Build a result from a cosine distance, mapping it to a relevance score.
    pub fn from_cosine_distance(chunk: Chunk, distance: f32) -> Self {
        Self::new(chunk, relevance_from_cosine_distance(distance), Some(distance))
    }

    pub fn source(&self) -> &str {
        &self.chunk.source
    }

    /// Format as a summary string for display
    pub fn format_summary(&self, max_content_chars: usize) -> String {
        let content_preview = Validator::truncate_text(&self.chunk.content, max_content_chars);

        format!(
            "Score: {:.4} | {} @{}\n{}\n",
            self.score, self.chunk.relative_path, self.chunk.start_index, content_preview
        )
    }
}

/// Cosine distance lies in [0, 2]; relevance is `1 - distance` clamped to [0, 1].
pub fn relevance_from_cosine_distance(distance: f32) -> f32 {
    if distance.is_nan() {
        return 0.0;
    }
    (1.0 - distance).clamp(0.0, 1.0)
}
