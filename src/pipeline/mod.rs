// file: src/pipeline/mod.rs
// description: pipeline module exports and public api
// reference: pipeline orchestration

#[cfg(test)]
pub(crate) mod fakes;
mod ingest;
mod progress;
mod query;

pub use ingest::IngestPipeline;
pub use progress::{IngestStats, ProgressTracker};
pub use query::{PreparedQuery, QueryAnswer, QueryOutcome, QueryPipeline, Retrieval};
