// file: src/pipeline/progress.rs
// description: progress tracking and statistics reporting for ingestion
// reference: uses indicatif for progress bars and tracks processing metrics

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestStats {
    pub documents_loaded: usize,
    pub chunks_created: usize,
    pub chunks_saved: usize,
    pub total_bytes_processed: u64,
    pub duration_ms: u64,
}

impl IngestStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chunks_per_document(&self) -> f64 {
        if self.documents_loaded == 0 {
            return 0.0;
        }
        self.chunks_created as f64 / self.documents_loaded as f64
    }

    pub fn chunks_per_second(&self) -> f64 {
        if self.duration_ms == 0 {
            return 0.0;
        }
        self.chunks_saved as f64 * 1000.0 / self.duration_ms as f64
    }
}

/// Progress over chunks embedded so far.
pub struct ProgressTracker {
    bar: ProgressBar,
    chunks_embedded: AtomicUsize,
    start_time: Instant,
}

impl ProgressTracker {
    pub fn new(total_chunks: usize) -> Self {
        Self::with_color(total_chunks, true)
    }

    pub fn with_color(total_chunks: usize, colored: bool) -> Self {
        let bar = create_progress_bar(total_chunks as u64, colored);

        Self {
            bar,
            chunks_embedded: AtomicUsize::new(0),
            start_time: Instant::now(),
        }
    }

    /// A tracker that never draws, for tests and non-interactive runs.
    pub fn hidden(total_chunks: usize) -> Self {
        let tracker = Self::with_color(total_chunks, false);
        tracker.bar.set_draw_target(ProgressDrawTarget::hidden());
        tracker
    }

    pub fn add_embedded(&self, count: usize) {
        self.chunks_embedded.fetch_add(count, Ordering::SeqCst);
        self.bar.inc(count as u64);
    }

    pub fn set_message(&self, message: String) {
        self.bar.set_message(message);
    }

    pub fn chunks_embedded(&self) -> usize {
        self.chunks_embedded.load(Ordering::SeqCst)
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }

    pub fn finish(&self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        self.finish();
    }
}

fn create_progress_bar(total: u64, colored: bool) -> ProgressBar {
    let bar = ProgressBar::new(total);
    let template = if colored {
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks embedded {msg}"
    } else {
        "{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} chunks embedded {msg}"
    };

    match ProgressStyle::default_bar().template(template) {
        Ok(style) => bar.set_style(style.progress_chars(if colored { "█▓▒░" } else { "=>-" })),
        Err(_) => bar.set_style(ProgressStyle::default_bar()),
    }
    bar
}
