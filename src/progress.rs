//! Progress-callback trait for per-file batch events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::BatchConfigBuilder::progress_callback`] to receive events
//! as the orchestrator walks the image directory. The CLI uses this to drive
//! its progress bar; library users can forward events anywhere they like.
//!
//! # Example
//!
//! ```rust
//! use edgequake_ocrstats::{BatchConfig, BatchProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct WordTally {
//!     words: AtomicUsize,
//! }
//!
//! impl BatchProgressCallback for WordTally {
//!     fn on_file_complete(&self, _index: usize, _total: usize, _file: &str, word_count: usize) {
//!         self.words.fetch_add(word_count, Ordering::SeqCst);
//!     }
//! }
//!
//! let tally = Arc::new(WordTally { words: AtomicUsize::new(0) });
//!
//! let config = BatchConfig::builder("imgs")
//!     .progress_callback(tally as Arc<dyn BatchProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the orchestrator as it processes each file.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Files are processed one at a time, in discovery
/// order, so events for different files never interleave.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once after the directory scan, before the engine is started.
    ///
    /// # Arguments
    /// * `total_files`: number of eligible images found (may be zero)
    fn on_batch_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called just before the engine is asked to recognise a file.
    ///
    /// # Arguments
    /// * `index`: 1-indexed position in discovery order
    /// * `total`: number of eligible files
    /// * `file` : file name of the image
    fn on_file_start(&self, index: usize, total: usize, file: &str) {
        let _ = (index, total, file);
    }

    /// Called after a file's report has been written.
    ///
    /// # Arguments
    /// * `word_count`: raw word count of the recognised text
    fn on_file_complete(&self, index: usize, total: usize, file: &str, word_count: usize) {
        let _ = (index, total, file, word_count);
    }

    /// Called when a file fails, whether or not the batch continues.
    fn on_file_error(&self, index: usize, total: usize, file: &str, error: &str) {
        let _ = (index, total, file, error);
    }

    /// Called once after the summary has been written.
    ///
    /// # Arguments
    /// * `processed`  : files that produced a report
    /// * `total_words`: word count across all processed files
    fn on_batch_complete(&self, processed: usize, total_words: usize) {
        let _ = (processed, total_words);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::BatchConfig`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;
