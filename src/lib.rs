//! # edgequake-ocrstats
//!
//! Batch-OCR a directory of images and write word-frequency reports.
//!
//! For every eligible image the text is recognised by an OCR engine, split
//! into words, normalised and tallied. Each image gets its own report, and a
//! summary lists every file in processing order with its totals.
//!
//! ## Pipeline Overview
//!
//! ```text
//! imgs/
//!  │
//!  ├─ 1. Scan     list eligible images (extension allow-list, listing order)
//!  ├─ 2. OCR      tesseract process or vision LLM, one image at a time
//!  ├─ 3. Count    whitespace tokens → normalised word frequencies
//!  ├─ 4. Report   imgs/ocr_results/<stem>_ocr.txt
//!  └─ 5. Summary  imgs/ocr_results/ocr_summary.txt
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_ocrstats::{process_directory, BatchConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BatchConfig::builder("imgs").build()?;
//!     let report = process_directory(&config).await?;
//!     eprintln!(
//!         "{} files, {} words",
//!         report.totals.file_count, report.totals.total_words
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `ocrstats` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ## Engines
//!
//! | Engine | Needs | Notes |
//! |--------|-------|-------|
//! | `tesseract` | `tesseract` on `PATH` | Default; offline |
//! | `vision`    | an LLM API key (`OPENAI_API_KEY`, …) | Any edgequake-llm vision provider |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod config;
pub mod engine;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::{
    process_directory, process_directory_sync, process_directory_with, process_file,
    BatchAccumulator, ProcessedFile,
};
pub use config::{BatchConfig, BatchConfigBuilder, EngineKind, FailurePolicy};
pub use engine::{build_engine, OcrEngine, TesseractEngine, VisionEngine};
pub use error::{OcrError, OcrStatsError};
pub use output::{BatchReport, FailedFile, FileSummary, RunTotals};
pub use pipeline::report::{render_file_report, render_summary};
pub use pipeline::scan::{scan_directory, InputFile};
pub use pipeline::tokenize::{analyze_text, normalize_word, TextStats, WordFrequency};
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
