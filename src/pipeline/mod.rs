//! Pipeline stages for batch OCR word statistics.
//!
//! Each submodule implements exactly one step, so each is testable on its
//! own and the orchestrator in [`crate::batch`] only sequences them.
//!
//! ## Data Flow
//!
//! ```text
//! scan ──▶ (engine) ──▶ tokenize ──▶ report
//!                 └─ encode / postprocess (vision engine only)
//! ```
//!
//! 1. [`scan`]       : list eligible images in the input directory
//! 2. [`tokenize`]   : split recognised text, normalise and count words
//! 3. [`report`]     : render per-file reports and the run summary
//! 4. [`encode`]     : decode, downscale and base64 an image for a vision model
//! 5. [`postprocess`]: strip fences and invisible characters from model output

pub mod encode;
pub mod postprocess;
pub mod report;
pub mod scan;
pub mod tokenize;
