//! Error types for the edgequake-ocrstats library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`OcrStatsError`] is **fatal**: the batch cannot continue (input
//!   directory unreadable, output directory cannot be created, a report
//!   could not be written). Returned as `Err(OcrStatsError)` from the
//!   top-level `process_directory*` functions.
//!
//! * [`OcrError`] is **per file**: the OCR engine failed on a single image.
//!   Under [`crate::config::FailurePolicy::Abort`] it is wrapped into
//!   [`OcrStatsError::OcrInvocation`] and ends the run; under
//!   [`crate::config::FailurePolicy::Skip`] it is recorded in
//!   [`crate::output::FailedFile`] and the batch moves on.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-ocrstats library.
#[derive(Debug, Error)]
pub enum OcrStatsError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The image directory is missing or cannot be listed.
    #[error("Cannot read image directory '{path}': {source}\nCheck the path exists and is readable.")]
    DirectoryAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// The results directory could not be created (and did not already exist).
    #[error("Failed to create output directory '{path}': {source}")]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A per-file report or the summary could not be written.
    #[error("Failed to write report '{path}': {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── OCR errors ────────────────────────────────────────────────────────
    /// The OCR engine could not be started.
    #[error("Failed to start OCR engine '{engine}': {source}")]
    EngineInit {
        engine: String,
        #[source]
        source: OcrError,
    },

    /// The OCR engine failed on one file; the batch was aborted.
    #[error("OCR failed for '{file}': {source}")]
    OcrInvocation {
        file: String,
        #[source]
        source: OcrError,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A failure of the OCR engine on a single image.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum OcrError {
    /// The engine could not be started (binary missing, provider not configured).
    #[error("OCR engine '{engine}' is unavailable.\n{hint}")]
    EngineUnavailable { engine: String, hint: String },

    /// The image file could not be read.
    #[error("Failed to read '{path}': {detail}")]
    Io { path: PathBuf, detail: String },

    /// The external OCR process exited unsuccessfully.
    #[error("OCR process exited with {status}: {stderr}")]
    ProcessFailed { status: String, stderr: String },

    /// The image could not be decoded.
    #[error("Failed to decode image '{path}': {detail}")]
    ImageDecode { path: PathBuf, detail: String },

    /// The vision model call failed after retries.
    #[error("Vision model call failed after {retries} retries: {detail}")]
    LlmFailed { retries: u32, detail: String },

    /// The OCR engine produced bytes that are not valid UTF-8.
    #[error("OCR output is not valid UTF-8")]
    InvalidUtf8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ocr_invocation_display_names_file() {
        let e = OcrStatsError::OcrInvocation {
            file: "scan_02.png".into(),
            source: OcrError::ProcessFailed {
                status: "exit status: 1".into(),
                stderr: "Error in pixReadStream".into(),
            },
        };
        let msg = e.to_string();
        assert!(msg.contains("scan_02.png"), "got: {msg}");
        assert!(msg.contains("pixReadStream"), "got: {msg}");
    }

    #[test]
    fn directory_access_display() {
        let e = OcrStatsError::DirectoryAccess {
            path: PathBuf::from("/nope/imgs"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(e.to_string().contains("/nope/imgs"));
    }

    #[test]
    fn engine_unavailable_display() {
        let e = OcrError::EngineUnavailable {
            engine: "tesseract".into(),
            hint: "Install tesseract-ocr".into(),
        };
        assert!(e.to_string().contains("tesseract"));
        assert!(e.to_string().contains("Install"));
    }

    #[test]
    fn llm_failed_display() {
        let e = OcrError::LlmFailed {
            retries: 3,
            detail: "HTTP 503".into(),
        };
        assert!(e.to_string().contains("3 retries"));
        assert!(e.to_string().contains("HTTP 503"));
    }

    #[test]
    fn ocr_error_serialises() {
        let e = OcrError::InvalidUtf8;
        let json = serde_json::to_string(&e).expect("serialise");
        assert!(json.contains("InvalidUtf8"));
    }
}
