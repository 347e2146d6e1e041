//! Result types produced by a batch run.

use crate::error::OcrError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Per-file record used for the aggregate summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSummary {
    /// File name of the image (no directory component).
    pub file_name: String,
    /// Whitespace-delimited tokens in the recognised text.
    pub word_count: usize,
    /// Distinct normalised words in the file's frequency table.
    pub unique_words: usize,
}

/// Running totals across every processed file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTotals {
    pub file_count: usize,
    pub total_words: usize,
}

impl RunTotals {
    /// Totals after adding one more file.
    pub fn with_file(self, summary: &FileSummary) -> Self {
        Self {
            file_count: self.file_count + 1,
            total_words: self.total_words + summary.word_count,
        }
    }
}

/// A file skipped under [`crate::config::FailurePolicy::Skip`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedFile {
    pub file_name: String,
    pub error: OcrError,
}

/// Everything a completed run produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    /// Per-file summaries in processing order.
    pub summaries: Vec<FileSummary>,
    pub totals: RunTotals,
    /// Results directory, or `None` when no eligible file was found.
    pub output_dir: Option<PathBuf>,
    /// Written per-file report paths, in processing order.
    pub report_paths: Vec<PathBuf>,
    /// Aggregate summary path, or `None` when no eligible file was found.
    pub summary_path: Option<PathBuf>,
    /// Files that failed and were skipped.
    pub failed: Vec<FailedFile>,
    pub duration_ms: u64,
}

impl BatchReport {
    /// True when the scan found nothing to process.
    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty() && self.failed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_accumulate() {
        let a = FileSummary {
            file_name: "a.png".into(),
            word_count: 5,
            unique_words: 3,
        };
        let b = FileSummary {
            file_name: "b.png".into(),
            word_count: 0,
            unique_words: 0,
        };
        let totals = RunTotals::default().with_file(&a).with_file(&b);
        assert_eq!(totals.file_count, 2);
        assert_eq!(totals.total_words, 5);
    }

    #[test]
    fn default_report_is_empty() {
        assert!(BatchReport::default().is_empty());
    }
}
