//! Directory pipeline: scan → OCR → count → report, one file at a time.
//!
//! ```text
//! scan ──▶ initialize ──▶ ┌ recognize ─▶ analyze ─▶ write <stem>_ocr.txt ┐ ──▶ write summary
//!                         └──────────────────── per file ────────────────┘
//!                                        release (always)
//! ```
//!
//! Files are processed strictly in discovery order and the engine is never
//! shared, so there is no concurrency here. The running totals are an
//! explicit [`BatchAccumulator`] value folded over the file list.

use crate::config::{BatchConfig, FailurePolicy};
use crate::engine::{build_engine, OcrEngine};
use crate::error::{OcrError, OcrStatsError};
use crate::output::{BatchReport, FailedFile, FileSummary, RunTotals};
use crate::pipeline::report::{render_file_report, render_summary};
use crate::pipeline::scan::{scan_directory, InputFile};
use crate::pipeline::tokenize::{analyze_text, WordFrequency};
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Process every eligible image in `config.input_dir` with the configured engine.
///
/// Builds the engine from [`BatchConfig::engine`] and delegates to
/// [`process_directory_with`].
///
/// # Errors
/// Any fatal [`OcrStatsError`]. Reports written before the failure stay on disk.
pub async fn process_directory(config: &BatchConfig) -> Result<BatchReport, OcrStatsError> {
    let mut engine = build_engine(config);
    process_directory_with(config, engine.as_mut()).await
}

/// Process every eligible image in `config.input_dir` with `engine`.
///
/// The engine is initialised only when at least one eligible file exists,
/// and [`OcrEngine::release`] is called exactly once before returning,
/// whatever the outcome.
pub async fn process_directory_with(
    config: &BatchConfig,
    engine: &mut dyn OcrEngine,
) -> Result<BatchReport, OcrStatsError> {
    let outcome = run_batch(config, engine).await;
    engine.release().await;
    if let Err(ref e) = outcome {
        debug!("Batch ended with error after engine release: {}", e);
    }
    outcome
}

/// Synchronous wrapper around [`process_directory`].
///
/// Creates a temporary tokio runtime internally.
pub fn process_directory_sync(config: &BatchConfig) -> Result<BatchReport, OcrStatsError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| OcrStatsError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(process_directory(config))
}

/// One recognised and tabulated image, not yet written anywhere.
#[derive(Debug, Clone)]
pub struct ProcessedFile {
    pub summary: FileSummary,
    pub frequency: WordFrequency,
    /// Rendered per-file report.
    pub report: String,
}

/// Recognise one image and compute its statistics and report text.
pub async fn process_file(
    engine: &mut dyn OcrEngine,
    file: &InputFile,
) -> Result<ProcessedFile, OcrError> {
    let text = engine.recognize(&file.path).await?;
    let stats = analyze_text(&text);
    let summary = FileSummary {
        file_name: file.file_name.clone(),
        word_count: stats.word_count,
        unique_words: stats.unique_words(),
    };
    let report = render_file_report(&summary, &stats.frequency);
    Ok(ProcessedFile {
        summary,
        frequency: stats.frequency,
        report,
    })
}

/// Accumulated state of a run, threaded through the per-file loop.
#[derive(Debug, Clone, Default)]
pub struct BatchAccumulator {
    pub summaries: Vec<FileSummary>,
    pub totals: RunTotals,
    pub report_paths: Vec<PathBuf>,
    pub failed: Vec<FailedFile>,
}

impl BatchAccumulator {
    /// State after one more file has been reported.
    pub fn with_file(mut self, summary: FileSummary, report_path: PathBuf) -> Self {
        self.totals = self.totals.with_file(&summary);
        self.summaries.push(summary);
        self.report_paths.push(report_path);
        self
    }

    /// State after one more file has been skipped.
    pub fn with_failure(mut self, file_name: String, error: OcrError) -> Self {
        self.failed.push(FailedFile { file_name, error });
        self
    }
}

async fn run_batch(
    config: &BatchConfig,
    engine: &mut dyn OcrEngine,
) -> Result<BatchReport, OcrStatsError> {
    let start = Instant::now();
    let callback = config.progress_callback.as_ref();

    info!("Using image directory: {}", config.input_dir.display());
    let files = scan_directory(config).await?;
    let total = files.len();
    if let Some(cb) = callback {
        cb.on_batch_start(total);
    }

    if files.is_empty() {
        info!(
            "No {} files found in the directory.",
            config.extensions.join("/").to_uppercase()
        );
        return Ok(BatchReport {
            duration_ms: start.elapsed().as_millis() as u64,
            ..BatchReport::default()
        });
    }
    info!("Found {} image files to process.", total);

    engine
        .initialize()
        .await
        .map_err(|source| OcrStatsError::EngineInit {
            engine: engine.name().to_string(),
            source,
        })?;

    let output_dir = config.output_dir();
    ensure_output_dir(&output_dir).await?;

    let mut names = ReportNames::reserving(&config.summary_file_name);
    let mut acc = BatchAccumulator::default();
    for (i, file) in files.iter().enumerate() {
        let index = i + 1;
        info!("Processing {}...", file.file_name);
        if let Some(cb) = callback {
            cb.on_file_start(index, total, &file.file_name);
        }

        let processed = match process_file(engine, file).await {
            Ok(p) => p,
            Err(e) => {
                if let Some(cb) = callback {
                    cb.on_file_error(index, total, &file.file_name, &e.to_string());
                }
                match config.failure_policy {
                    FailurePolicy::Abort => {
                        return Err(OcrStatsError::OcrInvocation {
                            file: file.file_name.clone(),
                            source: e,
                        });
                    }
                    FailurePolicy::Skip => {
                        warn!("Skipping {}: {}", file.file_name, e);
                        acc = acc.with_failure(file.file_name.clone(), e);
                        continue;
                    }
                }
            }
        };

        let report_path = output_dir.join(names.claim(file, &config.report_suffix));
        write_report(&report_path, &processed.report).await?;

        let word_count = processed.summary.word_count;
        acc = acc.with_file(processed.summary, report_path);
        info!("Processed {}: {} words found", file.file_name, word_count);
        if let Some(cb) = callback {
            cb.on_file_complete(index, total, &file.file_name, word_count);
        }
    }

    let summary_path = config.summary_path();
    write_report(&summary_path, &render_summary(&acc.summaries, &acc.totals)).await?;
    info!(
        "Processing complete! Summary written to {}",
        summary_path.display()
    );
    if let Some(cb) = callback {
        cb.on_batch_complete(acc.totals.file_count, acc.totals.total_words);
    }

    Ok(BatchReport {
        summaries: acc.summaries,
        totals: acc.totals,
        output_dir: Some(output_dir),
        report_paths: acc.report_paths,
        summary_path: Some(summary_path),
        failed: acc.failed,
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

/// Report file names handed out during one run.
///
/// Names are compared case-insensitively so that `scan.png` and `scan.PNG`
/// never share a report, even on a case-insensitive filesystem.
#[derive(Debug, Default)]
struct ReportNames {
    taken: HashSet<String>,
}

impl ReportNames {
    fn reserving(summary_file_name: &str) -> Self {
        let mut names = Self::default();
        names.taken.insert(summary_file_name.to_lowercase());
        names
    }

    /// `<stem><suffix>` when free, else `<file name><suffix>`, else `<stem>_<n><suffix>`.
    fn claim(&mut self, file: &InputFile, suffix: &str) -> String {
        let preferred = format!("{}{}", file.stem(), suffix);
        if self.taken.insert(preferred.to_lowercase()) {
            return preferred;
        }
        let mut name = format!("{}{}", file.file_name, suffix);
        let mut n = 2usize;
        while !self.taken.insert(name.to_lowercase()) {
            name = format!("{}_{}{}", file.stem(), n, suffix);
            n += 1;
        }
        warn!(
            "{} already used by another file in this run; writing {} for {}",
            preferred, name, file.file_name
        );
        name
    }
}

/// Create the results directory; an existing directory is fine.
async fn ensure_output_dir(dir: &Path) -> Result<(), OcrStatsError> {
    match tokio::fs::create_dir(dir).await {
        Ok(()) => {
            debug!("Created output directory {}", dir.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            let is_dir = tokio::fs::metadata(dir)
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false);
            if is_dir {
                Ok(())
            } else {
                Err(OcrStatsError::OutputDirectory {
                    path: dir.to_path_buf(),
                    source: e,
                })
            }
        }
        Err(e) => Err(OcrStatsError::OutputDirectory {
            path: dir.to_path_buf(),
            source: e,
        }),
    }
}

/// Write `contents` to `path`, replacing any existing file.
///
/// Atomic write: a temp file in the same directory is persisted over `path`,
/// so an interrupted run never leaves a half-written report.
async fn write_report(path: &Path, contents: &str) -> Result<(), OcrStatsError> {
    let target = path.to_path_buf();
    let data = contents.to_owned();
    tokio::task::spawn_blocking(move || write_atomic(&target, data.as_bytes()))
        .await
        .map_err(|e| OcrStatsError::Internal(format!("Write task panicked: {}", e)))?
        .map_err(|source| OcrStatsError::WriteFailed {
            path: path.to_path_buf(),
            source,
        })
}

fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| std::io::Error::other("report path has no parent directory"))?;
    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(data)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
