//! Configuration types for a batch OCR run.
//!
//! Every knob of a run lives in [`BatchConfig`], built via its
//! [`BatchConfigBuilder`]. The image directory and the extension allow-list
//! are ordinary inputs here; nothing about the run is hard-coded.

use crate::error::OcrStatsError;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for processing one directory of images.
///
/// # Example
/// ```rust
/// use edgequake_ocrstats::{BatchConfig, FailurePolicy};
///
/// let config = BatchConfig::builder("imgs")
///     .extensions(["png", ".JPG"])
///     .failure_policy(FailurePolicy::Skip)
///     .build()
///     .unwrap();
/// assert_eq!(config.extensions, vec!["png", "jpg"]);
/// ```
#[derive(Clone)]
pub struct BatchConfig {
    /// Directory scanned for images. Only its direct entries are considered.
    pub input_dir: PathBuf,

    /// Eligible file extensions, lower-case and without the leading dot.
    /// Matching is case-insensitive. Default: `["png"]`.
    pub extensions: Vec<String>,

    /// Name of the results directory created inside `input_dir`. Default: `ocr_results`.
    pub output_dir_name: String,

    /// Suffix appended to each image's stem for its report. Default: `_ocr.txt`.
    pub report_suffix: String,

    /// File name of the aggregate summary. Default: `ocr_summary.txt`.
    pub summary_file_name: String,

    /// What to do when the engine fails on one file. Default: [`FailurePolicy::Abort`].
    pub failure_policy: FailurePolicy,

    /// Which OCR backend to use. Default: [`EngineKind::Tesseract`].
    pub engine: EngineKind,

    /// Recognition language (Tesseract language code). Default: `eng`.
    pub language: String,

    /// Path or name of the tesseract executable. Default: `tesseract`.
    pub tesseract_bin: PathBuf,

    /// Tesseract page segmentation mode. Default: engine default.
    pub psm: Option<u8>,

    /// Vision model identifier, e.g. "gpt-4.1-nano". If None, uses provider default.
    pub model: Option<String>,

    /// Vision provider name (e.g. "openai", "anthropic", "ollama").
    pub provider_name: Option<String>,

    /// Pre-constructed vision provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature for the vision model. Default: 0.0.
    pub temperature: f32,

    /// Maximum tokens the vision model may generate per image. Default: 4096.
    pub max_tokens: usize,

    /// Retry attempts on a failed vision call. Default: 3.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds, doubled after each attempt. Default: 500.
    pub retry_backoff_ms: u64,

    /// Longest edge, in pixels, of the image sent to the vision model. Default: 2000.
    ///
    /// Larger images are downscaled proportionally before encoding.
    pub max_image_pixels: u32,

    /// Custom transcription prompt. If None, uses the built-in default.
    pub system_prompt: Option<String>,

    /// Optional progress callback receiving per-file events.
    pub progress_callback: Option<ProgressCallback>,
}

impl BatchConfig {
    /// Create a new builder for the given image directory.
    pub fn builder(input_dir: impl Into<PathBuf>) -> BatchConfigBuilder {
        BatchConfigBuilder {
            config: Self {
                input_dir: input_dir.into(),
                extensions: vec!["png".to_string()],
                output_dir_name: "ocr_results".to_string(),
                report_suffix: "_ocr.txt".to_string(),
                summary_file_name: "ocr_summary.txt".to_string(),
                failure_policy: FailurePolicy::default(),
                engine: EngineKind::default(),
                language: "eng".to_string(),
                tesseract_bin: PathBuf::from("tesseract"),
                psm: None,
                model: None,
                provider_name: None,
                provider: None,
                temperature: 0.0,
                max_tokens: 4096,
                max_retries: 3,
                retry_backoff_ms: 500,
                max_image_pixels: 2000,
                system_prompt: None,
                progress_callback: None,
            },
        }
    }

    /// Directory that receives every report of the run.
    pub fn output_dir(&self) -> PathBuf {
        self.input_dir.join(&self.output_dir_name)
    }

    /// Path of the aggregate summary file.
    pub fn summary_path(&self) -> PathBuf {
        self.output_dir().join(&self.summary_file_name)
    }

    /// True when `ext` (with or without a leading dot) is on the allow-list.
    pub fn accepts_extension(&self, ext: &str) -> bool {
        let ext = normalise_extension(ext);
        self.extensions.iter().any(|e| *e == ext)
    }
}

impl fmt::Debug for BatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchConfig")
            .field("input_dir", &self.input_dir)
            .field("extensions", &self.extensions)
            .field("output_dir_name", &self.output_dir_name)
            .field("report_suffix", &self.report_suffix)
            .field("summary_file_name", &self.summary_file_name)
            .field("failure_policy", &self.failure_policy)
            .field("engine", &self.engine)
            .field("language", &self.language)
            .field("tesseract_bin", &self.tesseract_bin)
            .field("psm", &self.psm)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("max_retries", &self.max_retries)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn BatchProgressCallback>"),
            )
            .finish()
    }
}

/// Builder for [`BatchConfig`].
pub struct BatchConfigBuilder {
    config: BatchConfig,
}

impl fmt::Debug for BatchConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl BatchConfigBuilder {
    /// Replace the extension allow-list. Leading dots and case are normalised.
    pub fn extensions<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list: Vec<String> = Vec::new();
        for ext in exts {
            let ext = normalise_extension(ext.as_ref());
            if !list.contains(&ext) {
                list.push(ext);
            }
        }
        self.config.extensions = list;
        self
    }

    pub fn output_dir_name(mut self, name: impl Into<String>) -> Self {
        self.config.output_dir_name = name.into();
        self
    }

    pub fn report_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.report_suffix = suffix.into();
        self
    }

    pub fn summary_file_name(mut self, name: impl Into<String>) -> Self {
        self.config.summary_file_name = name.into();
        self
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.config.failure_policy = policy;
        self
    }

    pub fn engine(mut self, kind: EngineKind) -> Self {
        self.config.engine = kind;
        self
    }

    pub fn language(mut self, lang: impl Into<String>) -> Self {
        self.config.language = lang.into();
        self
    }

    pub fn tesseract_bin(mut self, bin: impl Into<PathBuf>) -> Self {
        self.config.tesseract_bin = bin.into();
        self
    }

    pub fn psm(mut self, psm: u8) -> Self {
        self.config.psm = Some(psm.min(13));
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn max_image_pixels(mut self, px: u32) -> Self {
        self.config.max_image_pixels = px.max(100);
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<BatchConfig, OcrStatsError> {
        let c = &self.config;
        if c.input_dir.as_os_str().is_empty() {
            return Err(OcrStatsError::InvalidConfig(
                "Input directory must not be empty".into(),
            ));
        }
        if c.extensions.is_empty() || c.extensions.iter().any(|e| e.is_empty()) {
            return Err(OcrStatsError::InvalidConfig(
                "At least one non-empty image extension is required".into(),
            ));
        }
        if !is_plain_file_name(&c.output_dir_name) {
            return Err(OcrStatsError::InvalidConfig(format!(
                "Output directory name must be a single path component, got '{}'",
                c.output_dir_name
            )));
        }
        if !is_plain_file_name(&c.summary_file_name) {
            return Err(OcrStatsError::InvalidConfig(format!(
                "Summary file name must be a single path component, got '{}'",
                c.summary_file_name
            )));
        }
        if c.report_suffix.contains(['/', '\\']) {
            return Err(OcrStatsError::InvalidConfig(format!(
                "Report suffix must not contain path separators, got '{}'",
                c.report_suffix
            )));
        }
        Ok(self.config)
    }
}

fn normalise_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Behaviour when the OCR engine fails on a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FailurePolicy {
    /// Stop the batch at the first failing file (default). Reports already
    /// written stay on disk; no summary is written.
    #[default]
    Abort,
    /// Log the failure, leave the file out of the summary and continue.
    Skip,
}

/// OCR backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EngineKind {
    /// Local `tesseract` executable (default).
    #[default]
    Tesseract,
    /// Vision language model through edgequake-llm.
    Vision,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_layout() {
        let c = BatchConfig::builder("imgs").build().unwrap();
        assert_eq!(c.extensions, vec!["png"]);
        assert_eq!(c.output_dir(), PathBuf::from("imgs").join("ocr_results"));
        assert_eq!(
            c.summary_path(),
            PathBuf::from("imgs").join("ocr_results").join("ocr_summary.txt")
        );
        assert_eq!(c.report_suffix, "_ocr.txt");
        assert_eq!(c.failure_policy, FailurePolicy::Abort);
        assert_eq!(c.engine, EngineKind::Tesseract);
        assert_eq!(c.language, "eng");
    }

    #[test]
    fn extensions_are_normalised_and_deduplicated() {
        let c = BatchConfig::builder("imgs")
            .extensions([".PNG", "png", "Jpeg"])
            .build()
            .unwrap();
        assert_eq!(c.extensions, vec!["png", "jpeg"]);
        assert!(c.accepts_extension("PNG"));
        assert!(c.accepts_extension(".jpeg"));
        assert!(!c.accepts_extension("gif"));
    }

    #[test]
    fn empty_extension_list_is_rejected() {
        let err = BatchConfig::builder("imgs")
            .extensions(Vec::<String>::new())
            .build()
            .unwrap_err();
        assert!(matches!(err, OcrStatsError::InvalidConfig(_)));
    }

    #[test]
    fn nested_output_dir_is_rejected() {
        let err = BatchConfig::builder("imgs")
            .output_dir_name("a/b")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("a/b"));
    }

    #[test]
    fn empty_input_dir_is_rejected() {
        assert!(BatchConfig::builder("").build().is_err());
    }

    #[test]
    fn clamps_apply() {
        let c = BatchConfig::builder("imgs")
            .temperature(9.0)
            .psm(42)
            .max_image_pixels(1)
            .build()
            .unwrap();
        assert_eq!(c.temperature, 2.0);
        assert_eq!(c.psm, Some(13));
        assert_eq!(c.max_image_pixels, 100);
    }
}
