//! CLI binary for edgequake-ocrstats.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `BatchConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_ocrstats::{
    process_directory, scan_directory, BatchConfig, BatchProgressCallback, BatchReport,
    EngineKind, FailurePolicy, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live bar plus one log line per file.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Start time of the file currently being recognised.
    current_start: Mutex<Option<Instant>>,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    /// Spinner until `on_batch_start` tells us how many files there are.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Scanning");
        bar.set_message("Listing images…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            current_start: Mutex::new(None),
            errors: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Recognising");
        self.bar.reset_eta();
    }

    /// Remove the bar from the terminal when the run ends in an error.
    fn abandon(&self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }

    fn elapsed_secs(&self) -> f64 {
        self.current_start
            .lock()
            .ok()
            .and_then(|mut guard| guard.take())
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_files: usize) {
        if total_files == 0 {
            self.bar.finish_and_clear();
            return;
        }
        self.activate_bar(total_files);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Found {total_files} image files to process"))
        ));
    }

    fn on_file_start(&self, _index: usize, _total: usize, file: &str) {
        if let Ok(mut guard) = self.current_start.lock() {
            *guard = Some(Instant::now());
        }
        self.bar.set_message(file.to_string());
    }

    fn on_file_complete(&self, index: usize, total: usize, file: &str, word_count: usize) {
        let secs = self.elapsed_secs();
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {:<32}  {}  {}",
            green("✓"),
            index,
            total,
            file,
            dim(&format!("{word_count:>6} words")),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_file_error(&self, index: usize, total: usize, file: &str, error: &str) {
        let secs = self.elapsed_secs();
        self.errors.fetch_add(1, Ordering::SeqCst);

        // Truncate very long error messages to keep output tidy.
        let msg: String = if error.chars().count() > 80 {
            let head: String = error.chars().take(79).collect();
            format!("{head}\u{2026}")
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {:<32}  {}  {}",
            red("✗"),
            index,
            total,
            file,
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, processed: usize, total_words: usize) {
        let failed = self.errors.load(Ordering::SeqCst);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} files processed, {} words",
                green("✔"),
                bold(&processed.to_string()),
                bold(&total_words.to_string())
            );
        } else {
            eprintln!(
                "{} {} files processed, {} words  ({} skipped)",
                cyan("⚠"),
                bold(&processed.to_string()),
                bold(&total_words.to_string()),
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Process ./imgs with tesseract
  ocrstats

  # Another directory, PNG and JPEG
  ocrstats scans/ --ext png,jpg,jpeg

  # Keep going when a file fails
  ocrstats scans/ --skip-failures

  # Use a vision model instead of tesseract
  ocrstats scans/ --engine vision --provider openai --model gpt-4.1-mini

  # Show which files would be processed
  ocrstats scans/ --dry-run

  # Machine-readable run report
  ocrstats scans/ --json > run.json

OUTPUT:
  <dir>/ocr_results/<name>_ocr.txt    per-image word frequencies
  <dir>/ocr_results/ocr_summary.txt   totals and one line per image

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key (vision engine)
  ANTHROPIC_API_KEY       Anthropic API key (vision engine)
  GEMINI_API_KEY          Google Gemini API key (vision engine)
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  RUST_LOG                Override log filter
"#;

/// Batch-OCR a directory of images and write word-frequency reports.
#[derive(Parser, Debug)]
#[command(
    name = "ocrstats",
    version,
    about = "Batch-OCR a directory of images and write word-frequency reports",
    long_about = "Recognise the text of every image in a directory (tesseract or a vision LLM), \
count word frequencies per image, and write one report per image plus a run summary \
into <dir>/ocr_results/.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Directory containing the images.
    #[arg(env = "OCRSTATS_INPUT_DIR", default_value = "imgs")]
    input_dir: PathBuf,

    /// Eligible image extensions (case-insensitive).
    #[arg(long = "ext", env = "OCRSTATS_EXTENSIONS", value_delimiter = ',', default_value = "png")]
    extensions: Vec<String>,

    /// Name of the results directory created inside the input directory.
    #[arg(long, env = "OCRSTATS_OUTPUT_DIR", default_value = "ocr_results")]
    output_dir_name: String,

    /// OCR engine: tesseract or vision.
    #[arg(long, env = "OCRSTATS_ENGINE", value_enum, default_value = "tesseract")]
    engine: EngineArg,

    /// Recognition language (tesseract language code).
    #[arg(long, env = "OCRSTATS_LANG", default_value = "eng")]
    lang: String,

    /// Path to the tesseract executable.
    #[arg(long, env = "OCRSTATS_TESSERACT_BIN", default_value = "tesseract")]
    tesseract_bin: PathBuf,

    /// Tesseract page segmentation mode (0–13).
    #[arg(long, env = "OCRSTATS_PSM", value_parser = clap::value_parser!(u8).range(0..=13))]
    psm: Option<u8>,

    /// Vision model ID (e.g. gpt-4.1-nano, claude-sonnet-4-20250514).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// Vision provider: openai, anthropic, gemini, ollama, azure.
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// Path to a text file containing a custom transcription prompt.
    #[arg(long, env = "OCRSTATS_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// Max vision-model output tokens per image.
    #[arg(long, env = "OCRSTATS_MAX_TOKENS", default_value_t = 4096)]
    max_tokens: usize,

    /// Vision-model temperature (0.0–2.0).
    #[arg(long, env = "OCRSTATS_TEMPERATURE", default_value_t = 0.0)]
    temperature: f32,

    /// Retries per image on vision-model failure.
    #[arg(long, env = "OCRSTATS_MAX_RETRIES", default_value_t = 3)]
    max_retries: u32,

    /// Skip files the engine fails on instead of aborting the batch.
    #[arg(long, env = "OCRSTATS_SKIP_FAILURES")]
    skip_failures: bool,

    /// List the images that would be processed, then exit.
    #[arg(long)]
    dry_run: bool,

    /// Print the run report as JSON on stdout.
    #[arg(long, env = "OCRSTATS_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "OCRSTATS_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "OCRSTATS_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "OCRSTATS_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum EngineArg {
    Tesseract,
    Vision,
}

impl From<EngineArg> for EngineKind {
    fn from(v: EngineArg) -> Self {
        match v {
            EngineArg::Tesseract => EngineKind::Tesseract,
            EngineArg::Vision => EngineKind::Vision,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level progress lines when it is shown.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.dry_run;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let cli_progress = show_progress.then(CliProgressCallback::new_dynamic);
    let progress_cb: Option<ProgressCallback> = cli_progress
        .clone()
        .map(|cb| cb as Arc<dyn BatchProgressCallback>);

    let config = match build_config(&cli, progress_cb).await {
        Ok(config) => config,
        Err(e) => {
            clear_progress(cli_progress.as_deref());
            return Err(e);
        }
    };

    // ── Dry run ──────────────────────────────────────────────────────────
    if cli.dry_run {
        let files = scan_directory(&config)
            .await
            .context("Failed to scan image directory")?;
        for f in &files {
            println!("{}", f.path.display());
        }
        if !cli.quiet {
            eprintln!(
                "{} eligible files in {}",
                files.len(),
                config.input_dir.display()
            );
        }
        return Ok(());
    }

    // ── Run batch ────────────────────────────────────────────────────────
    let report = match process_directory(&config).await {
        Ok(report) => report,
        Err(e) => {
            // `on_batch_complete` never fires on an aborted run.
            clear_progress(cli_progress.as_deref());
            return Err(e).context("OCR batch failed");
        }
    };

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    } else if !cli.quiet {
        print_outcome(&report);
    }

    Ok(())
}

fn clear_progress(progress: Option<&CliProgressCallback>) {
    if let Some(cb) = progress {
        cb.abandon();
    }
}

/// One-line outcome on stderr.
fn print_outcome(report: &BatchReport) {
    match report.summary_path {
        None => eprintln!("{} No eligible image files found.", cyan("⚠")),
        Some(ref path) => {
            eprintln!(
                "{}  {} files  {} words  {}ms  →  {}",
                if report.failed.is_empty() {
                    green("✔")
                } else {
                    cyan("⚠")
                },
                report.totals.file_count,
                report.totals.total_words,
                report.duration_ms,
                bold(&path.display().to_string()),
            );
            for f in &report.failed {
                eprintln!("   {} {}: {}", red("✗"), f.file_name, dim(&f.error.to_string()));
            }
        }
    }
}

/// Map CLI args to `BatchConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<BatchConfig> {
    let system_prompt = if let Some(ref path) = cli.system_prompt {
        Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read system prompt from {:?}", path))?,
        )
    } else {
        None
    };

    let mut builder = BatchConfig::builder(&cli.input_dir)
        .extensions(&cli.extensions)
        .output_dir_name(&cli.output_dir_name)
        .engine(cli.engine.clone().into())
        .language(&cli.lang)
        .tesseract_bin(&cli.tesseract_bin)
        .max_tokens(cli.max_tokens)
        .temperature(cli.temperature)
        .max_retries(cli.max_retries)
        .failure_policy(if cli.skip_failures {
            FailurePolicy::Skip
        } else {
            FailurePolicy::Abort
        });

    if let Some(psm) = cli.psm {
        builder = builder.psm(psm);
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(prompt) = system_prompt {
        builder = builder.system_prompt(prompt);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aborted_run_clears_the_bar() {
        let cb = CliProgressCallback::new_dynamic();
        cb.on_batch_start(3);
        cb.on_file_start(1, 3, "a.png");
        cb.on_file_error(1, 3, "a.png", "exit status: 1");
        assert!(!cb.bar.is_finished());

        clear_progress(Some(cb.as_ref()));
        assert!(cb.bar.is_finished());
        // A second clear is harmless.
        clear_progress(Some(cb.as_ref()));
    }

    #[test]
    fn completed_run_finishes_the_bar() {
        let cb = CliProgressCallback::new_dynamic();
        cb.on_batch_start(1);
        cb.on_file_complete(1, 1, "a.png", 4);
        cb.on_batch_complete(1, 4);
        assert!(cb.bar.is_finished());
    }
}
