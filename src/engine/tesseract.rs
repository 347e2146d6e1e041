//! Tesseract backend: one `tesseract <image> stdout` process per image.
//!
//! Shelling out keeps the crate free of native build dependencies; any
//! tesseract 4.x/5.x on `PATH` (or at `--tesseract-bin`) works.
//! [`TesseractEngine::initialize`] probes `tesseract --version` so a missing
//! binary is reported once, before the first image, with an install hint.

use super::OcrEngine;
use crate::config::BatchConfig;
use crate::error::OcrError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

const INSTALL_HINT: &str = "Install tesseract (apt install tesseract-ocr / brew install tesseract)\n\
or point --tesseract-bin at an existing executable.";

/// OCR through the `tesseract` command-line tool.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    bin: PathBuf,
    language: String,
    psm: Option<u8>,
    version: Option<String>,
}

impl TesseractEngine {
    pub fn new(bin: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            bin: bin.into(),
            language: language.into(),
            psm: None,
            version: None,
        }
    }

    pub fn from_config(config: &BatchConfig) -> Self {
        Self {
            psm: config.psm,
            ..Self::new(&config.tesseract_bin, &config.language)
        }
    }

    /// Version line reported by the binary, once initialised.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Arguments for recognising `image`, excluding the program itself.
    fn recognize_args(&self, image: &Path) -> Vec<String> {
        let mut args = vec![
            image.to_string_lossy().into_owned(),
            "stdout".to_string(),
            "-l".to_string(),
            self.language.clone(),
        ];
        if let Some(psm) = self.psm {
            args.push("--psm".to_string());
            args.push(psm.to_string());
        }
        args
    }

    fn spawn_error(&self, e: std::io::Error) -> OcrError {
        if e.kind() == std::io::ErrorKind::NotFound {
            OcrError::EngineUnavailable {
                engine: format!("tesseract ({})", self.bin.display()),
                hint: INSTALL_HINT.to_string(),
            }
        } else {
            OcrError::Io {
                path: self.bin.clone(),
                detail: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn initialize(&mut self) -> Result<(), OcrError> {
        let output = Command::new(&self.bin)
            .arg("--version")
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(OcrError::EngineUnavailable {
                engine: format!("tesseract ({})", self.bin.display()),
                hint: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        // Older releases print the version banner on stderr.
        let banner = if output.stdout.is_empty() {
            &output.stderr
        } else {
            &output.stdout
        };
        let version = String::from_utf8_lossy(banner)
            .lines()
            .next()
            .unwrap_or("tesseract")
            .trim()
            .to_string();
        info!("Using {} (language: {})", version, self.language);
        self.version = Some(version);
        Ok(())
    }

    async fn recognize(&mut self, path: &Path) -> Result<String, OcrError> {
        let args = self.recognize_args(path);
        debug!("Running {} {}", self.bin.display(), args.join(" "));

        let output = Command::new(&self.bin)
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(OcrError::ProcessFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        String::from_utf8(output.stdout).map_err(|_| OcrError::InvalidUtf8)
    }

    async fn release(&mut self) {
        // Each call is its own process; nothing stays resident.
        if self.version.take().is_some() {
            debug!("Released tesseract engine");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_without_psm() {
        let engine = TesseractEngine::new("tesseract", "eng");
        assert_eq!(
            engine.recognize_args(Path::new("imgs/a.png")),
            vec!["imgs/a.png", "stdout", "-l", "eng"]
        );
    }

    #[test]
    fn args_with_psm_from_config() {
        let config = BatchConfig::builder("imgs")
            .language("deu")
            .psm(6)
            .build()
            .unwrap();
        let engine = TesseractEngine::from_config(&config);
        assert_eq!(
            engine.recognize_args(Path::new("b.png")),
            vec!["b.png", "stdout", "-l", "deu", "--psm", "6"]
        );
    }

    #[tokio::test]
    async fn missing_binary_is_engine_unavailable() {
        let mut engine = TesseractEngine::new("/nonexistent/bin/tesseract-xyz", "eng");
        let err = engine.initialize().await.unwrap_err();
        assert!(matches!(err, OcrError::EngineUnavailable { .. }), "got {err:?}");
        engine.release().await;
    }

    #[tokio::test]
    async fn release_without_initialize_is_harmless() {
        let mut engine = TesseractEngine::new("tesseract", "eng");
        engine.release().await;
        engine.release().await;
        assert!(engine.version().is_none());
    }

    #[tokio::test]
    async fn live_recognition_of_blank_image() {
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP: set E2E_ENABLED=1 to run tesseract tests");
            return;
        }
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("blank.png");
        image::RgbaImage::from_pixel(64, 64, image::Rgba([255, 255, 255, 255]))
            .save(&path)
            .unwrap();

        let mut engine = TesseractEngine::new("tesseract", "eng");
        engine.initialize().await.expect("tesseract installed");
        let text = engine.recognize(&path).await.expect("recognise");
        assert!(text.trim().is_empty(), "got {text:?}");
        engine.release().await;
    }
}
