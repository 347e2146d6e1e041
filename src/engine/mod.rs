//! OCR engines: the collaborator that turns an image into text.
//!
//! The orchestrator owns exactly one engine per run and drives it through
//! the [`OcrEngine`] lifecycle:
//!
//! ```text
//! initialize ──▶ recognize × N ──▶ release
//! (only if N > 0)                  (always, exactly once)
//! ```
//!
//! Two backends ship with the crate:
//!
//! * [`TesseractEngine`]: spawns the local `tesseract` executable per image.
//! * [`VisionEngine`]: sends each image to a vision LLM through edgequake-llm.
//!
//! Any other engine (a test double, a remote service) only has to implement
//! the trait.

pub mod tesseract;
pub mod vision;

pub use tesseract::TesseractEngine;
pub use vision::VisionEngine;

use crate::config::{BatchConfig, EngineKind};
use crate::error::OcrError;
use async_trait::async_trait;
use std::path::Path;

/// An OCR backend holding whatever state it needs across calls.
///
/// Engines are used from a single task, one image at a time, so methods
/// take `&mut self`.
#[async_trait]
pub trait OcrEngine: Send {
    /// Short identifier for logs, e.g. `"tesseract"`.
    fn name(&self) -> &str;

    /// Acquire engine resources. Called once, only when there is work to do.
    async fn initialize(&mut self) -> Result<(), OcrError> {
        Ok(())
    }

    /// Recognise the text of one image.
    async fn recognize(&mut self, path: &Path) -> Result<String, OcrError>;

    /// Release engine resources.
    ///
    /// Always called exactly once at the end of a run, including runs where
    /// [`OcrEngine::initialize`] was never called or failed.
    async fn release(&mut self);
}

/// Build the engine selected by `config.engine`.
pub fn build_engine(config: &BatchConfig) -> Box<dyn OcrEngine> {
    match config.engine {
        EngineKind::Tesseract => Box::new(TesseractEngine::from_config(config)),
        EngineKind::Vision => Box::new(VisionEngine::from_config(config)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_engine_respects_kind() {
        let config = BatchConfig::builder("imgs").build().unwrap();
        assert_eq!(build_engine(&config).name(), "tesseract");

        let config = BatchConfig::builder("imgs")
            .engine(EngineKind::Vision)
            .build()
            .unwrap();
        assert_eq!(build_engine(&config).name(), "vision");
    }
}
