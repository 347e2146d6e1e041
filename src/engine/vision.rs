//! Vision backend: transcribe each image with a multimodal LLM.
//!
//! ## Retry Strategy
//!
//! HTTP 429 / 503 errors from LLM APIs are transient. Each image gets
//! `max_retries` extra attempts with exponential backoff
//! (`retry_backoff_ms * 2^attempt`): 500 ms → 1 s → 2 s by default.
//! Only when every attempt fails does the file count as failed.

use super::OcrEngine;
use crate::config::BatchConfig;
use crate::error::OcrError;
use crate::pipeline::{encode, postprocess};
use crate::prompts::{language_hint, DEFAULT_SYSTEM_PROMPT};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, ImageData, LLMProvider, ProviderFactory};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

const DEFAULT_MODEL: &str = "gpt-4.1-nano";

/// OCR through a vision LLM provider.
pub struct VisionEngine {
    provider: Option<Arc<dyn LLMProvider>>,
    preset_provider: Option<Arc<dyn LLMProvider>>,
    provider_name: Option<String>,
    model: Option<String>,
    language: String,
    system_prompt: Option<String>,
    temperature: f32,
    max_tokens: usize,
    max_retries: u32,
    retry_backoff_ms: u64,
    max_image_pixels: u32,
}

impl VisionEngine {
    pub fn from_config(config: &BatchConfig) -> Self {
        Self {
            provider: None,
            preset_provider: config.provider.clone(),
            provider_name: config.provider_name.clone(),
            model: config.model.clone(),
            language: config.language.clone(),
            system_prompt: config.system_prompt.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            max_retries: config.max_retries,
            retry_backoff_ms: config.retry_backoff_ms,
            max_image_pixels: config.max_image_pixels,
        }
    }

    /// Resolve the provider, from most-specific to least-specific.
    ///
    /// 1. **Pre-built provider** from the config.
    /// 2. **Named provider + model** (`provider_name`, `model`).
    /// 3. **Environment pair** `EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`.
    /// 4. **OpenAI** when `OPENAI_API_KEY` is set.
    /// 5. **Full auto-detection** via `ProviderFactory::from_env`.
    fn resolve_provider(&self) -> Result<Arc<dyn LLMProvider>, OcrError> {
        if let Some(ref provider) = self.preset_provider {
            return Ok(Arc::clone(provider));
        }

        if let Some(ref name) = self.provider_name {
            let model = self.model.as_deref().unwrap_or(DEFAULT_MODEL);
            return create_vision_provider(name, model);
        }

        if let (Ok(prov), Ok(model)) = (
            std::env::var("EDGEQUAKE_LLM_PROVIDER"),
            std::env::var("EDGEQUAKE_MODEL"),
        ) {
            if !prov.is_empty() && !model.is_empty() {
                return create_vision_provider(&prov, &model);
            }
        }

        if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
            if !openai_key.is_empty() {
                let model = self.model.as_deref().unwrap_or(DEFAULT_MODEL);
                return create_vision_provider("openai", model);
            }
        }

        let (llm_provider, _embedding) =
            ProviderFactory::from_env().map_err(|e| OcrError::EngineUnavailable {
                engine: "vision".to_string(),
                hint: format!(
                    "No LLM provider could be auto-detected from environment.\n\
                    Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or pass --provider.\n\
                    Error: {}",
                    e
                ),
            })?;

        Ok(llm_provider)
    }

    fn build_messages(&self, image: ImageData) -> Vec<ChatMessage> {
        let system_prompt = self
            .system_prompt
            .as_deref()
            .unwrap_or(DEFAULT_SYSTEM_PROMPT);
        vec![
            ChatMessage::system(system_prompt),
            ChatMessage::system(language_hint(&self.language)),
            ChatMessage::user_with_images("", vec![image]),
        ]
    }

    fn build_options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
            ..Default::default()
        }
    }
}

fn create_vision_provider(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn LLMProvider>, OcrError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        OcrError::EngineUnavailable {
            engine: format!("vision ({provider_name})"),
            hint: format!("{e}"),
        }
    })
}

#[async_trait]
impl OcrEngine for VisionEngine {
    fn name(&self) -> &str {
        "vision"
    }

    async fn initialize(&mut self) -> Result<(), OcrError> {
        if self.provider.is_none() {
            let provider = self.resolve_provider()?;
            info!(
                "Using vision provider '{}' (model: {})",
                self.provider_name.as_deref().unwrap_or("auto"),
                self.model.as_deref().unwrap_or("provider default")
            );
            self.provider = Some(provider);
        }
        Ok(())
    }

    async fn recognize(&mut self, path: &Path) -> Result<String, OcrError> {
        if self.provider.is_none() {
            self.initialize().await?;
        }
        let provider = match self.provider {
            Some(ref p) => Arc::clone(p),
            None => {
                return Err(OcrError::EngineUnavailable {
                    engine: "vision".to_string(),
                    hint: "provider was not initialised".to_string(),
                })
            }
        };

        let start = Instant::now();
        let image_path = path.to_path_buf();
        let max_pixels = self.max_image_pixels;
        let image = tokio::task::spawn_blocking(move || {
            let img = encode::load_image(&image_path, max_pixels)?;
            encode::encode_image(&img).map_err(|e| OcrError::ImageDecode {
                path: image_path.clone(),
                detail: format!("PNG encoding failed: {e}"),
            })
        })
        .await
        .map_err(|e| OcrError::ImageDecode {
            path: path.to_path_buf(),
            detail: format!("decode task panicked: {e}"),
        })??;

        let messages = self.build_messages(image);
        let options = self.build_options();
        let mut last_err: Option<String> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let backoff = self.retry_backoff_ms * 2u64.pow(attempt - 1);
                warn!(
                    "{}: retry {}/{} after {}ms",
                    path.display(),
                    attempt,
                    self.max_retries,
                    backoff
                );
                sleep(Duration::from_millis(backoff)).await;
            }

            match provider.chat(&messages, Some(&options)).await {
                Ok(response) => {
                    debug!(
                        "{}: {} input tokens, {} output tokens, {:?}",
                        path.display(),
                        response.prompt_tokens,
                        response.completion_tokens,
                        start.elapsed()
                    );
                    return Ok(postprocess::clean_transcription(&response.content));
                }
                Err(e) => {
                    let err_msg = format!("{}", e);
                    warn!(
                        "{}: attempt {} failed: {}",
                        path.display(),
                        attempt + 1,
                        err_msg
                    );
                    last_err = Some(err_msg);
                }
            }
        }

        Err(OcrError::LlmFailed {
            retries: self.max_retries,
            detail: last_err.unwrap_or_else(|| "Unknown error".to_string()),
        })
    }

    async fn release(&mut self) {
        if self.provider.take().is_some() {
            debug!("Released vision provider");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_options_defaults() {
        let config = BatchConfig::builder("imgs").build().unwrap();
        let engine = VisionEngine::from_config(&config);
        let opts = engine.build_options();
        assert_eq!(opts.temperature, Some(0.0));
        assert_eq!(opts.max_tokens, Some(4096));
    }

    #[test]
    fn messages_are_prompt_hint_and_image() {
        let config = BatchConfig::builder("imgs")
            .language("fra")
            .system_prompt("Read it.")
            .build()
            .unwrap();
        let engine = VisionEngine::from_config(&config);
        let messages = engine.build_messages(ImageData::new("AAAA".to_string(), "image/png"));
        assert_eq!(messages.len(), 3);
    }

    #[tokio::test]
    async fn release_without_initialize_is_harmless() {
        let config = BatchConfig::builder("imgs").build().unwrap();
        let mut engine = VisionEngine::from_config(&config);
        engine.release().await;
        engine.release().await;
        assert!(engine.provider.is_none());
    }
}
