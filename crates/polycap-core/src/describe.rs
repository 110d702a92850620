//! Two-stage description pipeline.
//!
//! Stage 1 asks a vision model for an English description of the image.
//! Stage 2, skipped for English targets, asks the fixed translator model to
//! translate that description. The stages run strictly in sequence, each
//! bounded by its own timeout, with no retries. A stage 2 failure never
//! discards the stage 1 text: it travels inside the error.

use crate::config::Config;
use crate::error::{InferenceError, PipelineError, PipelineResult};
use crate::image::ImageInput;
use crate::inference::{GenerationRequest, InferenceBackend};
use crate::prompt::{build_translation_prompt, CaptionPolicy};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// One user request: which vision model, which language, which image.
#[derive(Debug, Clone)]
pub struct DescribeRequest {
    pub vision_model: String,
    pub target_language: String,
    pub image: ImageInput,
}

impl DescribeRequest {
    pub fn new(vision_model: &str, target_language: &str, image: ImageInput) -> Self {
        Self {
            vision_model: vision_model.to_string(),
            target_language: target_language.to_string(),
            image,
        }
    }
}

/// Successful pipeline result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DescriptionOutcome {
    /// Description in the target language
    pub final_text: String,
    /// Stage 1 English text; `None` when the target was English
    #[serde(skip_serializing_if = "Option::is_none")]
    pub english_text: Option<String>,
    pub target_language: String,
    pub vision_model: String,
    /// Translator used, when stage 2 ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translator_model: Option<String>,
}

impl DescriptionOutcome {
    pub fn was_translated(&self) -> bool {
        self.translator_model.is_some()
    }
}

/// Pipeline stage about to run, reported to progress callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Vision model is describing the image
    Captioning,
    /// Translator is translating the English description
    Translating,
}

/// True when no translation stage is needed for `language`.
pub fn is_english(language: &str) -> bool {
    language.eq_ignore_ascii_case("english")
}

/// Runs the caption → translate pipeline against one backend.
pub struct Describer {
    backend: Arc<dyn InferenceBackend>,
    translator_model: String,
    policy: CaptionPolicy,
    strict_empty: Vec<String>,
    caption_timeout: Duration,
    translation_timeout: Duration,
}

impl Describer {
    /// Create a describer with the default prompt policy and timeouts.
    pub fn new(backend: Arc<dyn InferenceBackend>, translator_model: &str) -> Self {
        let config = Config::default();
        Self {
            backend,
            translator_model: translator_model.to_string(),
            policy: CaptionPolicy::default(),
            strict_empty: config.prompts.strict_empty,
            caption_timeout: Duration::from_millis(config.limits.caption_timeout_ms),
            translation_timeout: Duration::from_millis(config.limits.translation_timeout_ms),
        }
    }

    /// Create a describer from the translator, prompt policy and limits in `config`.
    pub fn from_config(backend: Arc<dyn InferenceBackend>, config: &Config) -> Self {
        Self {
            backend,
            translator_model: config.models.translator.clone(),
            policy: config.caption_policy(),
            strict_empty: config.prompts.strict_empty.clone(),
            caption_timeout: config.caption_timeout(),
            translation_timeout: config.translation_timeout(),
        }
    }

    pub fn backend(&self) -> &dyn InferenceBackend {
        self.backend.as_ref()
    }

    /// Describe the image in the requested language.
    pub async fn describe(&self, request: &DescribeRequest) -> PipelineResult<DescriptionOutcome> {
        self.describe_with_progress(request, |_| {}).await
    }

    /// Like [`describe`](Self::describe), calling `on_stage` before each
    /// network stage starts so a front-end can show progress.
    pub async fn describe_with_progress<F>(
        &self,
        request: &DescribeRequest,
        on_stage: F,
    ) -> PipelineResult<DescriptionOutcome>
    where
        F: Fn(Stage) + Send + Sync,
    {
        validate(request)?;

        let model = request.vision_model.as_str();
        let language = request.target_language.as_str();

        // ── Stage 1: English caption ──────────────────────────────────────
        let caption_prompt = self.policy.caption_prompt(language);
        tracing::info!(model, language, "Generating English description");
        on_stage(Stage::Captioning);

        let caption = GenerationRequest::with_image(model, caption_prompt, &request.image.data);
        let english = match self.backend.generate(&caption, self.caption_timeout).await {
            Ok(result) => result.text,
            Err(InferenceError::EmptyResponse { .. }) => {
                return Err(PipelineError::EmptyDescription {
                    model: model.to_string(),
                });
            }
            Err(source) => {
                tracing::error!(model, "VLM request failed: {source}");
                return Err(PipelineError::Vlm {
                    model: model.to_string(),
                    source,
                });
            }
        };

        if english.is_empty() {
            return Err(PipelineError::EmptyDescription {
                model: model.to_string(),
            });
        }

        if is_english(language) {
            return Ok(DescriptionOutcome {
                final_text: english,
                english_text: None,
                target_language: language.to_string(),
                vision_model: model.to_string(),
                translator_model: None,
            });
        }

        // ── Stage 2: translation ──────────────────────────────────────────
        let translator = self.translator_model.as_str();
        tracing::info!(model = translator, language, "Translating description");
        on_stage(Stage::Translating);

        let prompt = build_translation_prompt(&english, language);
        let translation = GenerationRequest::text(translator, prompt);
        let translated = match self
            .backend
            .generate(&translation, self.translation_timeout)
            .await
        {
            Ok(result) => result.text.trim().to_string(),
            Err(source) => {
                tracing::error!(model = translator, "Translation request failed: {source}");
                return Err(PipelineError::Translation {
                    model: translator.to_string(),
                    language: language.to_string(),
                    english_text: english,
                    source,
                });
            }
        };

        if translated.is_empty() {
            if self.strict_empty.iter().any(|l| l == language) {
                return Err(PipelineError::TranslationEmpty {
                    language: language.to_string(),
                    english_text: english,
                });
            }
            tracing::warn!(language, "Translator returned empty text");
        }

        Ok(DescriptionOutcome {
            final_text: translated,
            english_text: Some(english),
            target_language: language.to_string(),
            vision_model: model.to_string(),
            translator_model: Some(translator.to_string()),
        })
    }
}

fn validate(request: &DescribeRequest) -> PipelineResult<()> {
    if request.vision_model.trim().is_empty()
        || request.target_language.trim().is_empty()
        || request.image.is_empty()
    {
        return Err(PipelineError::Validation(
            "Model, language, and image selection are required.".to_string(),
        ));
    }
    Ok(())
}
