//! Inference backend trait and request/result types.

use crate::error::InferenceError;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

/// Body of a `POST /api/generate` call.
///
/// `images` is only present for vision calls; text-only calls omit the
/// field entirely. Responses are always requested whole (`stream: false`).
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    pub stream: bool,
}

impl GenerationRequest {
    /// Text-only request (translation).
    pub fn text(model: &str, prompt: String) -> Self {
        Self {
            model: model.to_string(),
            prompt,
            images: None,
            stream: false,
        }
    }

    /// Request carrying one base64-encoded image (captioning).
    pub fn with_image(model: &str, prompt: String, image_base64: &str) -> Self {
        Self {
            model: model.to_string(),
            prompt,
            images: Some(vec![image_base64.to_string()]),
            stream: false,
        }
    }

    pub fn has_image(&self) -> bool {
        self.images.as_ref().is_some_and(|i| !i.is_empty())
    }
}

/// Text produced by one generate call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    /// The server's `response` field, untouched
    pub text: String,
    /// Whether the server answered 2xx
    pub success: bool,
    /// Raw HTTP status code
    pub status_code: u16,
}

/// A model-serving backend exposing model inventory and text generation.
///
/// Uses `async_trait` so the pipeline can hold an `Arc<dyn InferenceBackend>`
/// and tests can substitute a recording double.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Backend name for logging (e.g. "ollama").
    fn name(&self) -> &str;

    /// Base URL this backend talks to.
    fn endpoint(&self) -> &str;

    /// Identifiers of all models installed on the server.
    async fn list_models(&self, timeout: Duration) -> Result<Vec<String>, InferenceError>;

    /// Run one non-streaming generation bounded by `timeout`.
    async fn generate(
        &self,
        request: &GenerationRequest,
        timeout: Duration,
    ) -> Result<GenerationResult, InferenceError>;
}
