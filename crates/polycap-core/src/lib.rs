//! Polycap Core - multilingual image descriptions over an Ollama server.
//!
//! Polycap sends an image to a vision model for an English description, then
//! (unless the target is English) asks a fixed translator model to translate
//! it. All inference happens on an Ollama-compatible HTTP server.
//!
//! # Architecture
//!
//! ```text
//! Image → Caption prompt → VLM (/api/generate + image) → English text
//!       → Translation prompt → translator (/api/generate) → Target language
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use polycap_core::{Config, DescribeRequest, Polycap};
//!
//! #[tokio::main]
//! async fn main() -> polycap_core::Result<()> {
//!     let polycap = Polycap::new(Config::load()?);
//!     let image = polycap.load_image("./cat.jpg".as_ref())?;
//!
//!     let request = DescribeRequest::new("llava:latest", "French", image);
//!     let outcome = polycap.describe(&request).await?;
//!     println!("{}", outcome.final_text);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod describe;
pub mod error;
pub mod image;
pub mod inference;
pub mod output;
pub mod prompt;

// Re-exports for convenient access
pub use config::Config;
pub use describe::{DescribeRequest, Describer, DescriptionOutcome, Stage};
pub use error::{ConfigError, InferenceError, PipelineError, PipelineResult, PolycapError, Result};
pub use image::{ImageInput, ImageLoader};
pub use inference::{
    check_health, HealthErrorReason, HealthStatus, HealthTier, InferenceBackend, OllamaClient,
};
pub use output::{DescriptionRecord, OutputFormat, OutputWriter};
pub use prompt::{build_caption_prompt, build_translation_prompt, CaptionPolicy, PromptVariant};

use std::path::Path;
use std::sync::Arc;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Polycap entry point: one configuration, one inference server.
///
/// Holds no state across requests beyond the read-only configuration, so a
/// single instance can serve concurrent callers.
pub struct Polycap {
    config: Config,
    describer: Describer,
}

impl Polycap {
    /// Create an instance talking to the Ollama server named in `config`.
    pub fn new(config: Config) -> Self {
        let backend: Arc<dyn InferenceBackend> = Arc::new(OllamaClient::new(config.endpoint()));
        Self::with_backend(config, backend)
    }

    /// Create an instance over any backend (used for tests and embedding).
    pub fn with_backend(config: Config, backend: Arc<dyn InferenceBackend>) -> Self {
        tracing::debug!(
            "Initializing Polycap v{} ({} at {})",
            VERSION,
            backend.name(),
            backend.endpoint()
        );
        let describer = Describer::from_config(backend, &config);
        Self { config, describer }
    }

    /// Get a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Read and encode an image file under the configured limits.
    pub fn load_image(&self, path: &Path) -> PipelineResult<ImageInput> {
        ImageLoader::new(self.config.limits.clone()).load(path)
    }

    /// Run the caption → translate pipeline.
    pub async fn describe(&self, request: &DescribeRequest) -> PipelineResult<DescriptionOutcome> {
        self.describer.describe(request).await
    }

    /// Run the pipeline, reporting each stage as it starts.
    pub async fn describe_with_progress<F>(
        &self,
        request: &DescribeRequest,
        on_stage: F,
    ) -> PipelineResult<DescriptionOutcome>
    where
        F: Fn(Stage) + Send + Sync,
    {
        self.describer
            .describe_with_progress(request, on_stage)
            .await
    }

    /// Check the server and the availability of every configured model.
    pub async fn check_health(&self) -> HealthStatus {
        check_health(
            self.describer.backend(),
            &self.config.required_models(),
            self.config.health_timeout(),
        )
        .await
    }
}
