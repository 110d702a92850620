//! Error types for the Polycap description pipeline.
//!
//! Errors are organized by layer: configuration, the inference transport,
//! and the two-stage pipeline. Every pipeline error names the stage and the
//! model involved so an operator can tell whether the vision model, the
//! translator, or the connection itself is at fault.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Polycap operations.
#[derive(Error, Debug)]
pub enum PolycapError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline errors (image input, captioning, translation)
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Failures talking to the inference server.
///
/// Transport failures are translated into one of these variants at the
/// client boundary; nothing leaves the client as a raw `reqwest::Error`.
#[derive(Error, Debug)]
pub enum InferenceError {
    /// Server unreachable (connection refused, DNS failure, ...)
    #[error("could not connect to {endpoint}: {message}")]
    Connection { endpoint: String, message: String },

    /// Request exceeded its time bound
    #[error("request to {endpoint} timed out after {timeout_ms}ms")]
    Timeout { endpoint: String, timeout_ms: u64 },

    /// Server answered with a non-2xx status
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// Server answered 2xx but the body was not the expected JSON
    #[error("malformed response: {0}")]
    InvalidResponse(String),

    /// Server answered 2xx but the `response` field was missing
    #[error("server returned no response text for model {model}")]
    EmptyResponse { model: String },

    /// Any other transport-level failure
    #[error("request failed: {0}")]
    Request(String),
}

impl InferenceError {
    /// HTTP status code, when the server produced one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            InferenceError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the server could not be reached at all.
    pub fn is_connection(&self) -> bool {
        matches!(self, InferenceError::Connection { .. })
    }

    /// True when the request ran past its timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, InferenceError::Timeout { .. })
    }
}

/// Pipeline errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A required input was missing; no request was sent
    #[error("Error: {0}")]
    Validation(String),

    /// Image file could not be read
    #[error("Failed to read image {path}: {message}")]
    ImageRead { path: PathBuf, message: String },

    /// Image file exceeds the configured size limit
    #[error("Image too large: {path} ({size_mb}MB > {max_mb}MB)")]
    ImageTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    /// File is not a JPEG, PNG, WebP or GIF image
    #[error("Unsupported image {path}: {message}")]
    UnsupportedImage { path: PathBuf, message: String },

    /// Stage 1 request failed
    #[error("VLM Error ({model}): {source}")]
    Vlm {
        model: String,
        #[source]
        source: InferenceError,
    },

    /// Stage 1 succeeded at the transport level but produced no text
    #[error("Error: Failed to get English description from {model}. Check Ollama logs.")]
    EmptyDescription { model: String },

    /// Stage 2 request failed; the English description is preserved
    #[error("Translation Error ({model}): Could not translate to {language}. Details: {source}")]
    Translation {
        model: String,
        language: String,
        english_text: String,
        #[source]
        source: InferenceError,
    },

    /// Stage 2 produced no text for a language where that signals a script failure
    #[error(
        "Translation failed for {language}. The LLM produced no text. \
         This usually indicates an issue with script generation."
    )]
    TranslationEmpty {
        language: String,
        english_text: String,
    },
}

impl PipelineError {
    /// Which stage the failure belongs to: "input", "caption" or "translation".
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Validation(_)
            | PipelineError::ImageRead { .. }
            | PipelineError::ImageTooLarge { .. }
            | PipelineError::UnsupportedImage { .. } => "input",
            PipelineError::Vlm { .. } | PipelineError::EmptyDescription { .. } => "caption",
            PipelineError::Translation { .. } | PipelineError::TranslationEmpty { .. } => {
                "translation"
            }
        }
    }

    /// English description obtained before a translation failure.
    pub fn partial_english(&self) -> Option<&str> {
        match self {
            PipelineError::Translation { english_text, .. }
            | PipelineError::TranslationEmpty { english_text, .. } => Some(english_text),
            _ => None,
        }
    }

    /// Underlying inference failure, if this error wraps one.
    pub fn inference_error(&self) -> Option<&InferenceError> {
        match self {
            PipelineError::Vlm { source, .. } | PipelineError::Translation { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }
}

/// Convenience type alias for Polycap results.
pub type Result<T> = std::result::Result<T, PolycapError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_classification() {
        let err = PipelineError::Validation("missing".into());
        assert_eq!(err.stage(), "input");

        let err = PipelineError::EmptyDescription {
            model: "llava:latest".into(),
        };
        assert_eq!(err.stage(), "caption");

        let err = PipelineError::TranslationEmpty {
            language: "Amharic".into(),
            english_text: "A dog runs.".into(),
        };
        assert_eq!(err.stage(), "translation");
    }

    #[test]
    fn test_partial_english_only_for_translation_failures() {
        let err = PipelineError::Translation {
            model: "qwen2:7b".into(),
            language: "French".into(),
            english_text: "A dog runs.".into(),
            source: InferenceError::Request("boom".into()),
        };
        assert_eq!(err.partial_english(), Some("A dog runs."));

        let err = PipelineError::Vlm {
            model: "llava:latest".into(),
            source: InferenceError::HttpStatus {
                status: 500,
                body: String::new(),
            },
        };
        assert_eq!(err.partial_english(), None);
    }

    #[test]
    fn test_messages_name_stage_and_model() {
        let err = PipelineError::Vlm {
            model: "moondream:1.8b".into(),
            source: InferenceError::Connection {
                endpoint: "http://127.0.0.1:11434".into(),
                message: "connection refused".into(),
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("VLM Error"));
        assert!(msg.contains("moondream:1.8b"));

        let err = PipelineError::Translation {
            model: "qwen2:7b".into(),
            language: "Spanish".into(),
            english_text: String::new(),
            source: InferenceError::Timeout {
                endpoint: "http://127.0.0.1:11434".into(),
                timeout_ms: 60_000,
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("qwen2:7b"));
        assert!(msg.contains("Spanish"));
        assert!(msg.contains("60000ms"));
    }

    #[test]
    fn test_inference_error_helpers() {
        let err = InferenceError::HttpStatus {
            status: 404,
            body: "model not found".into(),
        };
        assert_eq!(err.status_code(), Some(404));
        assert!(!err.is_connection());

        let err = InferenceError::Connection {
            endpoint: "http://localhost:1".into(),
            message: "refused".into(),
        };
        assert!(err.is_connection());
        assert!(!err.is_timeout());
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn test_inference_error_exposes_cause() {
        let err = PipelineError::Vlm {
            model: "llava:latest".into(),
            source: InferenceError::Timeout {
                endpoint: "http://127.0.0.1:11434".into(),
                timeout_ms: 180_000,
            },
        };
        assert!(err.inference_error().is_some_and(InferenceError::is_timeout));

        let err = PipelineError::EmptyDescription {
            model: "llava:latest".into(),
        };
        assert!(err.inference_error().is_none());
    }

    #[test]
    fn test_polycap_error_from_layers() {
        fn load() -> Result<()> {
            Err(ConfigError::ValidationError("bad".into()))?
        }
        fn describe() -> Result<()> {
            Err(PipelineError::Validation("missing".into()))?
        }

        assert!(matches!(load(), Err(PolycapError::Config(_))));
        let err = describe().unwrap_err();
        assert!(matches!(err, PolycapError::Pipeline(_)));
        assert_eq!(err.to_string(), "Pipeline error: Error: missing");
    }
}
