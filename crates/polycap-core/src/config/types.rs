//! Sub-configuration structs with defaults matching the stock Ollama setup.

use crate::prompt::PromptVariant;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default Ollama endpoint (local loopback).
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:11434";

/// Port Ollama listens on unless told otherwise.
pub const DEFAULT_PORT: u16 = 11434;

/// Inference server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the Ollama-compatible server
    pub endpoint: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

/// A selectable vision model and its display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisionModel {
    /// Model identifier as known to the server (e.g. "llava:latest")
    pub id: String,

    /// Human-readable capability label
    pub label: String,
}

impl VisionModel {
    pub fn new(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
        }
    }
}

/// Model catalog: selectable vision models plus the fixed translator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Text-only model used for every translation
    pub translator: String,

    /// Vision models offered for captioning, in display order
    pub vision: Vec<VisionModel>,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            translator: "qwen2:7b".to_string(),
            vision: vec![
                VisionModel::new("moondream:1.8b", "Fast Captioning (VLM)"),
                VisionModel::new("llava:latest", "Detailed Object Analysis (VLM)"),
            ],
        }
    }
}

/// Target language settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguagesConfig {
    /// Language preselected in prompts and used when none is given
    pub default: String,

    /// Display names offered as translation targets
    pub supported: Vec<String>,
}

impl Default for LanguagesConfig {
    fn default() -> Self {
        Self {
            default: "English".to_string(),
            supported: ["English", "Chinese", "Amharic", "French", "Spanish"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Per-language prompt policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    /// Languages where an empty translation is reported as a failure.
    /// Matched exactly (case-sensitive) against the target language.
    pub strict_empty: Vec<String>,

    /// Caption prompt variant per target language (exact display name).
    /// Languages not listed get the detailed prompt.
    pub caption_variants: BTreeMap<String, PromptVariant>,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            strict_empty: vec!["Amharic".to_string()],
            caption_variants: BTreeMap::from([("Amharic".to_string(), PromptVariant::Short)]),
        }
    }
}

/// Time and size bounds for a single request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Stage 1 (vision captioning) timeout in milliseconds
    pub caption_timeout_ms: u64,

    /// Stage 2 (translation) timeout in milliseconds
    pub translation_timeout_ms: u64,

    /// Model inventory (health check) timeout in milliseconds
    pub health_timeout_ms: u64,

    /// Maximum image file size in megabytes
    pub max_image_size_mb: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            caption_timeout_ms: 180_000,
            translation_timeout_ms: 60_000,
            health_timeout_ms: 5_000,
            max_image_size_mb: 20,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format ("text" or "json")
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
            pretty: false,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
