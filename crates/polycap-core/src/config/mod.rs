//! Configuration management for Polycap.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. The loaded value is passed explicitly into every entry point;
//! nothing reads configuration from global state.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use crate::prompt::CaptionPolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure for Polycap.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Inference server settings
    pub server: ServerConfig,

    /// Vision models and translator
    pub models: ModelsConfig,

    /// Target languages
    pub languages: LanguagesConfig,

    /// Per-language prompt policy
    pub prompts: PromptsConfig,

    /// Timeouts and size limits
    pub limits: LimitsConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.polycap.polycap/config.toml
    /// - Linux: ~/.config/polycap/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\polycap\config\config.toml
    ///
    /// Falls back to ~/.polycap/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "polycap", "polycap")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".polycap").join("config.toml")
            })
    }

    /// Return a copy with the server endpoint replaced, when one is given.
    ///
    /// Used by callers that let the user edit the endpoint per request.
    pub fn with_endpoint(mut self, endpoint: Option<&str>) -> Result<Self, ConfigError> {
        if let Some(endpoint) = endpoint {
            self.server.endpoint = normalize_endpoint(endpoint);
            self.validate()?;
        }
        Ok(self)
    }

    /// Server endpoint with any trailing slash removed.
    pub fn endpoint(&self) -> &str {
        self.server.endpoint.trim_end_matches('/')
    }

    /// Every model the pipeline may call, sorted and de-duplicated.
    pub fn required_models(&self) -> BTreeSet<String> {
        self.models
            .vision
            .iter()
            .map(|m| m.id.clone())
            .chain(std::iter::once(self.models.translator.clone()))
            .collect()
    }

    /// Look up a vision model by identifier.
    pub fn vision_model(&self, id: &str) -> Option<&VisionModel> {
        self.models.vision.iter().find(|m| m.id == id)
    }

    /// The vision model used when the caller doesn't pick one.
    pub fn default_vision_model(&self) -> Option<&VisionModel> {
        self.models.vision.first()
    }

    /// Caption prompt policy built from the `[prompts]` table.
    pub fn caption_policy(&self) -> CaptionPolicy {
        CaptionPolicy::new(self.prompts.caption_variants.clone())
    }

    pub fn caption_timeout(&self) -> Duration {
        Duration::from_millis(self.limits.caption_timeout_ms)
    }

    pub fn translation_timeout(&self) -> Duration {
        Duration::from_millis(self.limits.translation_timeout_ms)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_millis(self.limits.health_timeout_ms)
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

/// Accept `host[:port]` the way Ollama's own `OLLAMA_HOST` does.
///
/// A value without a scheme gets `http://` and, when it names no port,
/// Ollama's default port. A value with a scheme is kept as-is.
pub fn normalize_endpoint(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() || trimmed.contains("://") {
        return trimmed.to_string();
    }

    let (authority, path) = match trimmed.find('/') {
        Some(idx) => trimmed.split_at(idx),
        None => (trimmed, ""),
    };
    let has_port = match authority.strip_prefix('[') {
        // Bracketed IPv6: the port follows the closing bracket
        Some(rest) => rest.contains("]:"),
        None => authority.contains(':'),
    };

    if has_port {
        format!("http://{authority}{path}")
    } else {
        format!("http://{authority}:{DEFAULT_PORT}{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::PromptVariant;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.endpoint(), "http://127.0.0.1:11434");
        assert_eq!(config.models.translator, "qwen2:7b");
        assert_eq!(config.models.vision.len(), 2);
        assert_eq!(config.limits.caption_timeout_ms, 180_000);
        assert_eq!(config.limits.translation_timeout_ms, 60_000);
    }

    #[test]
    fn test_required_models_sorted() {
        let config = Config::default();
        let required: Vec<String> = config.required_models().into_iter().collect();
        assert_eq!(required, vec!["llava:latest", "moondream:1.8b", "qwen2:7b"]);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[server]"));
        assert!(toml.contains("[limits]"));
        assert!(toml.contains("qwen2:7b"));
    }

    #[test]
    fn test_toml_round_trip_keeps_caption_variants() {
        let toml = Config::default().to_toml().unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(
            parsed.prompts.caption_variants.get("Amharic"),
            Some(&PromptVariant::Short)
        );
        assert_eq!(parsed.models.vision, Config::default().models.vision);
    }

    #[test]
    fn test_load_from_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
endpoint = "http://gpu-box:11434/"

[prompts.caption_variants]
Amharic = "short"
Tigrinya = "short"
"#
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.endpoint(), "http://gpu-box:11434");
        assert_eq!(config.models.translator, "qwen2:7b");
        assert_eq!(
            config.prompts.caption_variants.get("Tigrinya"),
            Some(&PromptVariant::Short)
        );
    }

    #[test]
    fn test_load_from_rejects_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[limits]\ncaption_timeout_ms = 0").unwrap();
        let err = Config::load_from(file.path()).unwrap_err();
        assert!(err.to_string().contains("caption_timeout_ms"));
    }

    #[test]
    fn test_with_endpoint_override() {
        let config = Config::default()
            .with_endpoint(Some("http://10.0.0.5:11434"))
            .unwrap();
        assert_eq!(config.endpoint(), "http://10.0.0.5:11434");

        let config = Config::default().with_endpoint(None).unwrap();
        assert_eq!(config.endpoint(), DEFAULT_ENDPOINT);

        assert!(Config::default().with_endpoint(Some("")).is_err());
    }

    #[test]
    fn test_normalize_endpoint() {
        assert_eq!(normalize_endpoint("0.0.0.0:11434"), "http://0.0.0.0:11434");
        assert_eq!(normalize_endpoint("gpu-box:8080"), "http://gpu-box:8080");
        assert_eq!(
            normalize_endpoint(" https://ollama.example.com/ "),
            "https://ollama.example.com"
        );
        assert_eq!(normalize_endpoint("  "), "");
    }

    #[test]
    fn test_normalize_bare_host_gets_default_port() {
        assert_eq!(normalize_endpoint("0.0.0.0"), "http://0.0.0.0:11434");
        assert_eq!(normalize_endpoint("gpu-box"), "http://gpu-box:11434");
        assert_eq!(normalize_endpoint("[::1]"), "http://[::1]:11434");
        assert_eq!(normalize_endpoint("[::1]:9000"), "http://[::1]:9000");
        assert_eq!(normalize_endpoint("gpu-box/ollama/"), "http://gpu-box:11434/ollama");
        // An explicit scheme keeps its own default port
        assert_eq!(normalize_endpoint("https://ollama.example.com"), "https://ollama.example.com");
    }

    #[test]
    fn test_with_endpoint_bare_host() {
        let config = Config::default().with_endpoint(Some("0.0.0.0")).unwrap();
        assert_eq!(config.endpoint(), "http://0.0.0.0:11434");
    }

    #[test]
    fn test_vision_model_lookup() {
        let config = Config::default();
        assert_eq!(
            config.vision_model("llava:latest").map(|m| m.label.as_str()),
            Some("Detailed Object Analysis (VLM)")
        );
        assert!(config.vision_model("qwen2:7b").is_none());
        assert_eq!(
            config.default_vision_model().map(|m| m.id.as_str()),
            Some("moondream:1.8b")
        );
    }
}
