//! Configuration validation with range and catalog checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = self.server.endpoint.trim();
        if endpoint.is_empty() {
            return Err(ConfigError::ValidationError(
                "server.endpoint must not be empty".into(),
            ));
        }
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "server.endpoint must start with http:// or https:// (got '{endpoint}')"
            )));
        }
        if self.models.vision.is_empty() {
            return Err(ConfigError::ValidationError(
                "models.vision must list at least one model".into(),
            ));
        }
        if let Some(model) = self.models.vision.iter().find(|m| m.id.trim().is_empty()) {
            return Err(ConfigError::ValidationError(format!(
                "models.vision entry '{}' has an empty id",
                model.label
            )));
        }
        if self.models.translator.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "models.translator must not be empty".into(),
            ));
        }
        if self
            .models
            .vision
            .iter()
            .any(|m| m.id == self.models.translator)
        {
            return Err(ConfigError::ValidationError(format!(
                "models.translator '{}' must not also be a vision model",
                self.models.translator
            )));
        }
        if self.limits.caption_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.caption_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.translation_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.translation_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.health_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.health_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.max_image_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_size_mb must be > 0".into(),
            ));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::ValidationError(format!(
                "logging.format must be \"pretty\" or \"json\" (got '{}')",
                self.logging.format
            )));
        }
        Ok(())
    }
}
