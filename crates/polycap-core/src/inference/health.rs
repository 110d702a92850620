//! Server health and model availability check.
//!
//! Recomputed on every call; nothing is cached between checks.

use super::backend::InferenceBackend;
use crate::error::InferenceError;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

/// Why the server was reported unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "status", rename_all = "snake_case")]
pub enum HealthErrorReason {
    /// Nothing answered at the endpoint
    ConnectionFailed,
    /// The inventory request ran past its timeout
    Timeout,
    /// The server answered with a non-2xx status
    HttpStatus(u16),
    /// The server answered 2xx with an unexpected body
    InvalidResponse,
}

impl HealthErrorReason {
    /// HTTP status carried by the failure, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            HealthErrorReason::HttpStatus(code) => Some(*code),
            _ => None,
        }
    }
}

/// Availability tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HealthTier {
    /// Server up, every required model installed
    Available,
    /// Server up, some required models missing (sorted)
    Warning { missing: Vec<String> },
    /// Server unusable
    Error { reason: HealthErrorReason },
}

impl fmt::Display for HealthTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthTier::Available => write!(f, "Available"),
            HealthTier::Warning { .. } => write!(f, "Warning"),
            HealthTier::Error { .. } => write!(f, "Error"),
        }
    }
}

/// Result of one health check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    #[serde(flatten)]
    pub tier: HealthTier,
    pub message: String,
}

impl HealthStatus {
    pub fn is_available(&self) -> bool {
        matches!(self.tier, HealthTier::Available)
    }

    pub fn is_error(&self) -> bool {
        matches!(self.tier, HealthTier::Error { .. })
    }

    /// Missing model identifiers (empty unless the tier is Warning).
    pub fn missing_models(&self) -> &[String] {
        match &self.tier {
            HealthTier::Warning { missing } => missing,
            _ => &[],
        }
    }

    /// Status code an HTTP front-end should answer with: 200 when the server
    /// is reachable (even with missing models), 503 otherwise.
    pub fn http_status(&self) -> u16 {
        if self.is_error() {
            503
        } else {
            200
        }
    }
}

/// Query the model inventory and compare it with `required`.
pub async fn check_health(
    backend: &dyn InferenceBackend,
    required: &BTreeSet<String>,
    timeout: Duration,
) -> HealthStatus {
    let installed = match backend.list_models(timeout).await {
        Ok(models) => models.into_iter().collect::<BTreeSet<String>>(),
        Err(e) => {
            tracing::warn!(endpoint = backend.endpoint(), "Health check failed: {e}");
            return error_status(&e);
        }
    };

    // BTreeSet difference iterates in sorted order
    let missing: Vec<String> = required.difference(&installed).cloned().collect();

    if missing.is_empty() {
        tracing::debug!(endpoint = backend.endpoint(), "All required models installed");
        HealthStatus {
            tier: HealthTier::Available,
            message: "Available".to_string(),
        }
    } else {
        let message = format!("Running, but missing models: {}", missing.join(", "));
        tracing::info!(endpoint = backend.endpoint(), "{message}");
        HealthStatus {
            tier: HealthTier::Warning { missing },
            message,
        }
    }
}

fn error_status(err: &InferenceError) -> HealthStatus {
    let reason = match err {
        InferenceError::Connection { .. } => HealthErrorReason::ConnectionFailed,
        InferenceError::Timeout { .. } => HealthErrorReason::Timeout,
        InferenceError::HttpStatus { status, .. } => HealthErrorReason::HttpStatus(*status),
        InferenceError::InvalidResponse(_)
        | InferenceError::EmptyResponse { .. }
        | InferenceError::Request(_) => HealthErrorReason::InvalidResponse,
    };

    let message = match reason {
        HealthErrorReason::ConnectionFailed => "Connection Failed".to_string(),
        other => match other.status_code() {
            Some(code) => format!("Status Error ({code})"),
            None => "Status Error (N/A)".to_string(),
        },
    };

    HealthStatus {
        tier: HealthTier::Error { reason },
        message,
    }
}
