//! Inference server client.
//!
//! Provides the backend abstraction the pipeline talks to, the Ollama HTTP
//! implementation, and the model-inventory health check.

pub(crate) mod backend;
pub(crate) mod health;
pub(crate) mod ollama;

pub use backend::{GenerationRequest, GenerationResult, InferenceBackend};
pub use health::{check_health, HealthErrorReason, HealthStatus, HealthTier};
pub use ollama::OllamaClient;
