//! Ollama backend over its HTTP API.
//!
//! Talks to an Ollama instance via `/api/tags` and `/api/generate`.
//! No authentication; every call is a single attempt bounded by its timeout.

use super::backend::{GenerationRequest, GenerationResult, InferenceBackend};
use crate::error::InferenceError;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::{Duration, Instant};

/// Ollama HTTP client bound to one server endpoint.
pub struct OllamaClient {
    endpoint: String,
    client: reqwest::Client,
}

impl OllamaClient {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Map a reqwest failure onto the typed taxonomy.
    ///
    /// Timeouts are checked first: a connect that runs out of time is a
    /// timeout, a connect that is refused is a connection failure.
    fn translate(&self, err: reqwest::Error, timeout: Duration) -> InferenceError {
        if err.is_timeout() {
            InferenceError::Timeout {
                endpoint: self.endpoint.clone(),
                timeout_ms: timeout.as_millis() as u64,
            }
        } else if err.is_connect() {
            InferenceError::Connection {
                endpoint: self.endpoint.clone(),
                message: err.to_string(),
            }
        } else {
            InferenceError::Request(err.to_string())
        }
    }

    /// Read the whole body, rejecting non-2xx statuses.
    async fn read_body(
        &self,
        resp: reqwest::Response,
        timeout: Duration,
    ) -> Result<(u16, Vec<u8>), InferenceError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(InferenceError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }
        let body = resp.bytes().await.map_err(|e| self.translate(e, timeout))?;
        Ok((status.as_u16(), body.to_vec()))
    }
}

/// `/api/tags` response.
#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Deserialize)]
struct TagEntry {
    name: String,
}

/// `/api/generate` response (non-streaming).
#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
}

#[async_trait]
impl InferenceBackend for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn list_models(&self, timeout: Duration) -> Result<Vec<String>, InferenceError> {
        let url = format!("{}/api/tags", self.endpoint);
        tracing::debug!(%url, "Querying model inventory");

        let resp = self
            .client
            .get(&url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| self.translate(e, timeout))?;

        let (_, body) = self.read_body(resp, timeout).await?;
        let tags: TagsResponse = serde_json::from_slice(&body)
            .map_err(|e| InferenceError::InvalidResponse(format!("/api/tags: {e}")))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
        timeout: Duration,
    ) -> Result<GenerationResult, InferenceError> {
        let url = format!("{}/api/generate", self.endpoint);
        let start = Instant::now();
        tracing::debug!(
            model = %request.model,
            with_image = request.has_image(),
            prompt_chars = request.prompt.len(),
            "Sending generate request"
        );

        let resp = self
            .client
            .post(&url)
            .json(request)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| self.translate(e, timeout))?;

        let (status_code, body) = self.read_body(resp, timeout).await?;
        let parsed: GenerateResponse = serde_json::from_slice(&body)
            .map_err(|e| InferenceError::InvalidResponse(format!("/api/generate: {e}")))?;

        let text = parsed.response.ok_or_else(|| InferenceError::EmptyResponse {
            model: request.model.clone(),
        })?;

        tracing::debug!(
            model = %request.model,
            latency_ms = start.elapsed().as_millis() as u64,
            chars = text.len(),
            "Generate request finished"
        );

        Ok(GenerationResult {
            text,
            success: true,
            status_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        let client = OllamaClient::new("http://localhost:11434/");
        assert_eq!(client.endpoint(), "http://localhost:11434");
        assert_eq!(client.name(), "ollama");
    }

    #[tokio::test]
    async fn test_list_models_parses_inventory() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/tags")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "models": [
                        {"name": "llava:latest", "size": 4_700_000_000u64},
                        {"name": "qwen2:7b", "digest": "abc"}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = OllamaClient::new(&server.url());
        let models = client.list_models(TIMEOUT).await.unwrap();
        assert_eq!(models, vec!["llava:latest", "qwen2:7b"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_models_tolerates_missing_models_key() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/tags")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let client = OllamaClient::new(&server.url());
        assert!(client.list_models(TIMEOUT).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generate_sends_image_and_returns_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/generate")
            .match_body(Matcher::Json(json!({
                "model": "llava:latest",
                "prompt": "Describe",
                "images": ["aGVsbG8="],
                "stream": false
            })))
            .with_status(200)
            .with_body(json!({"response": "A cat sits on a mat.", "done": true}).to_string())
            .create_async()
            .await;

        let client = OllamaClient::new(&server.url());
        let request =
            GenerationRequest::with_image("llava:latest", "Describe".to_string(), "aGVsbG8=");
        let result = client.generate(&request, TIMEOUT).await.unwrap();

        assert_eq!(result.text, "A cat sits on a mat.");
        assert!(result.success);
        assert_eq!(result.status_code, 200);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_generate_text_only_body_has_no_images() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/generate")
            .match_body(Matcher::Json(json!({
                "model": "qwen2:7b",
                "prompt": "Translate",
                "stream": false
            })))
            .with_status(200)
            .with_body(r#"{"response":"Bonjour"}"#)
            .create_async()
            .await;

        let client = OllamaClient::new(&server.url());
        let request = GenerationRequest::text("qwen2:7b", "Translate".to_string());
        let result = client.generate(&request, TIMEOUT).await.unwrap();
        assert_eq!(result.text, "Bonjour");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_generate_http_error_carries_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/generate")
            .with_status(500)
            .with_body("model crashed")
            .create_async()
            .await;

        let client = OllamaClient::new(&server.url());
        let request = GenerationRequest::text("qwen2:7b", "x".to_string());
        let err = client.generate(&request, TIMEOUT).await.unwrap_err();
        match err {
            InferenceError::HttpStatus { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "model crashed");
            }
            other => panic!("expected HttpStatus, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_missing_response_is_empty_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/generate")
            .with_status(200)
            .with_body(r#"{"done": true}"#)
            .create_async()
            .await;

        let client = OllamaClient::new(&server.url());
        let request = GenerationRequest::text("qwen2:7b", "x".to_string());
        let err = client.generate(&request, TIMEOUT).await.unwrap_err();
        assert!(matches!(err, InferenceError::EmptyResponse { ref model } if model == "qwen2:7b"));
    }

    #[tokio::test]
    async fn test_generate_empty_string_is_passed_through() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/generate")
            .with_status(200)
            .with_body(r#"{"response": ""}"#)
            .create_async()
            .await;

        let client = OllamaClient::new(&server.url());
        let request = GenerationRequest::text("qwen2:7b", "x".to_string());
        let result = client.generate(&request, TIMEOUT).await.unwrap();
        assert_eq!(result.text, "");
    }

    #[tokio::test]
    async fn test_generate_malformed_body_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/generate")
            .with_status(200)
            .with_body("<html>proxy error</html>")
            .create_async()
            .await;

        let client = OllamaClient::new(&server.url());
        let request = GenerationRequest::text("qwen2:7b", "x".to_string());
        let err = client.generate(&request, TIMEOUT).await.unwrap_err();
        assert!(matches!(err, InferenceError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_unresponsive_server_is_timeout() {
        // Accepts connections and never writes a byte back
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let client = OllamaClient::new(&format!("http://{addr}"));
        let request = GenerationRequest::text("qwen2:7b", "x".to_string());
        let err = client
            .generate(&request, Duration::from_millis(300))
            .await
            .unwrap_err();

        match &err {
            InferenceError::Timeout {
                endpoint,
                timeout_ms,
            } => {
                assert_eq!(endpoint, &format!("http://{addr}"));
                assert_eq!(*timeout_ms, 300);
            }
            other => panic!("expected Timeout, got {other:?}"),
        }
        assert!(err.is_timeout());
        server.abort();
    }

    #[tokio::test]
    async fn test_unreachable_server_is_connection_error() {
        // Port 1 is reserved (tcpmux) and refused on any sane test host
        let client = OllamaClient::new("http://127.0.0.1:1");
        let err = client.list_models(TIMEOUT).await.unwrap_err();
        assert!(err.is_connection(), "expected Connection, got {err:?}");
    }
}
