//! Ollama embedding provider
//!
//! Calls `POST {endpoint}/api/embed` with the whole batch as `input`.
//! Transient failures (transport errors, timeouts, 429 and 5xx responses)
//! are retried with exponential backoff; every response is checked for
//! vector count and dimension.

use async_trait::async_trait;
use notegraph_config::{Device, EmbeddingConfig};
use notegraph_core::{EmbeddingError, EmbeddingProvider, EmbeddingResult};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct OllamaEmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    num_gpu: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaEmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

pub struct OllamaProvider {
    client: Client,
    endpoint: String,
    model: String,
    dimensions: usize,
    device: Device,
    timeout_secs: u64,
    max_retries: u32,
    retry_base: Duration,
}

impl std::fmt::Debug for OllamaProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OllamaProvider")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("dimensions", &self.dimensions)
            .finish()
    }
}

impl OllamaProvider {
    pub fn new(config: &EmbeddingConfig) -> EmbeddingResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EmbeddingError::Provider {
                provider: "Ollama".to_string(),
                message: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            dimensions: config.dimension,
            device: config.device,
            timeout_secs: config.timeout_secs,
            max_retries: config.max_retries,
            retry_base: Duration::from_millis(500),
        })
    }

    /// Override the first backoff delay
    pub fn with_retry_base(mut self, delay: Duration) -> Self {
        self.retry_base = delay;
        self
    }

    async fn encode_once(&self, batch: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
        let url = format!("{}/api/embed", self.endpoint);
        let request = OllamaEmbedRequest {
            model: &self.model,
            input: batch,
            options: (self.device == Device::Cpu).then_some(OllamaOptions { num_gpu: 0 }),
        };

        tracing::debug!("Sending batch of {} texts to {}", batch.len(), url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EmbeddingError::Timeout {
                        timeout_secs: self.timeout_secs,
                    }
                } else {
                    EmbeddingError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = format!("HTTP {status}: {body}");
            return Err(
                if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
                    EmbeddingError::Http(message)
                } else {
                    EmbeddingError::Provider {
                        provider: "Ollama".to_string(),
                        message,
                    }
                },
            );
        }

        let parsed: OllamaEmbedResponse = response.json().await.map_err(|e| {
            EmbeddingError::InvalidResponse(format!("Failed to parse Ollama response: {e}"))
        })?;

        if parsed.embeddings.len() != batch.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: batch.len(),
                actual: parsed.embeddings.len(),
            });
        }
        if let Some(bad) = parsed.embeddings.iter().find(|v| v.len() != self.dimensions) {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimensions,
                actual: bad.len(),
            });
        }
        Ok(parsed.embeddings)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    async fn encode(&self, batch: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let mut attempt = 0;
        loop {
            match self.encode_once(batch).await {
                Ok(vectors) => return Ok(vectors),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let delay = self.retry_base * 2u32.pow(attempt);
                    tracing::warn!(
                        "Embedding request failed (attempt {}/{}), retrying in {:?}: {}",
                        attempt + 1,
                        self.max_retries + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
