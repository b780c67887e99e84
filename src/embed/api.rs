//! `ApiEmbedder`: calls any OpenAI-compatible `/v1/embeddings` endpoint.
//!
//! Works with Ollama, OpenAI, LM Studio, vLLM and other providers that speak
//! the OpenAI embeddings wire format.  All connection details come from
//! [`EmbeddingConfig`]; nothing is hardcoded.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::EmbeddingConfig;
use crate::embed::provider::{EmbedError, Embedder};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

/// Decode a response body into vectors ordered by their `index` field.
fn parse_response(body: &str, expected: usize) -> Result<Vec<Vec<f32>>, EmbedError> {
    let mut parsed: EmbeddingResponse =
        serde_json::from_str(body).map_err(|e| EmbedError::Parse(e.to_string()))?;

    if parsed.data.is_empty() {
        return Err(EmbedError::EmptyResponse);
    }
    if parsed.data.len() != expected {
        return Err(EmbedError::CountMismatch {
            expected,
            got: parsed.data.len(),
        });
    }

    parsed.data.sort_by_key(|entry| entry.index);
    Ok(parsed.data.into_iter().map(|entry| entry.embedding).collect())
}

// ---------------------------------------------------------------------------
// ApiEmbedder
// ---------------------------------------------------------------------------

/// HTTP embedding client configured from [`EmbeddingConfig`].
pub struct ApiEmbedder {
    client: reqwest::Client,
    config: EmbeddingConfig,
}

impl ApiEmbedder {
    /// Build an `ApiEmbedder` from application config.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs`.  A default client is used if the builder fails.
    pub fn from_config(config: &EmbeddingConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    /// Embeddings URL; a blank base URL selects the provider's default host.
    pub fn endpoint(&self) -> String {
        format!("{}/v1/embeddings", self.config.resolved_base_url())
    }
}

#[async_trait]
impl Embedder for ApiEmbedder {
    /// The `Authorization: Bearer …` header is attached only when
    /// `config.api_key` is a non-empty string.
    async fn embed_batch(&self, inputs: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let body = EmbeddingRequest {
            model: &self.config.model,
            input: inputs,
        };

        let mut req = self.client.post(self.endpoint()).json(&body);

        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(EmbedError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        log::debug!("embed: {} vectors from {}", inputs.len(), self.config.model);
        parse_response(&text, inputs.len())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
