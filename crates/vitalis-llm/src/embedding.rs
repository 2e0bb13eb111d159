//! Gemini text embeddings.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use vitalis_core::LlmError;

use crate::client::status_error;
use crate::types::Part;

/// Converts text into a fixed-dimension vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError>;
}

#[derive(Serialize)]
struct EmbedContent {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct EmbedRequest {
    model: String,
    content: EmbedContent,
}

#[derive(Deserialize)]
struct Embedding {
    #[serde(default)]
    values: Vec<f32>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Option<Embedding>,
}

/// Embedding client for Gemini's `embedContent` endpoint.
pub struct GeminiEmbedder {
    client: Client,
    api_base: String,
    model: String,
    api_key: String,
}

impl GeminiEmbedder {
    pub fn new(api_base: &str, model: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl Embedder for GeminiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let request = EmbedRequest {
            model: format!("models/{}", self.model),
            content: EmbedContent { parts: vec![Part::text(text)] },
        };

        let response = self
            .client
            .post(format!("{}/models/{}:embedContent", self.api_base, self.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, body));
        }

        let resp: EmbedResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Decode(e.to_string()))?;

        match resp.embedding {
            Some(e) if !e.values.is_empty() => Ok(e.values),
            _ => Err(LlmError::EmptyResponse),
        }
    }
}
