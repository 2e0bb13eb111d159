//! Gemini `generateContent` client.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::{debug, error};
use vitalis_core::LlmError;

use crate::types::{Content, FunctionDeclaration, GenerateRequest, GenerateResponse};

/// A model that turns role-tagged contents plus declared tools into a response.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, LlmError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolDeclarations<'a> {
    function_declarations: &'a [FunctionDeclaration],
}

#[derive(Serialize)]
struct GenerateContentBody<'a> {
    contents: &'a [Content],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolDeclarations<'a>>,
}

/// Client for the Gemini generative language API.
pub struct GeminiClient {
    client: Client,
    api_base: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    /// Creates a new Gemini client.
    pub fn new(api_base: &str, model: &str, api_key: &str) -> Self {
        tracing::info!("GeminiClient: model={}, api_key_len={}", model, api_key.len());
        Self {
            client: Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, LlmError> {
        let start = std::time::Instant::now();

        let tools = match request.functions.is_empty() {
            true => vec![],
            false => vec![ToolDeclarations { function_declarations: &request.functions }],
        };
        let body = GenerateContentBody { contents: &request.contents, tools };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, body));
        }

        let resp: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Decode(e.to_string()))?;

        if let Some(usage) = &resp.usage_metadata {
            debug!(
                model = %self.model,
                input_tokens = usage.prompt_token_count,
                output_tokens = usage.candidates_token_count,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Gemini generateContent completed"
            );
        }

        Ok(resp)
    }
}

/// Maps a non-success provider status to an error, keeping 429 distinguishable.
pub(crate) fn status_error(status: StatusCode, body: String) -> LlmError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return LlmError::RateLimited(body);
    }
    error!("Gemini API error {}: {}", status, body);
    LlmError::Api { status: status.as_u16(), body }
}
