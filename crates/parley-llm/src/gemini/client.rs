// Gemini-specific client implementation (HTTP direct, no SDK)

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;

use crate::config::GeminiConfig;
use crate::error::{LlmError, Result};
use crate::gemini::types::{
    ApiErrorResponse, Content, GenerateContentChunk, GenerateContentRequest, GenerationConfig,
};
use crate::streaming::{parse_sse_stream, TextStream};
use crate::traits::{ChatClient, GenerateRequest, TurnRole};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl GeminiClient {
    /// Create a new client from configuration.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| LlmError::Config("invalid API key format".to_string()))?;
        key.set_sensitive(true);
        headers.insert("x-goog-api-key", key);

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(LlmError::Http)?;

        Ok(Self {
            http_client,
            base_url: config
                .base_url
                .unwrap_or_else(|| GEMINI_API_BASE.to_string()),
        })
    }

    /// Build the request payload.
    fn build_payload(&self, request: &GenerateRequest) -> GenerateContentRequest {
        let contents = request
            .turns
            .iter()
            .map(|turn| {
                let role = match turn.role {
                    TurnRole::User => "user",
                    TurnRole::Model => "model",
                };
                Content::new(role, turn.text.clone())
            })
            .collect();

        let generation_config = if request.options == Default::default() {
            None
        } else {
            Some(GenerationConfig {
                temperature: request.options.temperature,
                max_output_tokens: request.options.max_output_tokens,
            })
        };

        GenerateContentRequest {
            contents,
            system_instruction: request
                .system_instruction
                .as_deref()
                .map(Content::bare),
            generation_config,
        }
    }

    /// Map a non-2xx response to a typed error, classifying access-control
    /// rejections separately from everything else.
    fn error_from_response(status: StatusCode, body: String) -> LlmError {
        let parsed: Option<ApiErrorResponse> = serde_json::from_str(&body).ok();
        let (message, api_status) = match parsed {
            Some(e) => (e.error.message, e.error.status),
            None => (body, None),
        };

        let is_permission = status == StatusCode::UNAUTHORIZED
            || status == StatusCode::FORBIDDEN
            || api_status.as_deref() == Some("PERMISSION_DENIED");

        if is_permission {
            LlmError::PermissionDenied(message)
        } else {
            LlmError::Api {
                status: status.as_u16(),
                message,
            }
        }
    }
}

#[async_trait]
impl ChatClient for GeminiClient {
    async fn generate(&self, request: GenerateRequest) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, request.model
        );
        let payload = self.build_payload(&request);

        tracing::debug!(model = %request.model, turns = request.turns.len(), "generate");

        let response = self.http_client.post(&url).json(&payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::error_from_response(status, body));
        }

        let chunk: GenerateContentChunk = response.json().await?;
        Ok(chunk.text().unwrap_or_default())
    }

    async fn generate_stream(&self, request: GenerateRequest) -> Result<TextStream> {
        let url = format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.base_url, request.model
        );
        let payload = self.build_payload(&request);

        tracing::debug!(model = %request.model, turns = request.turns.len(), "generate_stream");

        let response = self.http_client.post(&url).json(&payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::error_from_response(status, body));
        }

        Ok(parse_sse_stream(response))
    }
}
