//! Google Gemini native provider implementation.
//!
//! Uses the Generative Language API (`models/{model}:generateContent`)
//! directly rather than an OpenAI-compatible shim.
//!
//! Features:
//! - `x-goog-api-key` header authentication (the key never appears in URLs or logs)
//! - System prompt as the top-level `systemInstruction` field
//! - `assistant` turns sent with Gemini's `model` role
//! - Structured error mapping from `{ "error": { code, message, status } }` bodies

use async_trait::async_trait;
use cardchat_core::error::ProviderError;
use cardchat_core::message::{Message, Role};
use cardchat_core::provider::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const API_VERSION: &str = "v1beta";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Google Gemini provider.
pub struct GoogleProvider {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl GoogleProvider {
    /// Create a new Gemini provider with the default request timeout.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderError> {
        Self::with_timeout(api_key, DEFAULT_TIMEOUT_SECS)
    }

    /// Create a new Gemini provider with a custom request timeout.
    pub fn with_timeout(api_key: impl Into<String>, timeout_secs: u64) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {e}")))?;

        Ok(Self {
            name: "google".into(),
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            client,
        })
    }

    /// Create with a custom base URL (e.g., for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn generate_url(&self, model: &str) -> String {
        let model = model.strip_prefix("models/").unwrap_or(model);
        format!("{}/{API_VERSION}/models/{model}:generateContent", self.base_url)
    }

    /// Build the `generateContent` body. System messages are merged into
    /// `systemInstruction`; everything else keeps its order in `contents`.
    fn build_request_body(request: &ProviderRequest) -> GenerateContentRequest {
        let mut system_parts: Vec<&str> = Vec::new();
        let mut contents = Vec::new();

        for msg in &request.messages {
            match msg.role() {
                Role::System => system_parts.push(msg.content()),
                Role::User | Role::Assistant => contents.push(Content {
                    role: Some(api_role(msg.role()).into()),
                    parts: vec![Part {
                        text: msg.content().to_string(),
                    }],
                }),
            }
        }

        let system_instruction = if system_parts.is_empty() {
            None
        } else {
            Some(Content {
                role: None,
                parts: vec![Part {
                    text: system_parts.join("\n\n"),
                }],
            })
        };

        GenerateContentRequest {
            system_instruction,
            contents,
            generation_config: GenerationConfig {
                max_output_tokens: request.max_tokens,
                temperature: Some(request.temperature),
            },
        }
    }

    /// Turn a successful `generateContent` body into a provider response.
    fn parse_response(
        response: GenerateContentResponse,
        requested_model: &str,
    ) -> Result<ProviderResponse, ProviderError> {
        let Some(candidate) = response.candidates.into_iter().next() else {
            let reason = response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "unknown".into());
            return Err(ProviderError::InvalidResponse(format!(
                "No candidates in response (block reason: {reason})"
            )));
        };

        let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
        if parts.is_empty() {
            let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".into());
            return Err(ProviderError::InvalidResponse(format!(
                "Candidate has no content (finish reason: {reason})"
            )));
        }

        let text: String = parts.into_iter().map(|p| p.text).collect();

        let usage = response.usage_metadata.map(|u| Usage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        });

        Ok(ProviderResponse {
            message: Message::assistant(text),
            usage,
            model: response
                .model_version
                .unwrap_or_else(|| requested_model.to_string()),
        })
    }
}

fn api_role(role: Role) -> &'static str {
    match role {
        Role::Assistant => "model",
        _ => "user",
    }
}

/// Map a non-success HTTP status and body to a provider error.
fn error_from_status(status: u16, body: &str) -> ProviderError {
    let detail = serde_json::from_str::<ErrorEnvelope>(body).ok().map(|e| e.error);
    let message = detail
        .as_ref()
        .and_then(|d| d.message.clone())
        .unwrap_or_else(|| body.trim().to_string());
    let api_status = detail.and_then(|d| d.status).unwrap_or_default();

    if status == 429 || api_status == "RESOURCE_EXHAUSTED" {
        return ProviderError::RateLimited(message);
    }

    if status == 401
        || status == 403
        || message.contains("API key not valid")
        || body.contains("API_KEY_INVALID")
    {
        return ProviderError::AuthenticationFailed(message);
    }

    if status == 404 {
        return ProviderError::ModelNotFound(message);
    }

    ProviderError::ApiError {
        status_code: status,
        message,
    }
}

fn transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(e.to_string())
    } else {
        ProviderError::Network(e.to_string())
    }
}

#[async_trait]
impl cardchat_core::Provider for GoogleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let url = self.generate_url(&request.model);
        let body = Self::build_request_body(&request);

        debug!(
            provider = %self.name,
            model = %request.model,
            turns = body.contents.len(),
            "Sending generateContent request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();

        if !response.status().is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Provider returned error");
            return Err(error_from_status(status, &error_body));
        }

        let api_response: GenerateContentResponse =
            response.json().await.map_err(|e| {
                ProviderError::InvalidResponse(format!("Failed to parse response: {e}"))
            })?;

        Self::parse_response(api_response, &request.model)
    }

    async fn list_models(&self) -> std::result::Result<Vec<String>, ProviderError> {
        let url = format!("{}/{API_VERSION}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(error_from_status(status, &error_body));
        }

        let body: ModelList = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        Ok(body
            .models
            .into_iter()
            .map(|m| m.name.trim_start_matches("models/").to_string())
            .collect())
    }

    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        match self.list_models().await {
            Ok(_) => Ok(true),
            Err(ProviderError::Network(_)) | Err(ProviderError::Timeout(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

// --- Gemini API types (internal) ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    model_version: Option<String>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[derive(Debug, Deserialize)]
struct ModelInfo {
    name: String,
}
