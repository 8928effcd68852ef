//! Google Generative Language API client.
//!
//! Issues one non-streaming `generateContent` call per prompt. No retries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::remote::{GenerationError, TextGenerator};

/// Google Generative Language API base URL.
pub const GOOGLE_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Default model for README generation.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Configuration for the Gemini client.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Model to use (e.g., "gemini-2.0-flash").
    pub model: String,
    /// Base URL the model path is appended to.
    pub endpoint: String,
    /// Upper bound for the whole request.
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            endpoint: GOOGLE_API_BASE.to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    code: Option<u16>,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: GoogleError,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Gemini `generateContent` client.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Creates a client whose requests are bounded by `config.timeout`.
    pub fn new(api_key: impl Into<String>, config: GeminiConfig) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GenerationError::Configuration(e.to_string()))?;
        Ok(Self::with_client(client, api_key, config))
    }

    /// Creates a client around an existing HTTP client.
    pub fn with_client(
        client: reqwest::Client,
        api_key: impl Into<String>,
        config: GeminiConfig,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            config,
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }

    fn build_request_body(prompt: &str) -> Value {
        json!({
            "contents": [
                { "role": "user", "parts": [{ "text": prompt }] }
            ]
        })
    }

    fn headers(&self) -> Result<HeaderMap, GenerationError> {
        if self.api_key.trim().is_empty() {
            return Err(GenerationError::Configuration("Missing API key".to_string()));
        }
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            API_KEY_HEADER,
            HeaderValue::from_str(&self.api_key)
                .map_err(|_| GenerationError::Configuration("Invalid API key".to_string()))?,
        );
        Ok(headers)
    }
}

fn map_transport_error(e: reqwest::Error) -> GenerationError {
    if e.is_timeout() {
        GenerationError::Timeout
    } else {
        GenerationError::Network(e.to_string())
    }
}

/// Maps a non-success HTTP status and body to an error.
fn error_from_status(status: StatusCode, body: &str) -> GenerationError {
    let (code, message) = match serde_json::from_str::<ErrorResponse>(body) {
        Ok(parsed) => (
            parsed.error.code.unwrap_or(status.as_u16()),
            parsed.error.message,
        ),
        Err(_) => (status.as_u16(), body.to_string()),
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GenerationError::Unauthorized(message),
        StatusCode::TOO_MANY_REQUESTS => GenerationError::QuotaExceeded(message),
        _ => GenerationError::Api {
            status: code,
            message,
        },
    }
}

/// Pulls the text of the first candidate out of a response body.
fn extract_text(body: &str) -> Result<String, GenerationError> {
    let parsed: GenerateResponse =
        serde_json::from_str(body).map_err(|e| GenerationError::Malformed(e.to_string()))?;

    if let Some(reason) = parsed.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(GenerationError::Api {
            status: 400,
            message: format!("Prompt blocked: {reason}"),
        });
    }

    let candidate = parsed
        .candidates
        .into_iter()
        .next()
        .ok_or(GenerationError::EmptyResponse)?;

    if candidate.finish_reason.as_deref() == Some("SAFETY") {
        return Err(GenerationError::Api {
            status: 400,
            message: "Response blocked due to safety concerns".to_string(),
        });
    }

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    Ok(text)
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn model(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let url = self.url();
        debug!(model = %self.config.model, prompt_len = prompt.len(), "gemini_request");

        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(&Self::build_request_body(prompt))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_transport_error)?;

        if !status.is_success() {
            let err = error_from_status(status, &body);
            warn!(status = status.as_u16(), error = %err, "gemini_request_failed");
            return Err(err);
        }

        let text = extract_text(&body)?;
        debug!(model = %self.config.model, response_len = text.len(), "gemini_response");
        Ok(text)
    }
}
