//! Remote text generation seam.
//!
//! The selector never owns a client: callers construct a [`TextGenerator`]
//! and hand it in per request.

use async_trait::async_trait;
use thiserror::Error;

/// Why a remote generation attempt failed.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Model returned an empty response")]
    EmptyResponse,

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

/// A service that turns an instruction into Markdown text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Identity of the model answering the prompt.
    fn model(&self) -> &str;

    /// Sends one prompt and returns the response text as-is.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Stand-in for a client that could not be constructed.
///
/// Every call fails with [`GenerationError::Configuration`], so the selector
/// degrades to local assembly like any other remote failure.
pub struct Unavailable {
    model: String,
    reason: String,
}

impl Unavailable {
    pub fn new(model: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl TextGenerator for Unavailable {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::Configuration(self.reason.clone()))
    }
}
