use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A chat message for the LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Trait for LLM providers, each backend implements this.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a chat completion request and return the assistant's response text.
    async fn complete(
        &self,
        messages: Vec<Message>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("API error {status}: {body}")]
    ApiError { status: u16, body: String },
    #[error("failed to parse response: {0}")]
    ParseError(String),
    #[error("provider not configured: {0}")]
    NotConfigured(String),
}

impl LlmError {
    /// Rate limits, server errors, and transport failures are worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::HttpError(e) => e.is_timeout() || e.is_connect(),
            Self::ApiError { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Call `complete` with exponential backoff (1s, 2s, 4s, ...) on transient
/// failures. Non-transient errors fail immediately.
pub async fn complete_with_retry(
    provider: &dyn LlmProvider,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
    max_retries: u32,
) -> Result<String, LlmError> {
    let mut attempt = 0;
    loop {
        match provider
            .complete(messages.clone(), temperature, max_tokens)
            .await
        {
            Ok(response) => return Ok(response),
            Err(e) if e.is_transient() && attempt < max_retries => {
                attempt += 1;
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tracing::warn!(
                    "LLM attempt {} failed ({}), retrying in {:?}",
                    attempt,
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
