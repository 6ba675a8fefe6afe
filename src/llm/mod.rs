//! Model provider clients.
//!
//! Every relay endpoint makes exactly one call through [`LlmClient`]. The
//! trait is the seam that lets router tests run against a fake provider.

mod gemini;
mod openai;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{LlmConfig, ProviderKind};

pub use gemini::GeminiClient;
pub use openai::OpenAiCompatibleClient;

/// Message role in a completion request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A single, non-streaming completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub top_p: Option<f32>,
    /// Ask the provider to constrain output to a JSON object.
    pub json_mode: bool,
}

impl CompletionRequest {
    /// One user turn.
    pub fn prompt(prompt: String, temperature: f32) -> Self {
        Self {
            messages: vec![ChatMessage::user(prompt)],
            temperature,
            top_p: None,
            json_mode: false,
        }
    }

    pub fn json(mut self) -> Self {
        self.json_mode = true;
        self
    }

    pub fn top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }
}

/// Coarse reason an upstream call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// HTTP 429 / quota exhausted
    RateLimit,
    /// HTTP 503 / 529 / provider reports unavailable
    Overloaded,
    /// Connection or read timeout
    Timeout,
    /// Any other non-2xx status from the provider
    Upstream,
    /// Network error, unreadable or empty body
    Transport,
}

impl std::fmt::Display for FailureClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimit => write!(f, "rate_limit"),
            Self::Overloaded => write!(f, "overloaded"),
            Self::Timeout => write!(f, "timeout"),
            Self::Upstream => write!(f, "upstream"),
            Self::Transport => write!(f, "transport"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider returned HTTP {status}: {message}")]
    Status {
        status: u16,
        message: String,
        /// Provider-specific status string (e.g. Gemini's `RESOURCE_EXHAUSTED`)
        kind: Option<String>,
    },

    #[error("provider request timed out")]
    Timeout,

    #[error("provider request failed: {0}")]
    Transport(String),

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("provider returned no text content")]
    EmptyContent,
}

impl ProviderError {
    pub fn classify(&self) -> FailureClass {
        match self {
            Self::Status { status, kind, .. } => {
                let kind = kind.as_deref().unwrap_or("");
                if *status == 429 || kind.eq_ignore_ascii_case("RESOURCE_EXHAUSTED") {
                    FailureClass::RateLimit
                } else if *status == 503
                    || *status == 529
                    || kind.eq_ignore_ascii_case("UNAVAILABLE")
                    || kind.eq_ignore_ascii_case("overloaded_error")
                {
                    FailureClass::Overloaded
                } else {
                    FailureClass::Upstream
                }
            }
            Self::Timeout => FailureClass::Timeout,
            Self::Transport(_) | Self::InvalidResponse(_) | Self::EmptyContent => {
                FailureClass::Transport
            }
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_decode() {
            Self::InvalidResponse(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

/// A chat-completion capable model provider.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Run one completion and return the raw text of the first candidate.
    async fn complete(
        &self,
        api_key: &str,
        request: CompletionRequest,
    ) -> Result<String, ProviderError>;
}

/// Build the configured provider client.
pub fn build_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, reqwest::Error> {
    let http = reqwest::Client::builder().timeout(config.timeout).build()?;
    let client: Arc<dyn LlmClient> = match config.provider {
        ProviderKind::OpenAiCompatible => Arc::new(OpenAiCompatibleClient::new(
            http,
            config.base_url.clone(),
            config.model.clone(),
        )),
        ProviderKind::Gemini => Arc::new(GeminiClient::new(
            http,
            config.base_url.clone(),
            config.model.clone(),
        )),
    };
    Ok(client)
}

/// Upstream error bodies from both OpenAI-compatible gateways and Gemini
/// share the `{"error": {"message": ..}}` outline.
#[derive(Debug, Deserialize)]
struct UpstreamErrorBody {
    error: UpstreamError,
}

#[derive(Debug, Deserialize)]
struct UpstreamError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default, rename = "type")]
    error_type: Option<String>,
}

/// Turn a non-2xx upstream response body into a [`ProviderError`].
pub(crate) fn status_error(status: u16, body: &str) -> ProviderError {
    match serde_json::from_str::<UpstreamErrorBody>(body) {
        Ok(parsed) => ProviderError::Status {
            status,
            message: parsed
                .error
                .message
                .unwrap_or_else(|| format!("HTTP {}", status)),
            kind: parsed.error.status.or(parsed.error.error_type),
        },
        Err(_) => ProviderError::Status {
            status,
            message: truncate_for_log(body, 300),
            kind: None,
        },
    }
}

fn truncate_for_log(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars).collect();
        format!("{}... [truncated]", head)
    }
}
