//! Client side of the relay: one JSON POST per submit.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Raw relay reply; decoding is the orchestrator's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayResponse {
    pub status: u16,
    pub body: String,
}

impl RelayResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("یک خطای ناشناخته در شبکه رخ داد: {0}")]
    Network(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

#[async_trait]
pub trait RelayTransport: Send + Sync {
    async fn post_json(&self, path: &str, body: Value) -> Result<RelayResponse, TransportError>;
}

/// `reqwest` transport against a running relay.
pub struct HttpRelayTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpRelayTransport {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl RelayTransport for HttpRelayTransport {
    async fn post_json(&self, path: &str, body: Value) -> Result<RelayResponse, TransportError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, "Posting to relay");

        let response = self.http.post(&url).json(&body).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(RelayResponse { status, body })
    }
}

const MAX_INLINE_BODY_CHARS: usize = 500;

/// User-facing message for a non-2xx relay reply.
///
/// Prefers the envelope's `error` string; otherwise a status line, plus the
/// body itself when it is short enough to show.
pub fn relay_error_message(status: u16, body: &str) -> String {
    let base = format!("درخواست با کد وضعیت {} با شکست مواجه شد", status);
    match serde_json::from_str::<Value>(body) {
        Ok(json) => match json.get("error").and_then(Value::as_str) {
            Some(error) if !error.is_empty() => error.to_string(),
            _ => base,
        },
        Err(_) if body.chars().count() < MAX_INLINE_BODY_CHARS => format!("{}: {}", base, body),
        Err(_) => format!("{}. (پاسخ سرور فرمت نامعتبر دارد)", base),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_error_wins() {
        assert_eq!(
            relay_error_message(500, r#"{"error":"خطای پیکربندی سرور: کلید API یافت نشد."}"#),
            "خطای پیکربندی سرور: کلید API یافت نشد."
        );
    }

    #[test]
    fn short_plain_body_is_appended() {
        assert_eq!(
            relay_error_message(502, "Bad Gateway"),
            "درخواست با کد وضعیت 502 با شکست مواجه شد: Bad Gateway"
        );
    }

    #[test]
    fn long_plain_body_is_summarised() {
        let msg = relay_error_message(500, &"x".repeat(600));
        assert_eq!(
            msg,
            "درخواست با کد وضعیت 500 با شکست مواجه شد. (پاسخ سرور فرمت نامعتبر دارد)"
        );
    }

    #[test]
    fn json_without_error_uses_status_line() {
        assert_eq!(
            relay_error_message(404, r#"{"detail":"nope"}"#),
            "درخواست با کد وضعیت 404 با شکست مواجه شد"
        );
    }

    #[test]
    fn success_range() {
        let ok = RelayResponse {
            status: 204,
            body: String::new(),
        };
        assert!(ok.is_success());
        assert!(!RelayResponse {
            status: 400,
            body: String::new()
        }
        .is_success());
    }
}
