//! Relay error type and its mapping onto the `{ "error": string }` envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use super::prompt::PromptError;
use super::types::ErrorBody;
use crate::llm::{FailureClass, ProviderError};

pub const MISSING_CREDENTIALS_MESSAGE: &str = "خطای پیکربندی سرور: کلید API یافت نشد.";
pub const RATE_LIMITED_MESSAGE: &str =
    "سرویس هوش مصنوعی در حال حاضر با محدودیت تعداد درخواست مواجه است. لطفا چند دقیقه دیگر دوباره تلاش کنید.";
pub const OVERLOADED_MESSAGE: &str =
    "سرویس هوش مصنوعی در حال حاضر پربار است یا در دسترس نیست. لطفا کمی بعد دوباره تلاش کنید.";
pub const TIMEOUT_MESSAGE: &str =
    "پاسخ سرویس هوش مصنوعی بیش از حد طول کشید. لطفا دوباره تلاش کنید.";
pub const EMPTY_CONTENT_MESSAGE: &str =
    "پاسخ دریافتی از API فاقد محتوای متنی است یا به دلیل خط‌مشی‌های ایمنی مسدود شده است.";

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("{}", MISSING_CREDENTIALS_MESSAGE)]
    MissingCredentials,

    /// Missing or invalid request field; the message is shown to the user.
    #[error("{0}")]
    BadRequest(String),

    #[error("خطا در پردازش: {0}")]
    Prompt(#[from] PromptError),

    #[error("{0}")]
    Provider(#[from] ProviderError),

    #[error("پاسخ API قابل تجزیه به JSON نیست ({reason}). پاسخ دریافت شده: {raw}")]
    UnparsableJson { reason: String, raw: String },

    #[error("ساختار JSON دریافت شده از API نامعتبر است. پاسخ دریافت شده: {raw}")]
    InvalidShape { raw: String },
}

impl RelayError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::MissingCredentials
            | Self::Prompt(_)
            | Self::UnparsableJson { .. }
            | Self::InvalidShape { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Provider(e) => match e.classify() {
                FailureClass::RateLimit => StatusCode::TOO_MANY_REQUESTS,
                FailureClass::Overloaded => StatusCode::SERVICE_UNAVAILABLE,
                FailureClass::Timeout => StatusCode::GATEWAY_TIMEOUT,
                FailureClass::Upstream => match e {
                    ProviderError::Status { status, .. } => StatusCode::from_u16(*status)
                        .ok()
                        .filter(|s| s.is_client_error() || s.is_server_error())
                        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                },
                FailureClass::Transport => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// How the provider call failed, for errors that came from one.
    pub fn failure_class(&self) -> Option<FailureClass> {
        match self {
            Self::Provider(e) => Some(e.classify()),
            _ => None,
        }
    }

    /// The user-facing message placed in the envelope.
    pub fn message(&self) -> String {
        match self {
            Self::Provider(e) => match e.classify() {
                FailureClass::RateLimit => RATE_LIMITED_MESSAGE.to_string(),
                FailureClass::Overloaded => OVERLOADED_MESSAGE.to_string(),
                FailureClass::Timeout => TIMEOUT_MESSAGE.to_string(),
                FailureClass::Upstream => match e {
                    ProviderError::Status { message, .. } => {
                        format!("فراخوانی API با شکست مواجه شد: {}", message)
                    }
                    other => format!("فراخوانی API با شکست مواجه شد: {}", other),
                },
                FailureClass::Transport => match e {
                    ProviderError::EmptyContent => EMPTY_CONTENT_MESSAGE.to_string(),
                    other => format!("خطا در پردازش: {}", other),
                },
            },
            other => other.to_string(),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let Some(class) = self.failure_class() {
            tracing::error!(
                status = %status,
                class = %class,
                error = %self,
                "Provider call failed"
            );
        } else if status.is_server_error() {
            tracing::error!(status = %status, error = %self, "Relay request failed");
        } else {
            tracing::warn!(status = %status, error = %self, "Relay request rejected");
        }
        (status, Json(ErrorBody { error: self.message() })).into_response()
    }
}
