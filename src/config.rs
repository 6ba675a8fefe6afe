//! Configuration management for the thesis relay.
//!
//! Configuration can be set via environment variables:
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `3000`.
//! - `LLM_PROVIDER` - Optional. `openai` (any OpenAI-compatible gateway) or `gemini`. Defaults to `openai`.
//! - `LLM_BASE_URL` - Optional. Provider base URL. Defaults depend on the provider.
//! - `LLM_MODEL` - Optional. Model identifier. Defaults to `gemini-2.5-flash`.
//! - `LLM_API_KEY_ENV` - Optional. Name of the variable holding the API key.
//!   Defaults to `AVALAI_API_KEY` for `openai` and `GEMINI_API_KEY` for `gemini`.
//! - `LLM_TIMEOUT_SECS` - Optional. Upstream request timeout. Defaults to `120`.
//! - `CORS_ORIGINS` - Optional. `;`-separated allowed origins.
//!
//! The API key itself is never stored here. Relay handlers read it through
//! [`Credentials`] on every invocation so a missing key surfaces as a 500
//! instead of preventing startup.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Which wire format the upstream model speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// `POST {base}/chat/completions` with bearer auth.
    OpenAiCompatible,
    /// Native Gemini `generateContent`.
    Gemini,
}

impl ProviderKind {
    pub fn from_id(id: &str) -> Option<Self> {
        match id.trim().to_lowercase().as_str() {
            "openai" | "openai-compatible" | "avalai" => Some(Self::OpenAiCompatible),
            "gemini" | "google" => Some(Self::Gemini),
            _ => None,
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::OpenAiCompatible => "https://api.avalai.ir/v1",
            Self::Gemini => "https://generativelanguage.googleapis.com/v1beta",
        }
    }

    pub fn default_api_key_env(self) -> &'static str {
        match self {
            Self::OpenAiCompatible => "AVALAI_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
        }
    }
}

/// Upstream model configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: ProviderKind,

    /// Base URL without a trailing slash
    pub base_url: String,

    /// Model identifier sent upstream
    pub model: String,

    /// Name of the environment variable holding the API key
    pub api_key_env: String,

    /// Per-request timeout for the single upstream call
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        let provider = ProviderKind::OpenAiCompatible;
        Self {
            provider,
            base_url: provider.default_base_url().to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key_env: provider.default_api_key_env().to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Relay server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Allowed CORS origins for the browser front end
    pub cors_origins: Vec<String>,

    pub llm: LlmConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            cors_origins: default_cors_origins(),
            llm: LlmConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), format!("{}", e)))?;

        let provider = match std::env::var("LLM_PROVIDER") {
            Ok(v) => ProviderKind::from_id(&v).ok_or_else(|| {
                ConfigError::InvalidValue(
                    "LLM_PROVIDER".to_string(),
                    format!("expected openai or gemini, got: {}", v),
                )
            })?,
            Err(_) => ProviderKind::OpenAiCompatible,
        };

        let base_url = std::env::var("LLM_BASE_URL")
            .unwrap_or_else(|_| provider.default_base_url().to_string())
            .trim_end_matches('/')
            .to_string();

        let model =
            std::env::var("LLM_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".to_string());

        let api_key_env = std::env::var("LLM_API_KEY_ENV")
            .unwrap_or_else(|_| provider.default_api_key_env().to_string());

        let timeout_secs: u64 = std::env::var("LLM_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".to_string())
            .parse()
            .map_err(|e| {
                ConfigError::InvalidValue("LLM_TIMEOUT_SECS".to_string(), format!("{}", e))
            })?;

        let cors_origins = std::env::var("CORS_ORIGINS")
            .map(|v| parse_origins(&v))
            .unwrap_or_else(|_| default_cors_origins());

        Ok(Self {
            host,
            port,
            cors_origins,
            llm: LlmConfig {
                provider,
                base_url,
                model,
                api_key_env,
                timeout: Duration::from_secs(timeout_secs),
            },
        })
    }
}

/// Source of the provider API key, consulted once per relay invocation.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Read the named process environment variable.
    Env(String),
    /// Fixed value (tests, embedding).
    Fixed(Option<String>),
}

impl Credentials {
    /// The current API key, if one is configured and non-blank.
    pub fn api_key(&self) -> Option<String> {
        let key = match self {
            Self::Env(var) => std::env::var(var).ok(),
            Self::Fixed(key) => key.clone(),
        };
        key.filter(|k| !k.trim().is_empty())
    }
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://localhost:3000".to_string(),
    ]
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
