//! # Thesis Relay
//!
//! Backend and client core for a thesis-writing assistant.
//!
//! This library provides:
//! - An HTTP relay with one endpoint per task (topic suggestion, article
//!   search, literature review, pre-proposal, summary, evaluation,
//!   translation, supervisor chat)
//! - Provider clients for OpenAI-compatible gateways and Gemini
//! - Text extraction from PDF, DOCX and plain-text uploads
//! - The client-side token estimate and submit orchestration
//!
//! ## Flow
//!
//! 1. The client validates the active mode's inputs locally
//! 2. File modes extract and cap the document text
//! 3. One POST reaches the relay, which renders a prompt
//! 4. The relay makes one provider call and checks the JSON shape
//! 5. The client stores the typed result or a user-facing error
//!
//! ## Example
//!
//! ```rust,ignore
//! use thesis_relay::{api, config::Config};
//!
//! let config = Config::from_env()?;
//! api::serve(config).await?;
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod extract;
pub mod limits;
pub mod llm;

pub use config::Config;
