//! HTTP relay between the browser front end and the model provider.
//!
//! Each task route validates its body, renders a prompt, makes exactly one
//! provider call and returns either the task's JSON shape or
//! `{ "error": string }`.

pub mod envelope;
pub mod error;
pub mod handlers;
pub mod prompt;
pub mod routes;
pub mod types;

pub use error::RelayError;
pub use prompt::RelayTask;
pub use routes::{build_router, serve, AppState};
