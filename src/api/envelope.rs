//! Provider output → response envelope.
//!
//! The check is deliberately shallow: top-level keys and their JSON kind.
//! Anything deeper is left to the client's lenient decoding.

use serde_json::Value;

use super::error::RelayError;
use super::prompt::RelayTask;
use crate::llm::ProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonKind {
    String,
    Number,
    Array,
    Object,
}

impl JsonKind {
    fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }
}

/// Expected top-level keys of the provider's JSON for a task.
pub fn expected_shape(task: RelayTask) -> &'static [(&'static str, JsonKind)] {
    match task {
        RelayTask::Suggest => &[("keywords", JsonKind::Array), ("topics", JsonKind::Array)],
        RelayTask::Scholar => &[("articles", JsonKind::Array)],
        RelayTask::Literature => &[("items", JsonKind::Array)],
        RelayTask::PreProposal => &[
            ("introduction", JsonKind::String),
            ("specificObjectives", JsonKind::Array),
            ("specificQuestions", JsonKind::Array),
            ("methodology", JsonKind::Object),
        ],
        RelayTask::Summarize => &[("title", JsonKind::String), ("results", JsonKind::String)],
        RelayTask::Evaluate => &[("score", JsonKind::Number), ("points", JsonKind::Array)],
        RelayTask::TranslateTopic | RelayTask::GeneralTranslate | RelayTask::ChatBot => &[],
    }
}

/// Remove a surrounding Markdown code fence (```json ... ```), if any.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening line.
    match body.find('\n') {
        Some(pos) => body[pos + 1..].trim(),
        None => body.trim(),
    }
}

/// Parse the provider text as JSON and check it against the task's shape.
///
/// Returns the JSON value to send back to the browser. For the article
/// search the `{"articles": [...]}` wrapper is removed because the front end
/// expects a bare array.
pub fn json_envelope(task: RelayTask, raw: &str) -> Result<Value, RelayError> {
    let text = strip_code_fence(raw);
    let value: Value = serde_json::from_str(text).map_err(|e| RelayError::UnparsableJson {
        reason: e.to_string(),
        raw: raw.to_string(),
    })?;

    if task == RelayTask::Scholar && value.is_array() {
        return Ok(value);
    }

    let shape_ok = value.is_object()
        && expected_shape(task)
            .iter()
            .all(|(key, kind)| value.get(*key).map(|v| kind.matches(v)).unwrap_or(false));
    if !shape_ok {
        return Err(RelayError::InvalidShape {
            raw: raw.to_string(),
        });
    }

    if task == RelayTask::Scholar {
        return Ok(value.get("articles").cloned().unwrap_or(Value::Array(Vec::new())));
    }
    Ok(value)
}

/// Trimmed plain-text output for the translation and chat tasks.
pub fn text_output(raw: &str) -> Result<String, RelayError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(ProviderError::EmptyContent.into());
    }
    Ok(text.to_string())
}
