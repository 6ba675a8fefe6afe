//! Submit flow for the active mode.
//!
//! One orchestrator owns the state of the current mode. `submit` borrows it
//! mutably for the whole round trip, so there is never more than one request
//! in flight.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use thiserror::Error;

use super::estimator::{self, TokenEstimate};
use super::state::{ModeState, TaskMode, TopicVariant};
use super::transport::{relay_error_message, RelayResponse, RelayTransport, TransportError};
use super::validate::{validate, validate_file, ValidationError};
use crate::api::types::{
    ChatResponse, ChatRole, ChatTurn, GeneralTranslateRequest, PreProposalRequest, ProposalContent,
    SummarizeRequest, ThesisSuggestionRequest, TranslateRequest, TranslationResponse,
};
use crate::extract::{extract_capped, DocumentExtractor, ExtractError, UploadedFile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Validating,
    Submitting,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Non-2xx from the relay; the message is already user-facing.
    #[error("{message}")]
    Relay { status: u16, message: String },

    #[error("پاسخ سرور قابل خواندن نیست: {0}")]
    Decode(String),
}

pub struct TaskOrchestrator {
    transport: Arc<dyn RelayTransport>,
    extractor: Arc<dyn DocumentExtractor>,
    state: ModeState,
    error: Option<String>,
    phase: Phase,
}

impl TaskOrchestrator {
    pub fn new(transport: Arc<dyn RelayTransport>, extractor: Arc<dyn DocumentExtractor>) -> Self {
        Self {
            transport,
            extractor,
            state: ModeState::Home,
            error: None,
            phase: Phase::Idle,
        }
    }

    pub fn mode(&self) -> TaskMode {
        self.state.mode()
    }

    pub fn state(&self) -> &ModeState {
        &self.state
    }

    /// Inputs are edited in place through this.
    pub fn state_mut(&mut self) -> &mut ModeState {
        &mut self.state
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn estimate(&self) -> TokenEstimate {
        estimator::estimate(&self.state)
    }

    /// Enter `mode` with fresh inputs; everything from the old mode is dropped.
    pub fn switch_mode(&mut self, mode: TaskMode) {
        tracing::debug!(from = ?self.state.mode(), to = ?mode, "Switching mode");
        self.state = ModeState::fresh(mode);
        self.error = None;
        self.phase = Phase::Idle;
    }

    /// Store an attachment for the current mode after checking type and size.
    pub fn attach_file(&mut self, file: UploadedFile) -> Result<(), ValidationError> {
        let checked = validate_file(&file);
        let Some(slot) = self.state.file_slot() else {
            let e = ValidationError::FileNotAccepted;
            self.error = Some(e.to_string());
            return Err(e);
        };
        match checked {
            Ok(()) => {
                tracing::debug!(name = %file.name, size = file.size(), "File attached");
                *slot = Some(file);
                self.error = None;
                Ok(())
            }
            Err(e) => {
                *slot = None;
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn clear_file(&mut self) {
        if let Some(slot) = self.state.file_slot() {
            *slot = None;
        }
    }

    /// Validate, call the relay once and store the result or the error.
    pub async fn submit(&mut self) -> Result<(), ClientError> {
        self.error = None;
        self.state.clear_result();

        let outcome = self.run_submit().await;
        self.phase = Phase::Idle;

        if let Err(e) = &outcome {
            tracing::warn!(mode = ?self.state.mode(), error = %e, "Submit failed");
            self.error = Some(e.to_string());
        }
        outcome
    }

    async fn run_submit(&mut self) -> Result<(), ClientError> {
        self.phase = Phase::Validating;
        validate(&self.state)?;

        let document = match self.state.file() {
            Some(file) => Some(extract_capped(self.extractor.as_ref(), file)?),
            None => None,
        };

        let mode = self.state.mode();
        let Some(path) = mode.endpoint() else {
            return Err(ValidationError::NothingToSubmit.into());
        };

        let pushed = self.push_user_turn();
        let outcome = self.exchange(mode, path, document).await;
        if outcome.is_err() && pushed {
            // The draft still holds the text, so a resend pushes it again.
            self.withdraw_user_turn();
        }
        outcome
    }

    fn push_user_turn(&mut self) -> bool {
        let ModeState::Chat(chat) = &mut self.state else {
            return false;
        };
        chat.history.push(ChatTurn {
            role: ChatRole::User,
            content: chat.draft.trim().to_string(),
        });
        true
    }

    fn withdraw_user_turn(&mut self) {
        if let ModeState::Chat(chat) = &mut self.state {
            if matches!(chat.history.last(), Some(turn) if turn.role == ChatRole::User) {
                chat.history.pop();
            }
        }
    }

    async fn exchange(
        &mut self,
        mode: TaskMode,
        path: &'static str,
        document: Option<String>,
    ) -> Result<(), ClientError> {
        let body = request_body(&self.state, document)?;

        self.phase = Phase::Submitting;
        tracing::info!(mode = ?mode, path, "Submitting to relay");
        let response = self.transport.post_json(path, body).await?;
        if !response.is_success() {
            return Err(ClientError::Relay {
                status: response.status,
                message: relay_error_message(response.status, &response.body),
            });
        }

        self.store_result(&response)
    }

    fn store_result(&mut self, response: &RelayResponse) -> Result<(), ClientError> {
        let value: Value =
            serde_json::from_str(&response.body).map_err(|e| ClientError::Decode(e.to_string()))?;

        match &mut self.state {
            ModeState::Topic(f) => f.result = Some(lenient(value)),
            ModeState::Article(f) => f.result = Some(lenient(value)),
            ModeState::Literature(f) => f.result = Some(lenient(value)),
            ModeState::PreProposal(f) => f.result = Some(lenient(value)),
            ModeState::Summarize(f) => f.result = Some(lenient(value)),
            ModeState::Evaluate(f) => f.result = Some(lenient(value)),
            ModeState::Translate(f) => {
                let reply: TranslationResponse = lenient(value);
                f.result = Some(reply.translation);
            }
            ModeState::Chat(chat) => {
                let reply: ChatResponse = lenient(value);
                chat.history.push(ChatTurn {
                    role: ChatRole::Assistant,
                    content: reply.response,
                });
                chat.draft.clear();
            }
            ModeState::Home | ModeState::Contact => {}
        }
        Ok(())
    }

    /// Translate a suggested Persian topic to English. The result is
    /// returned to the caller and does not touch mode state.
    pub async fn translate_topic(&self, text: &str) -> Result<String, ClientError> {
        if text.trim().is_empty() {
            return Err(ValidationError::MissingText.into());
        }
        let body = to_value(&TranslateRequest {
            text: Some(text.to_string()),
        })?;
        let response = self.transport.post_json("/api/translate", body).await?;
        if !response.is_success() {
            return Err(ClientError::Relay {
                status: response.status,
                message: relay_error_message(response.status, &response.body),
            });
        }
        let value: Value =
            serde_json::from_str(&response.body).map_err(|e| ClientError::Decode(e.to_string()))?;
        let reply: TranslationResponse = lenient(value);
        Ok(reply.translation)
    }
}

/// Decode what fits; anything unusable becomes the type's default.
fn lenient<T: DeserializeOwned + Default>(value: Value) -> T {
    serde_json::from_value(value).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Relay result did not match the expected shape");
        T::default()
    })
}

fn to_value<T: serde::Serialize>(body: &T) -> Result<Value, ClientError> {
    serde_json::to_value(body).map_err(|e| ClientError::Decode(e.to_string()))
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// The relay request body for the active mode.
fn request_body(state: &ModeState, document: Option<String>) -> Result<Value, ClientError> {
    match state {
        ModeState::Topic(f) => {
            let i = &f.input;
            let req = match i.variant {
                TopicVariant::Simple => ThesisSuggestionRequest {
                    field_of_study: non_blank(&i.field_of_study),
                    ..Default::default()
                },
                TopicVariant::Advanced => ThesisSuggestionRequest {
                    field_of_study: non_blank(&i.field_of_study),
                    keywords: non_blank(&i.keywords),
                    level: i.level,
                    methodology: i.methodology,
                    target_population: non_blank(&i.target_population),
                },
            };
            to_value(&req)
        }
        ModeState::Article(f) => Ok(json!({ "keywords": f.input.keywords.trim() })),
        ModeState::Literature(f) => Ok(json!({ "keywords": f.input.keywords.trim() })),
        ModeState::PreProposal(f) => to_value(&PreProposalRequest {
            topic: non_blank(&f.input.topic),
            level: f.input.level,
            methodology: f.input.methodology,
            target_population: non_blank(&f.input.target_population),
        }),
        ModeState::Summarize(f) => to_value(&SummarizeRequest {
            content: document.or_else(|| non_blank(&f.input.content)),
        }),
        ModeState::Evaluate(f) => {
            let i = &f.input;
            to_value(&ProposalContent {
                statement: non_blank(&i.statement),
                significance: non_blank(&i.significance),
                objectives: non_blank(&i.objectives),
                questions: non_blank(&i.questions),
                methodology: non_blank(&i.methodology),
                document,
            })
        }
        ModeState::Translate(f) => to_value(&GeneralTranslateRequest {
            text: non_blank(&f.input.text),
            tone: f.input.tone,
            direction: f.input.direction,
        }),
        ModeState::Chat(chat) => Ok(json!({ "messages": chat.history })),
        ModeState::Home | ModeState::Contact => Err(ValidationError::NothingToSubmit.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::state::{Form, KeywordsInput};

    #[test]
    fn lenient_decoding_fills_defaults() {
        let reply: crate::api::types::ThesisSuggestionResponse =
            lenient(json!({ "keywords": ["a"] }));
        assert_eq!(reply.keywords, vec!["a".to_string()]);
        assert!(reply.topics.is_empty());

        let broken: crate::api::types::ThesisSuggestionResponse = lenient(json!("nope"));
        assert!(broken.keywords.is_empty());
    }

    #[test]
    fn simple_topic_sends_only_field_of_study() {
        let mut state = ModeState::fresh(TaskMode::Topic);
        if let ModeState::Topic(f) = &mut state {
            f.input.field_of_study = " حقوق ".to_string();
            f.input.keywords = "ignored".to_string();
        }
        let body = request_body(&state, None).unwrap();
        assert_eq!(body["fieldOfStudy"], "حقوق");
        assert!(body["keywords"].is_null());
    }

    #[test]
    fn keyword_modes_send_trimmed_keywords() {
        let state = ModeState::Literature(Form {
            input: KeywordsInput {
                keywords: "  رفتار سازمانی ".to_string(),
            },
            result: None,
        });
        assert_eq!(
            request_body(&state, None).unwrap(),
            json!({ "keywords": "رفتار سازمانی" })
        );
    }

    #[test]
    fn extracted_document_replaces_pasted_content() {
        let mut state = ModeState::fresh(TaskMode::Summarize);
        if let ModeState::Summarize(f) = &mut state {
            f.input.content = "pasted".to_string();
        }
        let body = request_body(&state, Some("from file".to_string())).unwrap();
        assert_eq!(body["content"], "from file");
    }
}
