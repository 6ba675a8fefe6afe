//! Relay handlers, one per task.
//!
//! Every handler follows the same order: credentials, body, required
//! fields, prompt, one provider call, envelope.

use std::sync::Arc;

use axum::{extract::State, Json};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::envelope::{json_envelope, text_output};
use super::error::RelayError;
use super::prompt::{self, RelayTask, Slots};
use super::routes::AppState;
use super::types::*;
use crate::limits::{
    truncate_chars, word_count, MAX_CHAT_TURNS, MAX_DOCUMENT_CHARS, MAX_TRANSLATE_WORDS,
    MIN_SUMMARY_CHARS,
};
use crate::llm::{ChatMessage, CompletionRequest, Role};

type JsonResult = Result<Json<Value>, RelayError>;

pub async fn method_not_allowed() -> RelayError {
    RelayError::MethodNotAllowed
}

fn api_key(state: &AppState) -> Result<String, RelayError> {
    state.credentials.api_key().ok_or(RelayError::MissingCredentials)
}

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, RelayError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "Rejecting request body");
        RelayError::bad_request("بدنه درخواست یک JSON معتبر نیست.")
    })
}

/// The trimmed value of a required text field.
fn required<'a>(value: &'a Option<String>, message: &str) -> Result<&'a str, RelayError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(RelayError::bad_request(message)),
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

async fn complete_json(
    state: &AppState,
    api_key: &str,
    task: RelayTask,
    request: CompletionRequest,
) -> JsonResult {
    tracing::info!(task = ?task, path = task.path(), "Forwarding prompt to provider");
    let request = if task.expects_json() {
        request.json()
    } else {
        request
    };
    let raw = state.llm.complete(api_key, request).await?;
    let value = json_envelope(task, &raw)?;
    Ok(Json(value))
}

async fn complete_text(
    state: &AppState,
    api_key: &str,
    task: RelayTask,
    request: CompletionRequest,
) -> Result<String, RelayError> {
    tracing::info!(task = ?task, path = task.path(), "Forwarding prompt to provider");
    let raw = state.llm.complete(api_key, request).await?;
    text_output(&raw)
}

/// POST /api/chat - keywords and topic suggestions for a field of study.
pub async fn suggest(State(state): State<Arc<AppState>>, body: Bytes) -> JsonResult {
    let key = api_key(&state)?;
    let req: ThesisSuggestionRequest = parse_body(&body)?;
    let field = required(&req.field_of_study, "رشته تحصیلی یک مقدار الزامی است.")?;

    let advanced = present(&req.keywords).is_some()
        || req.level.is_some()
        || req.methodology.is_some()
        || present(&req.target_population).is_some();

    let mut slots = Slots::new();
    slots.insert("field_of_study", field.to_string());
    let template = if advanced {
        if let Some(k) = present(&req.keywords) {
            slots.insert("keywords", k.to_string());
        }
        if let Some(t) = present(&req.target_population) {
            slots.insert("target_population", t.to_string());
        }
        if let Some(level) = req.level {
            slots.insert("level", level.label_fa().to_string());
            let note = match level {
                AcademicLevel::Arshad => prompt::ARSHAD_NOTE,
                AcademicLevel::Doctora => prompt::DOCTORA_NOTE,
            };
            slots.insert("level_note", note.to_string());
        }
        if let Some(m) = req.methodology {
            slots.insert("methodology", m.label_fa().to_string());
        }
        &prompt::TOPIC_ADVANCED
    } else {
        &prompt::TOPIC_SIMPLE
    };

    let task = RelayTask::Suggest;
    let request = CompletionRequest::prompt(template.render(&slots)?, task.temperature()).top_p(0.95);
    complete_json(&state, &key, task, request).await
}

/// POST /api/scholar - real English articles for Persian keywords.
pub async fn scholar(State(state): State<Arc<AppState>>, body: Bytes) -> JsonResult {
    let key = api_key(&state)?;
    let req: KeywordsRequest = parse_body(&body)?;
    let keywords = required(&req.keywords, "کلیدواژه‌ها یک مقدار الزامی است.")?;

    let slots = Slots::from([("keywords", keywords.to_string())]);
    let task = RelayTask::Scholar;
    let request = CompletionRequest::prompt(prompt::SCHOLAR.render(&slots)?, task.temperature());
    complete_json(&state, &key, task, request).await
}

/// POST /api/literature - literature-review paragraphs with references.
pub async fn literature(State(state): State<Arc<AppState>>, body: Bytes) -> JsonResult {
    let key = api_key(&state)?;
    let req: KeywordsRequest = parse_body(&body)?;
    let keywords = required(&req.keywords, "کلیدواژه‌ها الزامی است.")?;

    let slots = Slots::from([("keywords", keywords.to_string())]);
    let task = RelayTask::Literature;
    let request =
        CompletionRequest::prompt(prompt::LITERATURE.render(&slots)?, task.temperature());
    complete_json(&state, &key, task, request).await
}

/// POST /api/pre-proposal
pub async fn pre_proposal(State(state): State<Arc<AppState>>, body: Bytes) -> JsonResult {
    let key = api_key(&state)?;
    let req: PreProposalRequest = parse_body(&body)?;
    let topic = required(&req.topic, "موضوع پایان‌نامه یک مقدار الزامی است.")?;

    let mut slots = Slots::from([("topic", topic.to_string())]);
    if let Some(level) = req.level {
        slots.insert("level", level.label_fa().to_string());
    }
    if let Some(m) = req.methodology {
        slots.insert("methodology", m.label_fa().to_string());
    }
    if let Some(t) = present(&req.target_population) {
        slots.insert("target_population", t.to_string());
    }

    let task = RelayTask::PreProposal;
    let request = CompletionRequest::prompt(prompt::PRE_PROPOSAL.render(&slots)?, task.temperature())
        .top_p(1.0);
    complete_json(&state, &key, task, request).await
}

/// POST /api/summarize - structured summary of an article's text.
pub async fn summarize(State(state): State<Arc<AppState>>, body: Bytes) -> JsonResult {
    let key = api_key(&state)?;
    let req: SummarizeRequest = parse_body(&body)?;
    let content = present(&req.content)
        .filter(|c| c.chars().count() >= MIN_SUMMARY_CHARS)
        .ok_or_else(|| {
            RelayError::bad_request("محتوای مقاله برای خلاصه‌سازی بسیار کوتاه یا نامعتبر است.")
        })?;

    let slots = Slots::from([(
        "content",
        truncate_chars(content, MAX_DOCUMENT_CHARS).to_string(),
    )]);
    let task = RelayTask::Summarize;
    let request = CompletionRequest::prompt(prompt::SUMMARIZE.render(&slots)?, task.temperature());
    complete_json(&state, &key, task, request).await
}

/// Render the submitted proposal sections; blank sections are left out.
pub fn proposal_sections(content: &ProposalContent) -> String {
    let labelled = [
        ("Statement of Problem (بیان مسئله)", &content.statement),
        ("Significance of the Study (اهمیت و ضرورت)", &content.significance),
        ("Objectives (اهداف تحقیق)", &content.objectives),
        ("Research Questions/Hypotheses (سوالات و فرضیات)", &content.questions),
        ("Methodology (روش‌شناسی)", &content.methodology),
        ("Full proposal document (متن کامل پروپوزال)", &content.document),
    ];

    labelled
        .iter()
        .filter_map(|(label, value)| present(value).map(|v| (label, v)))
        .enumerate()
        .map(|(i, (label, v))| {
            format!(
                "{}. **{}:**\n\"{}\"",
                i + 1,
                label,
                truncate_chars(v, MAX_DOCUMENT_CHARS)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// POST /api/evaluate-proposal - score and critique whichever sections were sent.
pub async fn evaluate(State(state): State<Arc<AppState>>, body: Bytes) -> JsonResult {
    let key = api_key(&state)?;
    let req: ProposalContent = parse_body(&body)?;
    let sections = proposal_sections(&req);
    if sections.is_empty() {
        return Err(RelayError::bad_request(
            "لطفاً حداقل یک بخش از پروپوزال را تکمیل کنید.",
        ));
    }

    let slots = Slots::from([("sections", sections)]);
    let task = RelayTask::Evaluate;
    let request = CompletionRequest::prompt(prompt::EVALUATE.render(&slots)?, task.temperature());
    complete_json(&state, &key, task, request).await
}

/// POST /api/translate - a thesis topic from Persian to English.
pub async fn translate_topic(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<TranslationResponse>, RelayError> {
    let key = api_key(&state)?;
    let req: TranslateRequest = parse_body(&body)?;
    let text = required(&req.text, "متن برای ترجمه الزامی است.")?;

    let slots = Slots::from([("text", text.to_string())]);
    let task = RelayTask::TranslateTopic;
    let request =
        CompletionRequest::prompt(prompt::TRANSLATE_TOPIC.render(&slots)?, task.temperature());
    let translation = complete_text(&state, &key, task, request).await?;
    Ok(Json(TranslationResponse { translation }))
}

/// POST /api/general-translate - free text, either direction, with a tone.
pub async fn general_translate(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<TranslationResponse>, RelayError> {
    let key = api_key(&state)?;
    let req: GeneralTranslateRequest = parse_body(&body)?;
    let text = required(&req.text, "متن ورودی الزامی است.")?;
    if word_count(text) > MAX_TRANSLATE_WORDS {
        return Err(RelayError::bad_request(format!(
            "متن ورودی نباید بیشتر از {} کلمه باشد.",
            MAX_TRANSLATE_WORDS
        )));
    }

    let (source, target, extra) = match req.direction {
        TranslationDirection::FaEn => ("Persian (Farsi)", "English", ""),
        TranslationDirection::EnFa => (
            "English",
            "Persian (Farsi)",
            "Make sure the Persian output reads naturally and respects the requested tone.",
        ),
    };
    let slots = Slots::from([
        ("text", text.to_string()),
        ("source_language", source.to_string()),
        ("target_language", target.to_string()),
        ("tone", prompt::tone_instruction(req.tone).to_string()),
        ("extra", extra.to_string()),
    ]);

    let task = RelayTask::GeneralTranslate;
    let request =
        CompletionRequest::prompt(prompt::GENERAL_TRANSLATE.render(&slots)?, task.temperature());
    let translation = complete_text(&state, &key, task, request).await?;
    Ok(Json(TranslationResponse { translation }))
}

/// POST /api/chat-bot - thesis-supervisor chat over the recent history.
pub async fn chat_bot(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ChatResponse>, RelayError> {
    let key = api_key(&state)?;
    let req: ChatRequest = parse_body(&body)?;
    let turns = req
        .messages
        .filter(|m| !m.is_empty())
        .ok_or_else(|| RelayError::bad_request("تاریخچه پیام‌ها الزامی است."))?;

    let skip = turns.len().saturating_sub(MAX_CHAT_TURNS);
    let mut messages = vec![ChatMessage::system(prompt::CHAT_BOT.render(&Slots::new())?)];
    messages.extend(turns.into_iter().skip(skip).map(|turn| ChatMessage {
        role: match turn.role {
            ChatRole::User => Role::User,
            ChatRole::Assistant => Role::Assistant,
        },
        content: turn.content,
    }));

    let task = RelayTask::ChatBot;
    let request = CompletionRequest {
        messages,
        temperature: task.temperature(),
        top_p: None,
        json_mode: false,
    };
    let response = complete_text(&state, &key, task, request).await?;
    Ok(Json(ChatResponse { response }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_skip_blank_fields_and_number_the_rest() {
        let content = ProposalContent {
            statement: Some("  ".to_string()),
            objectives: Some("هدف اصلی".to_string()),
            methodology: Some("پیمایشی".to_string()),
            ..Default::default()
        };
        let rendered = proposal_sections(&content);
        assert!(rendered.starts_with("1. **Objectives (اهداف تحقیق):**"));
        assert!(rendered.contains("2. **Methodology (روش‌شناسی):**"));
        assert!(!rendered.contains("Statement"));
    }

    #[test]
    fn no_sections_renders_empty() {
        assert!(proposal_sections(&ProposalContent::default()).is_empty());
    }

    #[test]
    fn required_trims_and_rejects_blank() {
        assert_eq!(required(&Some(" x ".to_string()), "m").unwrap(), "x");
        assert!(required(&Some(" ".to_string()), "m").is_err());
        assert!(required(&None, "m").is_err());
    }

    #[test]
    fn body_bytes_parse_as_json_or_400() {
        let ok: TranslateRequest =
            parse_body(&Bytes::from_static(r#"{"text":"سلام"}"#.as_bytes())).unwrap();
        assert_eq!(ok.text.as_deref(), Some("سلام"));

        let err = parse_body::<TranslateRequest>(&Bytes::from_static(b"not json")).unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
    }
}
