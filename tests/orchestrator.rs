use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use thesis_relay::client::{
    ModeState, Phase, RelayResponse, RelayTransport, TaskMode, TaskOrchestrator, TokenEstimate,
    TransportError, ValidationError, CHAT_WELCOME,
};
use thesis_relay::extract::{DocumentExtractor, ExtractError, FormatExtractor, UploadedFile};
use thesis_relay::limits::{MAX_DOCUMENT_CHARS, MAX_FILE_BYTES};

/// Records each POST and answers from a script of replies. The last reply
/// repeats once the script runs out.
struct FakeTransport {
    replies: Mutex<VecDeque<(u16, String)>>,
    posts: Mutex<Vec<(String, Value)>>,
}

impl FakeTransport {
    fn new(status: u16, body: &str) -> Arc<Self> {
        Self::scripted(&[(status, body)])
    }

    fn scripted(replies: &[(u16, &str)]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(
                replies
                    .iter()
                    .map(|(status, body)| (*status, body.to_string()))
                    .collect(),
            ),
            posts: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.posts.lock().unwrap().len()
    }

    fn last(&self) -> (String, Value) {
        self.posts.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl RelayTransport for FakeTransport {
    async fn post_json(&self, path: &str, body: Value) -> Result<RelayResponse, TransportError> {
        self.posts.lock().unwrap().push((path.to_string(), body));
        let mut replies = self.replies.lock().unwrap();
        let (status, body) = if replies.len() > 1 {
            replies.pop_front().unwrap()
        } else {
            replies.front().cloned().unwrap()
        };
        Ok(RelayResponse { status, body })
    }
}

struct FixedExtractor(Result<String, ()>);

impl DocumentExtractor for FixedExtractor {
    fn extract(&self, _file: &UploadedFile) -> Result<String, ExtractError> {
        self.0.clone().map_err(|_| ExtractError::NoTextLayer)
    }
}

fn orchestrator(transport: Arc<FakeTransport>) -> TaskOrchestrator {
    TaskOrchestrator::new(transport, Arc::new(FormatExtractor))
}

fn pdf(size: usize) -> UploadedFile {
    UploadedFile::new("paper.pdf", "application/pdf", vec![0; size])
}

#[tokio::test]
async fn topic_submit_stores_result() {
    let transport = FakeTransport::new(200, r#"{"keywords":["k"],"topics":["t1","t2"]}"#);
    let mut orch = orchestrator(transport.clone());
    orch.switch_mode(TaskMode::Topic);
    if let ModeState::Topic(f) = orch.state_mut() {
        f.input.field_of_study = "مهندسی کامپیوتر".to_string();
    }

    orch.submit().await.unwrap();

    assert_eq!(transport.calls(), 1);
    let (path, body) = transport.last();
    assert_eq!(path, "/api/chat");
    assert_eq!(body, json!({ "fieldOfStudy": "مهندسی کامپیوتر" }));

    match orch.state() {
        ModeState::Topic(f) => {
            let result = f.result.as_ref().unwrap();
            assert_eq!(result.topics, vec!["t1".to_string(), "t2".to_string()]);
        }
        other => panic!("unexpected state {:?}", other),
    }
    assert!(orch.error().is_none());
    assert_eq!(orch.phase(), Phase::Idle);
}

#[tokio::test]
async fn invalid_input_never_reaches_transport() {
    let transport = FakeTransport::new(200, "{}");
    let mut orch = orchestrator(transport.clone());

    for mode in TaskMode::ALL {
        orch.switch_mode(mode);
        assert!(orch.submit().await.is_err(), "{:?}", mode);
        assert!(orch.error().is_some());
    }
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn translation_over_word_limit_is_rejected_locally() {
    let transport = FakeTransport::new(200, r#"{"translation":"x"}"#);
    let mut orch = orchestrator(transport.clone());
    orch.switch_mode(TaskMode::Translate);
    if let ModeState::Translate(f) = orch.state_mut() {
        f.input.text = vec!["کلمه"; 501].join(" ");
    }

    assert!(orch.submit().await.is_err());
    assert_eq!(orch.error(), Some("متن ورودی نباید بیشتر از 500 کلمه باشد."));
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn relay_error_envelope_becomes_message() {
    let transport = FakeTransport::new(500, r#"{"error":"خطای پیکربندی سرور: کلید API یافت نشد."}"#);
    let mut orch = orchestrator(transport);
    orch.switch_mode(TaskMode::Article);
    if let ModeState::Article(f) = orch.state_mut() {
        f.input.keywords = "بازاریابی".to_string();
    }

    assert!(orch.submit().await.is_err());
    assert_eq!(orch.error(), Some("خطای پیکربندی سرور: کلید API یافت نشد."));
    match orch.state() {
        ModeState::Article(f) => assert!(f.result.is_none()),
        other => panic!("unexpected state {:?}", other),
    }
}

#[tokio::test]
async fn non_json_error_body_uses_status_line() {
    let transport = FakeTransport::new(502, "Bad Gateway");
    let mut orch = orchestrator(transport);
    orch.switch_mode(TaskMode::Literature);
    if let ModeState::Literature(f) = orch.state_mut() {
        f.input.keywords = "x".to_string();
    }

    assert!(orch.submit().await.is_err());
    assert_eq!(
        orch.error(),
        Some("درخواست با کد وضعیت 502 با شکست مواجه شد: Bad Gateway")
    );
}

#[tokio::test]
async fn oversized_file_is_rejected_at_attach() {
    let transport = FakeTransport::new(200, "{}");
    let mut orch = orchestrator(transport.clone());
    orch.switch_mode(TaskMode::Summarize);

    let err = orch.attach_file(pdf(MAX_FILE_BYTES + 1)).unwrap_err();
    assert_eq!(err, ValidationError::FileTooLarge);
    assert!(orch.state().file().is_none());
    assert!(orch.error().is_some());

    assert!(orch.submit().await.is_err());
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn unsupported_mime_is_rejected_at_attach() {
    let mut orch = orchestrator(FakeTransport::new(200, "{}"));
    orch.switch_mode(TaskMode::Evaluate);
    let image = UploadedFile::new("scan.jpg", "image/jpeg", vec![1; 10]);
    assert_eq!(
        orch.attach_file(image),
        Err(ValidationError::UnsupportedFileType)
    );
    assert!(orch.state().file().is_none());
}

#[tokio::test]
async fn attach_in_mode_without_upload_is_rejected() {
    let mut orch = orchestrator(FakeTransport::new(200, "{}"));
    orch.switch_mode(TaskMode::Topic);
    assert_eq!(
        orch.attach_file(pdf(1024)),
        Err(ValidationError::FileNotAccepted)
    );
    assert_eq!(orch.error(), Some("این بخش فایل نمی‌پذیرد."));
    assert!(orch.state().file().is_none());
}

#[tokio::test]
async fn extraction_failure_is_distinct_and_not_submitted() {
    let transport = FakeTransport::new(200, "{}");
    let mut orch = TaskOrchestrator::new(transport.clone(), Arc::new(FixedExtractor(Err(()))));
    orch.switch_mode(TaskMode::Summarize);
    orch.attach_file(pdf(1024)).unwrap();

    assert!(orch.submit().await.is_err());
    assert!(orch
        .error()
        .unwrap()
        .starts_with("فایل PDF فاقد محتوای متنی"));
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn extracted_text_is_truncated_before_sending() {
    let transport = FakeTransport::new(
        200,
        r#"{"title":"T","introduction":"","researchMethod":"","dataCollectionMethod":"","statisticalPopulation":"","dataAnalysisMethod":"","results":"R"}"#,
    );
    let long = "م".repeat(MAX_DOCUMENT_CHARS + 1000);
    let mut orch = TaskOrchestrator::new(transport.clone(), Arc::new(FixedExtractor(Ok(long))));
    orch.switch_mode(TaskMode::Summarize);
    orch.attach_file(pdf(2048)).unwrap();

    orch.submit().await.unwrap();

    let (path, body) = transport.last();
    assert_eq!(path, "/api/summarize");
    assert_eq!(
        body["content"].as_str().unwrap().chars().count(),
        MAX_DOCUMENT_CHARS
    );
    match orch.state() {
        ModeState::Summarize(f) => assert_eq!(f.result.as_ref().unwrap().results, "R"),
        other => panic!("unexpected state {:?}", other),
    }
}

#[tokio::test]
async fn evaluate_sends_document_field() {
    let transport = FakeTransport::new(200, r#"{"score":60,"points":[],"overallComment":""}"#);
    let mut orch = TaskOrchestrator::new(
        transport.clone(),
        Arc::new(FixedExtractor(Ok("متن پروپوزال".to_string()))),
    );
    orch.switch_mode(TaskMode::Evaluate);
    orch.attach_file(pdf(10)).unwrap();

    orch.submit().await.unwrap();

    let (path, body) = transport.last();
    assert_eq!(path, "/api/evaluate-proposal");
    assert_eq!(body["document"], "متن پروپوزال");
    match orch.state() {
        ModeState::Evaluate(f) => assert_eq!(f.result.as_ref().unwrap().score, 60.0),
        other => panic!("unexpected state {:?}", other),
    }
}

#[tokio::test]
async fn switching_mode_resets_everything() {
    let transport = FakeTransport::new(200, r#"{"keywords":["k"],"topics":["t"]}"#);
    let mut orch = orchestrator(transport);
    orch.switch_mode(TaskMode::Topic);
    if let ModeState::Topic(f) = orch.state_mut() {
        f.input.field_of_study = "حقوق".to_string();
    }
    orch.submit().await.unwrap();
    assert!(orch.state().has_result());

    orch.switch_mode(TaskMode::Article);
    orch.switch_mode(TaskMode::Topic);
    assert_eq!(*orch.state(), ModeState::fresh(TaskMode::Topic));
    assert!(orch.error().is_none());
    assert_eq!(orch.estimate(), TokenEstimate::ZERO);
}

#[tokio::test]
async fn chat_appends_reply_and_clears_draft() {
    let transport = FakeTransport::new(200, r#"{"response":"سلام دانشجو"}"#);
    let mut orch = orchestrator(transport.clone());
    orch.switch_mode(TaskMode::Chat);
    if let ModeState::Chat(c) = orch.state_mut() {
        c.draft = "سلام استاد".to_string();
    }

    orch.submit().await.unwrap();

    let (_, body) = transport.last();
    assert_eq!(
        body,
        json!({ "messages": [
            { "role": "assistant", "content": CHAT_WELCOME },
            { "role": "user", "content": "سلام استاد" },
        ] })
    );
    match orch.state() {
        ModeState::Chat(c) => {
            assert_eq!(c.history.len(), 3);
            assert_eq!(c.history[2].content, "سلام دانشجو");
            assert!(c.draft.is_empty());
        }
        other => panic!("unexpected state {:?}", other),
    }
}

#[tokio::test]
async fn chat_failure_keeps_draft_for_resend() {
    let transport = FakeTransport::new(503, r#"{"error":"busy"}"#);
    let mut orch = orchestrator(transport);
    orch.switch_mode(TaskMode::Chat);
    if let ModeState::Chat(c) = orch.state_mut() {
        c.draft = "سوال".to_string();
    }

    assert!(orch.submit().await.is_err());
    match orch.state() {
        ModeState::Chat(c) => {
            assert_eq!(c.history.len(), 1);
            assert_eq!(c.history[0].content, CHAT_WELCOME);
            assert_eq!(c.draft, "سوال");
        }
        other => panic!("unexpected state {:?}", other),
    }
    assert_eq!(orch.error(), Some("busy"));
}

#[tokio::test]
async fn chat_resend_after_failure_sends_message_once() {
    let transport = FakeTransport::scripted(&[
        (503, r#"{"error":"busy"}"#),
        (200, r#"{"response":"پاسخ"}"#),
    ]);
    let mut orch = orchestrator(transport.clone());
    orch.switch_mode(TaskMode::Chat);
    if let ModeState::Chat(c) = orch.state_mut() {
        c.draft = "سوال".to_string();
    }

    assert!(orch.submit().await.is_err());
    orch.submit().await.unwrap();

    assert_eq!(transport.calls(), 2);
    let (_, body) = transport.last();
    let users: Vec<&Value> = body["messages"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|m| m["role"] == "user")
        .collect();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["content"], "سوال");

    match orch.state() {
        ModeState::Chat(c) => {
            let contents: Vec<&str> = c.history.iter().map(|t| t.content.as_str()).collect();
            assert_eq!(contents, vec![CHAT_WELCOME, "سوال", "پاسخ"]);
            assert!(c.draft.is_empty());
        }
        other => panic!("unexpected state {:?}", other),
    }
    assert!(orch.error().is_none());
}

#[tokio::test]
async fn malformed_success_body_degrades_to_defaults() {
    let transport = FakeTransport::new(200, r#"{"items":"not a list"}"#);
    let mut orch = orchestrator(transport);
    orch.switch_mode(TaskMode::Literature);
    if let ModeState::Literature(f) = orch.state_mut() {
        f.input.keywords = "x".to_string();
    }

    orch.submit().await.unwrap();
    match orch.state() {
        ModeState::Literature(f) => assert!(f.result.as_ref().unwrap().items.is_empty()),
        other => panic!("unexpected state {:?}", other),
    }
}

#[tokio::test]
async fn non_json_success_body_is_an_error() {
    let mut orch = orchestrator(FakeTransport::new(200, "<html>"));
    orch.switch_mode(TaskMode::Article);
    if let ModeState::Article(f) = orch.state_mut() {
        f.input.keywords = "x".to_string();
    }
    assert!(orch.submit().await.is_err());
    assert!(orch.error().is_some());
}

#[tokio::test]
async fn translate_topic_returns_translation() {
    let transport = FakeTransport::new(200, r#"{"translation":"Impact of AI"}"#);
    let orch = orchestrator(transport.clone());

    let english = orch.translate_topic("تاثیر هوش مصنوعی").await.unwrap();

    assert_eq!(english, "Impact of AI");
    assert_eq!(transport.last().0, "/api/translate");
}

#[test]
fn estimate_tracks_inputs() {
    let mut orch = orchestrator(FakeTransport::new(200, "{}"));
    orch.switch_mode(TaskMode::Article);
    assert_eq!(orch.estimate(), TokenEstimate::ZERO);

    if let ModeState::Article(f) = orch.state_mut() {
        f.input.keywords = "a".repeat(3);
    }
    // 350 + 1 -> 400 ; 700
    assert_eq!(
        orch.estimate(),
        TokenEstimate {
            input: 400,
            output: 700,
            total: 1100
        }
    );
}
