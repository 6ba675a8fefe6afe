//! Per-mode input and result state.

use crate::api::types::{
    AcademicLevel, ArticleResponse, ChatRole, ChatTurn, EvaluationResponse,
    LiteratureReviewResponse, PreProposalResponse, ResearchMethod, SummaryResponse,
    ThesisSuggestionResponse, TranslationDirection, TranslationTone,
};
use crate::extract::UploadedFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskMode {
    Home,
    Contact,
    Topic,
    Article,
    Literature,
    PreProposal,
    Summarize,
    Evaluate,
    Translate,
    Chat,
}

impl TaskMode {
    pub const ALL: [TaskMode; 10] = [
        TaskMode::Home,
        TaskMode::Contact,
        TaskMode::Topic,
        TaskMode::Article,
        TaskMode::Literature,
        TaskMode::PreProposal,
        TaskMode::Summarize,
        TaskMode::Evaluate,
        TaskMode::Translate,
        TaskMode::Chat,
    ];

    /// Relay path called on submit; `None` for the static pages.
    pub fn endpoint(self) -> Option<&'static str> {
        match self {
            Self::Home | Self::Contact => None,
            Self::Topic => Some("/api/chat"),
            Self::Article => Some("/api/scholar"),
            Self::Literature => Some("/api/literature"),
            Self::PreProposal => Some("/api/pre-proposal"),
            Self::Summarize => Some("/api/summarize"),
            Self::Evaluate => Some("/api/evaluate-proposal"),
            Self::Translate => Some("/api/general-translate"),
            Self::Chat => Some("/api/chat-bot"),
        }
    }

    pub fn accepts_file(self) -> bool {
        matches!(self, Self::Summarize | Self::Evaluate)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TopicVariant {
    #[default]
    Simple,
    Advanced,
}

/// Inputs of one mode plus its last successful result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Form<I, R> {
    pub input: I,
    pub result: Option<R>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopicInput {
    pub field_of_study: String,
    pub variant: TopicVariant,
    pub keywords: String,
    pub level: Option<AcademicLevel>,
    pub methodology: Option<ResearchMethod>,
    pub target_population: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeywordsInput {
    pub keywords: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreProposalInput {
    pub topic: String,
    pub level: Option<AcademicLevel>,
    pub methodology: Option<ResearchMethod>,
    pub target_population: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummarizeInput {
    pub content: String,
    pub file: Option<UploadedFile>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluateInput {
    pub statement: String,
    pub significance: String,
    pub objectives: String,
    pub questions: String,
    pub methodology: String,
    pub file: Option<UploadedFile>,
}

impl EvaluateInput {
    pub fn sections(&self) -> [&str; 5] {
        [
            &self.statement,
            &self.significance,
            &self.objectives,
            &self.questions,
            &self.methodology,
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslateInput {
    pub text: String,
    pub tone: TranslationTone,
    pub direction: TranslationDirection,
}

/// Opening assistant turn of every new conversation. It is part of the
/// history and goes to the relay with it.
pub const CHAT_WELCOME: &str = "سلام. من دستیار هوشمند شما (استاد راهنما) هستم. لطفاً توجه داشته باشید که من یک هوش مصنوعی هستم. اگر به مشاوره تخصصی یک مشاور حرفه‌ای و با تجربه نیاز دارید، باید به سایت کاسپین تز مراجعه کنید:\nhttps://caspianthesis.com/";

#[derive(Debug, Clone, PartialEq)]
pub struct ChatState {
    pub history: Vec<ChatTurn>,
    pub draft: String,
}

impl Default for ChatState {
    fn default() -> Self {
        Self {
            history: vec![ChatTurn {
                role: ChatRole::Assistant,
                content: CHAT_WELCOME.to_string(),
            }],
            draft: String::new(),
        }
    }
}

/// State of the active mode. Only one variant exists at a time, so nothing
/// from a previous mode can leak into the next one.
#[derive(Debug, Clone, PartialEq)]
pub enum ModeState {
    Home,
    Contact,
    Topic(Form<TopicInput, ThesisSuggestionResponse>),
    Article(Form<KeywordsInput, ArticleResponse>),
    Literature(Form<KeywordsInput, LiteratureReviewResponse>),
    PreProposal(Form<PreProposalInput, PreProposalResponse>),
    Summarize(Form<SummarizeInput, SummaryResponse>),
    Evaluate(Form<EvaluateInput, EvaluationResponse>),
    Translate(Form<TranslateInput, String>),
    Chat(ChatState),
}

impl Default for ModeState {
    fn default() -> Self {
        Self::Home
    }
}

impl ModeState {
    pub fn fresh(mode: TaskMode) -> Self {
        match mode {
            TaskMode::Home => Self::Home,
            TaskMode::Contact => Self::Contact,
            TaskMode::Topic => Self::Topic(Form::default()),
            TaskMode::Article => Self::Article(Form::default()),
            TaskMode::Literature => Self::Literature(Form::default()),
            TaskMode::PreProposal => Self::PreProposal(Form::default()),
            TaskMode::Summarize => Self::Summarize(Form::default()),
            TaskMode::Evaluate => Self::Evaluate(Form::default()),
            TaskMode::Translate => Self::Translate(Form::default()),
            TaskMode::Chat => Self::Chat(ChatState::default()),
        }
    }

    pub fn mode(&self) -> TaskMode {
        match self {
            Self::Home => TaskMode::Home,
            Self::Contact => TaskMode::Contact,
            Self::Topic(_) => TaskMode::Topic,
            Self::Article(_) => TaskMode::Article,
            Self::Literature(_) => TaskMode::Literature,
            Self::PreProposal(_) => TaskMode::PreProposal,
            Self::Summarize(_) => TaskMode::Summarize,
            Self::Evaluate(_) => TaskMode::Evaluate,
            Self::Translate(_) => TaskMode::Translate,
            Self::Chat(_) => TaskMode::Chat,
        }
    }

    /// Drop the current result; chat history is kept.
    pub fn clear_result(&mut self) {
        match self {
            Self::Topic(f) => f.result = None,
            Self::Article(f) => f.result = None,
            Self::Literature(f) => f.result = None,
            Self::PreProposal(f) => f.result = None,
            Self::Summarize(f) => f.result = None,
            Self::Evaluate(f) => f.result = None,
            Self::Translate(f) => f.result = None,
            Self::Home | Self::Contact | Self::Chat(_) => {}
        }
    }

    pub fn has_result(&self) -> bool {
        match self {
            Self::Topic(f) => f.result.is_some(),
            Self::Article(f) => f.result.is_some(),
            Self::Literature(f) => f.result.is_some(),
            Self::PreProposal(f) => f.result.is_some(),
            Self::Summarize(f) => f.result.is_some(),
            Self::Evaluate(f) => f.result.is_some(),
            Self::Translate(f) => f.result.is_some(),
            Self::Home | Self::Contact | Self::Chat(_) => false,
        }
    }

    pub fn file(&self) -> Option<&UploadedFile> {
        match self {
            Self::Summarize(f) => f.input.file.as_ref(),
            Self::Evaluate(f) => f.input.file.as_ref(),
            _ => None,
        }
    }

    /// Storage for an attachment, in modes that take one.
    pub(crate) fn file_slot(&mut self) -> Option<&mut Option<UploadedFile>> {
        match self {
            Self::Summarize(f) => Some(&mut f.input.file),
            Self::Evaluate(f) => Some(&mut f.input.file),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_matches_mode() {
        for mode in TaskMode::ALL {
            let state = ModeState::fresh(mode);
            assert_eq!(state.mode(), mode);
            assert!(!state.has_result());
        }
    }

    #[test]
    fn only_document_modes_take_files() {
        for mode in TaskMode::ALL {
            let mut state = ModeState::fresh(mode);
            assert_eq!(state.file_slot().is_some(), mode.accepts_file());
        }
    }

    #[test]
    fn static_pages_have_no_endpoint() {
        assert_eq!(TaskMode::Home.endpoint(), None);
        assert_eq!(TaskMode::Contact.endpoint(), None);
        assert_eq!(TaskMode::Topic.endpoint(), Some("/api/chat"));
    }

    #[test]
    fn new_chat_opens_with_the_welcome_turn() {
        let ModeState::Chat(chat) = ModeState::fresh(TaskMode::Chat) else {
            panic!("chat mode must start in chat state");
        };
        assert_eq!(chat.history.len(), 1);
        assert_eq!(chat.history[0].role, ChatRole::Assistant);
        assert!(chat.history[0].content.contains("https://caspianthesis.com/"));
        assert!(chat.draft.is_empty());
    }
}
