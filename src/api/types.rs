//! API request and response types.
//!
//! Shared by the relay handlers (deserialising requests, serialising
//! envelopes) and by the client core (the reverse). Field names are the
//! camelCase names the browser front end already speaks.
//!
//! Request fields are all optional so that presence validation can produce
//! the task-specific 400 message rather than a generic decode failure.
//! Response types default every field so a partially malformed envelope
//! still renders.

use serde::{Deserialize, Serialize};

/// Academic level of the thesis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AcademicLevel {
    /// Master's (کارشناسی ارشد)
    Arshad,
    /// Doctorate (دکتری)
    Doctora,
}

impl AcademicLevel {
    pub fn label_fa(self) -> &'static str {
        match self {
            Self::Arshad => "کارشناسی ارشد",
            Self::Doctora => "دکتری",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResearchMethod {
    Quantitative,
    Qualitative,
    Mixed,
}

impl ResearchMethod {
    pub fn label_fa(self) -> &'static str {
        match self {
            Self::Quantitative => "کمی",
            Self::Qualitative => "کیفی",
            Self::Mixed => "ترکیبی",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TranslationTone {
    Formal,
    Informal,
    #[default]
    Academic,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum TranslationDirection {
    #[default]
    #[serde(rename = "fa-en")]
    FaEn,
    #[serde(rename = "en-fa")]
    EnFa,
}

// ─────────────────────────────────────────────────────────────────────────────
// Requests
// ─────────────────────────────────────────────────────────────────────────────

/// `POST /api/chat` - keyword and topic suggestions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThesisSuggestionRequest {
    #[serde(default)]
    pub field_of_study: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<AcademicLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methodology: Option<ResearchMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_population: Option<String>,
}

/// `POST /api/scholar` and `POST /api/literature`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeywordsRequest {
    #[serde(default)]
    pub keywords: Option<String>,
}

/// `POST /api/pre-proposal`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreProposalRequest {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<AcademicLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methodology: Option<ResearchMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_population: Option<String>,
}

/// `POST /api/summarize`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummarizeRequest {
    #[serde(default)]
    pub content: Option<String>,
}

/// `POST /api/evaluate-proposal`. Any subset of sections may be sent;
/// `document` carries the extracted text of an uploaded proposal file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProposalContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub significance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objectives: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methodology: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
}

/// `POST /api/translate` - thesis topic, Persian to English.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranslateRequest {
    #[serde(default)]
    pub text: Option<String>,
}

/// `POST /api/general-translate`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralTranslateRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub tone: TranslationTone,
    #[serde(default)]
    pub direction: TranslationDirection,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

/// `POST /api/chat-bot`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Option<Vec<ChatTurn>>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Responses
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ThesisSuggestionResponse {
    pub keywords: Vec<String>,
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Article {
    pub title: String,
    pub authors: Vec<String>,
    pub publication_year: Option<i64>,
    pub summary: String,
    pub link: String,
}

/// `/api/scholar` responds with a bare array.
pub type ArticleResponse = Vec<Article>;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LiteratureItem {
    pub paragraph: String,
    pub reference: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LiteratureReviewResponse {
    pub items: Vec<LiteratureItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Methodology {
    pub research_type_and_design: String,
    pub population_and_sample: String,
    pub data_collection_tools: String,
    pub data_analysis_method: String,
    pub potential_software: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PreProposalResponse {
    pub introduction: String,
    pub main_objective: String,
    pub specific_objectives: Vec<String>,
    pub main_question: String,
    pub specific_questions: Vec<String>,
    pub methodology: Methodology,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SummaryResponse {
    pub title: String,
    pub introduction: String,
    pub research_method: String,
    pub data_collection_method: String,
    pub statistical_population: String,
    pub data_analysis_method: String,
    pub results: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EvaluationPoint {
    pub weakness: String,
    pub improvement: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct EvaluationResponse {
    pub score: f64,
    pub points: Vec<EvaluationPoint>,
    pub overall_comment: String,
}

/// Shared by `/api/translate` and `/api/general-translate`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TranslationResponse {
    pub translation: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChatResponse {
    pub response: String,
}

/// Body of every non-200 relay response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}
