//! Advisory token-cost estimate shown next to the submit button.
//!
//! Flat per-mode constants plus `ceil(chars / 3)` for user content. It is
//! never billed and never sent anywhere.

use super::state::{ModeState, TopicVariant};
use crate::limits::MAX_DOCUMENT_CHARS;

/// Both halves are rounded up to a multiple of this.
pub const GRANULARITY: u64 = 50;

pub const CHARS_PER_TOKEN: u64 = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenEstimate {
    pub input: u64,
    pub output: u64,
    pub total: u64,
}

impl TokenEstimate {
    pub const ZERO: TokenEstimate = TokenEstimate {
        input: 0,
        output: 0,
        total: 0,
    };

    fn rounded(input: u64, output: u64) -> Self {
        let input = round_up(input);
        let output = round_up(output);
        Self {
            input,
            output,
            total: input + output,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.total == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputCost {
    Fixed(u64),
    /// Output is as long as the content (translation).
    MirrorContent,
}

fn round_up(tokens: u64) -> u64 {
    tokens.div_ceil(GRANULARITY) * GRANULARITY
}

pub fn text_tokens(text: &str) -> u64 {
    (text.chars().count() as u64).div_ceil(CHARS_PER_TOKEN)
}

/// File size stands in for its text; capped like the extracted text is.
pub fn file_tokens(bytes: usize) -> u64 {
    (bytes.min(MAX_DOCUMENT_CHARS) as u64).div_ceil(CHARS_PER_TOKEN)
}

/// What counts as user content for the estimate.
enum Content<'a> {
    Text(Vec<&'a str>),
    File(usize),
}

impl Content<'_> {
    fn tokens(&self) -> u64 {
        match self {
            Content::Text(parts) => parts.iter().map(|p| text_tokens(p)).sum(),
            Content::File(bytes) => file_tokens(*bytes),
        }
    }

    fn qualifies(&self) -> bool {
        match self {
            Content::Text(parts) => parts.iter().any(|p| !p.trim().is_empty()),
            Content::File(_) => true,
        }
    }
}

fn cost_and_content(state: &ModeState) -> Option<(u64, OutputCost, Content<'_>)> {
    use OutputCost::*;

    let entry = match state {
        ModeState::Home | ModeState::Contact => return None,
        ModeState::Topic(f) => match f.input.variant {
            TopicVariant::Simple => (150, Fixed(400), Content::Text(vec![f.input.field_of_study.as_str()])),
            TopicVariant::Advanced => {
                // Optional fields only add cost once the required one is filled.
                if f.input.field_of_study.trim().is_empty() {
                    return None;
                }
                (
                    300,
                    Fixed(500),
                    Content::Text(vec![
                        f.input.field_of_study.as_str(),
                        f.input.keywords.as_str(),
                        f.input.target_population.as_str(),
                    ]),
                )
            }
        },
        ModeState::Article(f) => (350, Fixed(700), Content::Text(vec![f.input.keywords.as_str()])),
        ModeState::Literature(f) => (450, Fixed(1500), Content::Text(vec![f.input.keywords.as_str()])),
        ModeState::PreProposal(f) => {
            if f.input.topic.trim().is_empty() {
                return None;
            }
            (
                600,
                Fixed(1500),
                Content::Text(vec![f.input.topic.as_str(), f.input.target_population.as_str()]),
            )
        }
        ModeState::Summarize(f) => {
            let content = match &f.input.file {
                Some(file) => Content::File(file.size()),
                None => Content::Text(vec![f.input.content.as_str()]),
            };
            (450, Fixed(900), content)
        }
        ModeState::Evaluate(f) => {
            let content = match &f.input.file {
                Some(file) => Content::File(file.size()),
                None => Content::Text(f.input.sections().to_vec()),
            };
            (550, Fixed(800), content)
        }
        ModeState::Translate(f) => (120, MirrorContent, Content::Text(vec![f.input.text.as_str()])),
        ModeState::Chat(c) => {
            if c.draft.trim().is_empty() {
                return None;
            }
            let mut parts: Vec<&str> = c.history.iter().map(|t| t.content.as_str()).collect();
            parts.push(c.draft.as_str());
            (200, Fixed(500), Content::Text(parts))
        }
    };
    Some(entry)
}

/// Estimate for the current state of a mode.
pub fn estimate(state: &ModeState) -> TokenEstimate {
    let Some((base, output, content)) = cost_and_content(state) else {
        return TokenEstimate::ZERO;
    };
    if !content.qualifies() {
        return TokenEstimate::ZERO;
    }

    let content_tokens = content.tokens();
    let output = match output {
        OutputCost::Fixed(n) => n,
        OutputCost::MirrorContent => content_tokens,
    };
    TokenEstimate::rounded(base + content_tokens, output)
}
