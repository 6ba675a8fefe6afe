//! Size limits shared by the relay and the client core.

/// Largest upload accepted at attach time (4 MiB).
pub const MAX_FILE_BYTES: usize = 4 * 1024 * 1024;

/// Extracted document text is cut to this many characters before it is sent,
/// and the relay applies the same cut to whatever it receives.
pub const MAX_DOCUMENT_CHARS: usize = 30_000;

/// Only the first pages of a PDF are read.
pub const MAX_PDF_PAGES: usize = 15;

/// General translation input ceiling, in whitespace-separated words.
pub const MAX_TRANSLATE_WORDS: usize = 500;

/// Pasted article text shorter than this is not worth summarising.
pub const MIN_SUMMARY_CHARS: usize = 100;

/// Chat history sent upstream is capped to the most recent turns.
pub const MAX_CHAT_TURNS: usize = 20;

pub const ALLOWED_MIME_TYPES: [&str; 3] = [
    "application/pdf",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
];

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Truncate to at most `max_chars` Unicode scalar values.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
