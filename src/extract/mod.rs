//! Text extraction from user uploads (PDF, DOCX, plain text).
//!
//! Extraction happens before anything is sent to the relay. The orchestrator
//! depends on the [`DocumentExtractor`] trait so tests can swap in a fake.

mod docx;
mod pdf;

use thiserror::Error;

use crate::limits::{ALLOWED_MIME_TYPES, MAX_DOCUMENT_CHARS};

pub use docx::extract_docx;
pub use pdf::extract_pdf;
pub use crate::limits::truncate_chars;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const TEXT_MIME: &str = "text/plain";

/// A file the user attached, held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_supported(&self) -> bool {
        ALLOWED_MIME_TYPES.contains(&self.mime.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ExtractError {
    /// Scanned or image-only PDF.
    #[error("فایل PDF فاقد محتوای متنی قابل استخراج است. لطفاً فایلی با لایه متنی بارگذاری کنید.")]
    NoTextLayer,

    #[error("فایل Word فاقد متن قابل استخراج است.")]
    EmptyDocument,

    #[error("نوع فایل پشتیبانی نمی‌شود: {0}")]
    UnsupportedType(String),

    #[error("خطا در خواندن فایل PDF: {0}")]
    Pdf(String),

    #[error("خطا در خواندن فایل Word: {0}")]
    Docx(String),

    #[error("فایل متنی با کدگذاری UTF-8 نیست.")]
    InvalidUtf8,
}

pub trait DocumentExtractor: Send + Sync {
    /// Full text of the file, before any length cap.
    fn extract(&self, file: &UploadedFile) -> Result<String, ExtractError>;
}

/// Dispatches on the declared MIME type.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatExtractor;

impl DocumentExtractor for FormatExtractor {
    fn extract(&self, file: &UploadedFile) -> Result<String, ExtractError> {
        tracing::debug!(name = %file.name, mime = %file.mime, size = file.size(), "Extracting text");
        match file.mime.as_str() {
            PDF_MIME => extract_pdf(&file.bytes),
            DOCX_MIME => extract_docx(&file.bytes),
            TEXT_MIME => String::from_utf8(file.bytes.clone()).map_err(|_| ExtractError::InvalidUtf8),
            other => Err(ExtractError::UnsupportedType(other.to_string())),
        }
    }
}

/// Extract and cap the text at the document limit.
pub fn extract_capped(
    extractor: &dyn DocumentExtractor,
    file: &UploadedFile,
) -> Result<String, ExtractError> {
    let text = extractor.extract(file)?;
    let total = text.chars().count();
    if total > MAX_DOCUMENT_CHARS {
        tracing::info!(name = %file.name, chars = total, "Truncating extracted text");
        return Ok(truncate_chars(&text, MAX_DOCUMENT_CHARS).to_string());
    }
    Ok(text)
}
