use lopdf::Document;

use super::ExtractError;
use crate::limits::MAX_PDF_PAGES;

/// Text of the first pages of a PDF, one line group per page.
pub fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    let doc = Document::load_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))?;

    let pages: Vec<u32> = doc
        .get_pages()
        .keys()
        .copied()
        .take(MAX_PDF_PAGES)
        .collect();

    let mut text = String::new();
    for page in pages {
        match doc.extract_text(&[page]) {
            Ok(page_text) => {
                text.push_str(page_text.trim());
                text.push('\n');
            }
            Err(e) => tracing::warn!(page, error = %e, "Skipping unreadable PDF page"),
        }
    }

    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(ExtractError::NoTextLayer);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_are_a_pdf_error() {
        assert!(matches!(
            extract_pdf(b"definitely not a pdf"),
            Err(ExtractError::Pdf(_))
        ));
    }
}
