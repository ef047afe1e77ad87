//! Text extraction from uploaded PDFs.
//!
//! Thin wrapper over lopdf. Extraction is best-effort: pages that fail to
//! decode are skipped, and the document only errors when it cannot be
//! parsed at all or no page yielded any text.

use lopdf::Document;
use thiserror::Error;
use tracing::debug;

/// Extraction failures. Both are the caller's document's fault, so the API
/// layer reports them as bad requests.
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("could not read PDF: {0}")]
    Parse(String),
    #[error("no extractable text in PDF; the document may be scanned")]
    Empty,
}

/// Extract the text of every page, in page order, joined by newlines.
pub fn extract_text(bytes: &[u8]) -> Result<String, PdfError> {
    let document = Document::load_mem(bytes).map_err(|e| PdfError::Parse(e.to_string()))?;

    let mut text = String::new();
    for page_number in document.get_pages().keys() {
        match document.extract_text(&[*page_number]) {
            Ok(page_text) => {
                text.push_str(&page_text);
                text.push('\n');
            }
            Err(e) => debug!("skipping undecodable page {page_number}: {e}"),
        }
    }

    if text.trim().is_empty() {
        return Err(PdfError::Empty);
    }
    Ok(text)
}
