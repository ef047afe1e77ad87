//! Input validation and char-safe truncation.
//!
//! Study text arrives from a browser textarea or a PDF extractor and gets
//! embedded into prompts with per-filter length bounds. Truncation counts
//! characters, not bytes, so multibyte input never splits mid-character.

/// Trim surrounding whitespace; `None` when nothing remains.
pub fn normalized(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}

/// First `max_chars` characters of `text`.
///
/// Silent bound, not an error: prompt templates call this to keep request
/// sizes predictable and the caller never needs to know.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text.get(..idx).unwrap_or(text),
        None => text,
    }
}
