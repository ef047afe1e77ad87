//! Stop-word filtered recall overlap for the unlock check.
//!
//! The unlock decision is deliberately generous in one direction: the score
//! is the fraction of the reference answer's meaningful tokens that the user
//! reproduced. Extra words in the user's answer cost nothing; missing
//! reference words lower the score. Matching is case- and
//! punctuation-insensitive and does no stemming.

use std::collections::HashSet;

/// Closed stop-word list: articles, conjunctions, common prepositions, and
/// forms of "to be". These never count toward the overlap on either side.
pub const STOP_WORDS: [&str; 18] = [
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is",
    "are", "was", "were",
];

/// Minimum recall against the reference answer to count as correct.
pub const UNLOCK_THRESHOLD: f64 = 0.6;

/// Lower-cased word tokens with stop words removed.
///
/// A token is a maximal run of alphanumeric characters or `_`; everything
/// else delimits. Duplicates collapse, so token identity is set membership.
pub fn answer_tokens(answer: &str) -> HashSet<String> {
    let mut tokens = HashSet::new();
    let mut current = String::new();
    for ch in answer.trim().chars() {
        if ch.is_alphanumeric() || ch == '_' {
            for lower in ch.to_lowercase() {
                current.push(lower);
            }
        } else if !current.is_empty() {
            tokens.insert(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.insert(current);
    }
    tokens.retain(|t| !STOP_WORDS.contains(&t.as_str()));
    tokens
}

/// Recall of the reference answer's tokens within the user's answer.
///
/// `None` when the filtered reference set is empty; a reference made only of
/// stop words can never be matched, and callers must fail closed.
pub fn recall_score(user_answer: &str, reference_answer: &str) -> Option<f64> {
    let reference = answer_tokens(reference_answer);
    if reference.is_empty() {
        return None;
    }
    let user = answer_tokens(user_answer);
    let hits = reference.iter().filter(|t| user.contains(*t)).count();
    Some(hits as f64 / reference.len() as f64)
}

/// Whether the user's answer clears the unlock threshold.
pub fn is_match(user_answer: &str, reference_answer: &str) -> bool {
    recall_score(user_answer, reference_answer).is_some_and(|score| score >= UNLOCK_THRESHOLD)
}
