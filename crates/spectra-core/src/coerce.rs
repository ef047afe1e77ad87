//! Markdown-fence stripping and strict typed parsing of model replies.
//!
//! Gemini is asked for "JSON ONLY" but routinely wraps the payload in
//! ```` ```json ```` fences. This module removes the fencing and attempts a
//! strict parse into the caller's output type. What it never does is guess:
//! a reply that does not parse cleanly yields `None`, and the caller
//! substitutes its own deterministic fallback payload.

use serde::de::DeserializeOwned;
use tracing::debug;

/// Remove fence markers anywhere in the reply and trim the remainder.
pub fn strip_fences(raw: &str) -> String {
    raw.replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Parse a model reply into `T` after fence cleanup.
///
/// `None` means "use your fallback". Parse failures are logged at debug
/// level only; they are an expected mode of operation, not an incident.
pub fn parse_reply<T: DeserializeOwned>(raw: &str) -> Option<T> {
    let cleaned = strip_fences(raw);
    match serde_json::from_str(&cleaned) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("model reply failed strict parse: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, Debug, PartialEq)]
    struct Payload {
        name: String,
        count: u32,
    }

    #[test]
    fn strips_json_fences() {
        let raw = "```json\n{\"name\": \"chunks\", \"count\": 3}\n```";
        let parsed: Payload = parse_reply(raw).unwrap();
        assert_eq!(
            parsed,
            Payload {
                name: "chunks".into(),
                count: 3
            }
        );
    }

    #[test]
    fn strips_bare_fences() {
        let raw = "```\n{\"name\": \"x\", \"count\": 1}\n```";
        assert!(parse_reply::<Payload>(raw).is_some());
    }

    #[test]
    fn plain_json_passes_through() {
        let raw = "{\"name\": \"plain\", \"count\": 0}";
        assert!(parse_reply::<Payload>(raw).is_some());
    }

    #[test]
    fn prose_wrapped_json_is_rejected() {
        let raw = "Sure! Here is the JSON: {\"name\": \"x\", \"count\": 1}";
        assert!(parse_reply::<Payload>(raw).is_none());
    }

    #[test]
    fn missing_field_is_rejected() {
        let raw = "{\"name\": \"incomplete\"}";
        assert!(parse_reply::<Payload>(raw).is_none());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_reply::<Payload>("AI API Error: connection reset").is_none());
    }
}
