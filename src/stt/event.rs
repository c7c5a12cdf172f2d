//! Recognition events and result decoding.
//!
//! Both recognizer paths emit the same [`RecognitionEvent`]: the local
//! engine from typed Vosk results, the remote path from JSON replies the
//! server sends as text frames.  [`decode_result`] handles the latter — Vosk
//! servers reply with either `{"partial": "…"}` while decoding is in flight
//! or `{"text": "…"}` once an utterance is finalized.

use serde_json::Value;

// ---------------------------------------------------------------------------
// RecognitionEvent
// ---------------------------------------------------------------------------

/// A single recognition result, partial or final.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// In-flight hypothesis for the current utterance.  Replaced (not
    /// appended to) by each subsequent partial.
    Partial(String),
    /// Committed transcript for a finished utterance.
    Final(String),
}

impl RecognitionEvent {
    /// The transcript text, regardless of kind.
    pub fn text(&self) -> &str {
        match self {
            RecognitionEvent::Partial(t) | RecognitionEvent::Final(t) => t,
        }
    }

    /// `true` for [`RecognitionEvent::Final`].
    pub fn is_final(&self) -> bool {
        matches!(self, RecognitionEvent::Final(_))
    }
}

// ---------------------------------------------------------------------------
// decode_result
// ---------------------------------------------------------------------------

/// Decode a raw Vosk JSON reply into a [`RecognitionEvent`].
///
/// The `"partial"` field is checked before `"text"`, matching the shape of
/// server replies (a reply never carries both).  Returns `None` for
/// malformed JSON or objects without either field — callers treat such
/// replies as noise, not errors.
pub fn decode_result(raw: &str) -> Option<RecognitionEvent> {
    let value: Value = serde_json::from_str(raw).ok()?;

    if let Some(partial) = value.get("partial").and_then(Value::as_str) {
        return Some(RecognitionEvent::Partial(partial.to_owned()));
    }
    if let Some(text) = value.get("text").and_then(Value::as_str) {
        return Some(RecognitionEvent::Final(text.to_owned()));
    }

    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_partial() {
        let event = decode_result(r#"{"partial": "turn the"}"#).unwrap();
        assert_eq!(event, RecognitionEvent::Partial("turn the".into()));
        assert!(!event.is_final());
    }

    #[test]
    fn decodes_final_text() {
        let event = decode_result(r#"{"text": "turn the lights on"}"#).unwrap();
        assert_eq!(event, RecognitionEvent::Final("turn the lights on".into()));
        assert!(event.is_final());
        assert_eq!(event.text(), "turn the lights on");
    }

    #[test]
    fn decodes_empty_partial() {
        // Vosk emits empty partials between utterances; they are still events.
        let event = decode_result(r#"{"partial": ""}"#).unwrap();
        assert_eq!(event, RecognitionEvent::Partial(String::new()));
    }

    #[test]
    fn partial_takes_precedence_over_text() {
        let event = decode_result(r#"{"partial": "a", "text": "b"}"#).unwrap();
        assert_eq!(event, RecognitionEvent::Partial("a".into()));
    }

    #[test]
    fn ignores_unrelated_json() {
        assert!(decode_result(r#"{"result": []}"#).is_none());
        assert!(decode_result(r#"[1, 2, 3]"#).is_none());
        assert!(decode_result(r#""just a string""#).is_none());
    }

    #[test]
    fn ignores_malformed_json() {
        assert!(decode_result("not json at all").is_none());
        assert!(decode_result(r#"{"partial": "#).is_none());
    }

    #[test]
    fn ignores_non_string_fields() {
        assert!(decode_result(r#"{"partial": 42}"#).is_none());
        assert!(decode_result(r#"{"text": null}"#).is_none());
    }
}
