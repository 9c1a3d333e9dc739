//! Serializable session logs
//!
//! A `SessionLog` is the JSON form of a finished recording, used to replay a
//! session through the analyzer from the CLI, the FFI layer, or a host that
//! records events itself.

use serde::{Deserialize, Serialize};
use serde_json::error::Category;

use crate::error::RhythmError;
use crate::session::recorder::FrozenSession;
use crate::types::KeystrokeEvent;

/// A recorded session as exchanged with hosts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionLog {
    /// Session start in milliseconds (defaults to 0)
    #[serde(default)]
    pub start_time: u64,
    /// Session end in milliseconds; the last event's timestamp when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<u64>,
    /// Text content at the end of the session
    pub final_text: String,
    /// Events in recording order
    pub events: Vec<KeystrokeEvent>,
}

impl SessionLog {
    /// Parse a session log from JSON.
    ///
    /// Malformed JSON is a `ParseError`; well-formed JSON with the wrong shape
    /// (unknown event kind, missing field, bad type) is an `InvalidEventLog`.
    pub fn parse(json: &str) -> Result<Self, RhythmError> {
        serde_json::from_str(json).map_err(|e| match e.classify() {
            Category::Data => RhythmError::InvalidEventLog(format!("Invalid session log: {e}")),
            Category::Io | Category::Syntax | Category::Eof => {
                RhythmError::ParseError(format!("Failed to parse session log: {e}"))
            }
        })
    }

    pub fn to_json(&self) -> Result<String, RhythmError> {
        serde_json::to_string_pretty(self).map_err(RhythmError::JsonError)
    }

    /// Validate and freeze the log for analysis
    pub fn into_frozen(self) -> Result<FrozenSession, RhythmError> {
        let end_time = self.end_time.unwrap_or_else(|| {
            self.events
                .last()
                .map_or(self.start_time, |e| e.timestamp)
        });
        FrozenSession::new(self.start_time, end_time, self.events, self.final_text)
    }
}

impl From<&FrozenSession> for SessionLog {
    fn from(session: &FrozenSession) -> Self {
        Self {
            start_time: session.start_time(),
            end_time: Some(session.end_time()),
            final_text: session.final_text().to_string(),
            events: session.events().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::KeystrokeKind;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"{
        "start_time": 0,
        "final_text": "ab",
        "events": [
            { "kind": "type", "char": "a", "timestamp": 100 },
            { "kind": "backspace", "char": "", "timestamp": 300 },
            { "kind": "type", "char": "a", "timestamp": 500 },
            { "kind": "composition", "char": "b", "timestamp": 700 }
        ]
    }"#;

    #[test]
    fn test_parse_and_freeze() {
        let log = SessionLog::parse(SAMPLE).unwrap();
        assert_eq!(log.events.len(), 4);
        assert_eq!(log.end_time, None);

        let session = log.into_frozen().unwrap();
        assert_eq!(session.end_time(), 700);
        assert_eq!(session.events()[1].kind, KeystrokeKind::Backspace);
        // composition kinds are always IME-tagged
        assert!(session.events()[3].is_ime);
    }

    #[test]
    fn test_roundtrip_through_frozen() {
        let session = SessionLog::parse(SAMPLE).unwrap().into_frozen().unwrap();
        let log = SessionLog::from(&session);
        let again = SessionLog::parse(&log.to_json().unwrap())
            .unwrap()
            .into_frozen()
            .unwrap();
        assert_eq!(again, session);
    }

    #[test]
    fn test_unknown_kind_is_invalid_event_log() {
        let json = r#"{ "final_text": "x", "events": [
            { "kind": "selection", "char": "", "timestamp": 0 }
        ] }"#;
        assert!(matches!(
            SessionLog::parse(json),
            Err(RhythmError::InvalidEventLog(_))
        ));
    }

    #[test]
    fn test_missing_field_is_invalid_event_log() {
        let json = r#"{ "events": [] }"#;
        assert!(matches!(
            SessionLog::parse(json),
            Err(RhythmError::InvalidEventLog(_))
        ));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        assert!(matches!(
            SessionLog::parse("{ \"events\": ["),
            Err(RhythmError::ParseError(_))
        ));
        assert!(matches!(
            SessionLog::parse("not json"),
            Err(RhythmError::ParseError(_))
        ));
    }

    #[test]
    fn test_end_before_last_event_is_rejected() {
        let json = r#"{ "end_time": 50, "final_text": "ab", "events": [
            { "kind": "type", "char": "a", "timestamp": 0 },
            { "kind": "type", "char": "b", "timestamp": 100 }
        ] }"#;
        let result = SessionLog::parse(json).unwrap().into_frozen();
        assert!(matches!(result, Err(RhythmError::InvalidEventLog(_))));
    }
}
