//! Message payload representation.
//!
//! Payloads are opaque to the bus: the broker delivers either raw text or
//! already-structured JSON, and the console stores whichever form arrived
//! without mutating it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An inbound message payload, stored exactly as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    /// Structured JSON payload.
    Json(Value),
    /// Raw text payload (may or may not be valid JSON).
    Text(String),
}

impl Payload {
    /// Returns the payload as a JSON value if it is structured, or if the
    /// text form parses as JSON. Raw text that fails to parse yields `None`.
    #[must_use]
    pub fn as_json(&self) -> Option<Value> {
        match self {
            Self::Json(value) => Some(value.clone()),
            Self::Text(text) => serde_json::from_str(text).ok(),
        }
    }

    /// Best-effort string form of the raw payload.
    #[must_use]
    pub fn raw_string(&self) -> String {
        match self {
            Self::Json(value) => value.to_string(),
            Self::Text(text) => text.clone(),
        }
    }

    /// Approximate size in bytes of the payload as carried.
    #[must_use]
    pub fn size_hint(&self) -> usize {
        match self {
            Self::Json(value) => value.to_string().len(),
            Self::Text(text) => text.len(),
        }
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_payload_as_json() {
        let payload = Payload::from(json!({"type": "telemetry"}));
        assert_eq!(payload.as_json(), Some(json!({"type": "telemetry"})));
    }

    #[test]
    fn test_text_payload_parses_as_json() {
        let payload = Payload::from(r#"{"status": "online"}"#);
        assert_eq!(payload.as_json(), Some(json!({"status": "online"})));
    }

    #[test]
    fn test_malformed_text_is_not_json() {
        let payload = Payload::from("not json at all");
        assert!(payload.as_json().is_none());
        assert_eq!(payload.raw_string(), "not json at all");
    }

    #[test]
    fn test_raw_string_preserves_json() {
        let payload = Payload::from(json!({"a": 1}));
        assert_eq!(payload.raw_string(), r#"{"a":1}"#);
    }
}
