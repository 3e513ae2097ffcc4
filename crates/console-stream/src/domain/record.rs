//! Message records.
//!
//! A record is created once at ingestion time and never mutated afterwards.
//! The id and timestamp are assigned by the console when the message
//! arrives, not taken from the payload.

use console_bus::Payload;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single captured message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Process-unique identifier: capture millis plus a random suffix.
    pub id: String,

    /// Concrete topic the message arrived on (post-wildcard-expansion).
    pub topic: String,

    /// Raw payload exactly as received.
    pub payload: Payload,

    /// Capture instant, epoch milliseconds.
    pub timestamp_ms: u64,
}

impl MessageRecord {
    /// Creates a record at ingestion time.
    #[must_use]
    pub fn new(topic: impl Into<String>, payload: Payload, now_ms: u64) -> Self {
        Self {
            id: generate_id(now_ms),
            topic: topic.into(),
            payload,
            timestamp_ms: now_ms,
        }
    }
}

/// Generates a process-unique record id: `{millis}-{8 random hex chars}`.
fn generate_id(now_ms: u64) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", now_ms, &suffix[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_embeds_capture_time() {
        let record = MessageRecord::new("fleet/edge-1/status", Payload::from("online"), 1_700_000);
        assert!(record.id.starts_with("1700000-"));
        assert_eq!(record.timestamp_ms, 1_700_000);
    }

    #[test]
    fn test_ids_are_unique_within_one_instant() {
        let a = MessageRecord::new("t", Payload::from("x"), 42);
        let b = MessageRecord::new("t", Payload::from("x"), 42);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_payload_stored_unmodified() {
        let payload = Payload::from(r#"{"not":"parsed"#);
        let record = MessageRecord::new("t", payload.clone(), 0);
        assert_eq!(record.payload, payload);
    }
}
