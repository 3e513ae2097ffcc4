//! Payload summarization and display formatting.
//!
//! Produces a human-scannable, length-bounded preview of an arbitrary
//! payload for list display. Never panics: any shape of input degrades to
//! a best-effort string form.

use chrono::{Local, TimeZone};
use console_bus::Payload;
use serde_json::Value;

/// Default maximum summary length before hard truncation.
pub const DEFAULT_SUMMARY_MAX_LEN: usize = 150;

/// Truncation marker appended when output exceeds the bound.
const ELLIPSIS: &str = "...";

/// How many head items/keys a nested value preview shows.
const HEAD_SAMPLE: usize = 3;

/// Keys identifying what kind of message this is, highest priority first.
const TYPE_KEYS: [&str; 5] = ["type", "event", "action", "command", "status"];

/// Keys carrying the message body, highest priority first.
const DATA_KEYS: [&str; 6] = ["payload", "data", "message", "content", "body", "value"];

/// Keys carrying message metadata, highest priority first.
const META_KEYS: [&str; 6] = ["id", "timestamp", "ts", "time", "date", "created"];

/// Produces a compact preview of a payload for list display.
///
/// Non-JSON text is returned verbatim (truncated). JSON objects are reduced
/// to at most one field from each of three priority tiers (type-like,
/// data-like, meta-like); when no tier matches, the fallback is an item
/// count for arrays, a key preview for objects, or the scalar's string
/// form. Output is hard-truncated to `max_len` characters plus the
/// ellipsis marker.
#[must_use]
pub fn extract_payload(payload: &Payload, max_len: usize) -> String {
    let Some(value) = payload.as_json() else {
        // Raw text that is not JSON: show it as-is
        return truncate(&payload.raw_string(), max_len);
    };
    truncate(&summarize_value(&value), max_len)
}

fn summarize_value(value: &Value) -> String {
    let Value::Object(map) = value else {
        return fallback_summary(value);
    };

    let mut parts: Vec<String> = Vec::with_capacity(3);
    if let Some((key, v)) = first_match(map, &TYPE_KEYS) {
        parts.push(format!("{}: {}", key, scalar_text(v)));
    }
    if let Some((key, v)) = first_match(map, &DATA_KEYS) {
        parts.push(format!("{}: {}", key, abbreviate(v)));
    }
    if let Some((key, v)) = first_match(map, &META_KEYS) {
        parts.push(format!("{}: {}", key, scalar_text(v)));
    }

    if parts.is_empty() {
        return fallback_summary(value);
    }
    parts.join(", ")
}

/// First tier key present in the object, in the tier's priority order.
fn first_match<'a>(
    map: &'a serde_json::Map<String, Value>,
    keys: &[&'a str],
) -> Option<(&'a str, &'a Value)> {
    keys.iter()
        .find_map(|key| map.get(*key).map(|v| (*key, v)))
}

/// Abbreviates a data-tier value: arrays and objects show a head sample
/// plus a count of what remains.
fn abbreviate(value: &Value) -> String {
    match value {
        Value::Array(items) => {
            let head: Vec<String> = items.iter().take(HEAD_SAMPLE).map(scalar_text).collect();
            let rest = items.len().saturating_sub(HEAD_SAMPLE);
            if rest > 0 {
                format!("[{} +{} more]", head.join(", "), rest)
            } else {
                format!("[{}]", head.join(", "))
            }
        }
        Value::Object(map) => {
            let head: Vec<&str> = map.keys().take(HEAD_SAMPLE).map(String::as_str).collect();
            let rest = map.len().saturating_sub(HEAD_SAMPLE);
            if rest > 0 {
                format!("{{{} +{} more}}", head.join(", "), rest)
            } else {
                format!("{{{}}}", head.join(", "))
            }
        }
        scalar => scalar_text(scalar),
    }
}

/// Summary used when no tier key matched.
fn fallback_summary(value: &Value) -> String {
    match value {
        Value::Array(items) => format!("{} items", items.len()),
        Value::Object(map) if map.is_empty() => "{}".to_string(),
        Value::Object(_) => abbreviate(value),
        scalar => scalar_text(scalar),
    }
}

/// String form of a value: bare strings stay unquoted, nested structures
/// collapse to a shape marker.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Array(items) => format!("[{} items]", items.len()),
        Value::Object(map) => format!("{{{} keys}}", map.len()),
        other => other.to_string(),
    }
}

/// Hard character-level truncation with the ellipsis marker.
fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let head: String = text.chars().take(max_len).collect();
    format!("{head}{ELLIPSIS}")
}

/// Full payload rendering for the detail view: pretty-printed JSON when the
/// payload is (or parses as) JSON, verbatim text otherwise.
#[must_use]
pub fn format_message_data(payload: &Payload) -> String {
    match payload.as_json() {
        Some(value) => {
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| payload.raw_string())
        }
        None => payload.raw_string(),
    }
}

/// Formats a capture timestamp for display: `HH:MM:SS.mmm` local time, with
/// a `YYYY-MM-DD` prefix when `include_date` is set. Out-of-range inputs
/// fall back to the raw millisecond count.
#[must_use]
pub fn format_timestamp(timestamp_ms: u64, include_date: bool) -> String {
    let Some(instant) = i64::try_from(timestamp_ms)
        .ok()
        .and_then(|ms| Local.timestamp_millis_opt(ms).single())
    else {
        return timestamp_ms.to_string();
    };

    if include_date {
        instant.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
    } else {
        instant.format("%H:%M:%S%.3f").to_string()
    }
}
