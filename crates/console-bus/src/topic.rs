//! Topic filter matching.
//!
//! Filters use `/`-separated levels with two wildcards:
//!
//! - `+` matches exactly one level (`fleet/+/status` matches
//!   `fleet/edge-1/status` but not `fleet/edge-1/door/status`)
//! - `#` matches any number of trailing levels and is only valid as the
//!   last level (`fleet/#`, or bare `#` as the catch-all)

use crate::client::BusError;
use crate::TOPIC_SEPARATOR;

/// Checks whether a concrete topic matches a filter.
///
/// Concrete topics never contain wildcards; a filter made entirely of
/// literal levels matches only itself.
#[must_use]
pub fn matches(filter: &str, topic: &str) -> bool {
    let mut filter_levels = filter.split(TOPIC_SEPARATOR);
    let mut topic_levels = topic.split(TOPIC_SEPARATOR);

    loop {
        match (filter_levels.next(), topic_levels.next()) {
            (Some("#"), _) => return true,
            (Some("+"), Some(_)) => {}
            (Some(f), Some(t)) if f == t => {}
            (None, None) => return true,
            _ => return false,
        }
    }
}

/// Validates a topic filter.
///
/// # Errors
///
/// Returns `BusError::InvalidTopicFilter` if the filter is empty, contains
/// an empty level, uses `#` anywhere but the final level, or embeds a
/// wildcard inside a literal level (e.g. `fleet+/status`).
pub fn validate_filter(filter: &str) -> Result<(), BusError> {
    let invalid = || BusError::InvalidTopicFilter {
        filter: filter.to_string(),
    };

    if filter.is_empty() {
        return Err(invalid());
    }

    let levels: Vec<&str> = filter.split(TOPIC_SEPARATOR).collect();
    for (i, level) in levels.iter().enumerate() {
        match *level {
            "" => return Err(invalid()),
            "#" if i + 1 != levels.len() => return Err(invalid()),
            "#" | "+" => {}
            literal if literal.contains(['#', '+']) => return Err(invalid()),
            _ => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(matches("fleet/edge-1/status", "fleet/edge-1/status"));
        assert!(!matches("fleet/edge-1/status", "fleet/edge-2/status"));
    }

    #[test]
    fn test_single_level_wildcard() {
        assert!(matches("fleet/+/status", "fleet/edge-1/status"));
        assert!(!matches("fleet/+/status", "fleet/edge-1/door/status"));
        assert!(!matches("fleet/+/status", "fleet/status"));
    }

    #[test]
    fn test_multi_level_wildcard() {
        assert!(matches("fleet/#", "fleet/edge-1/status"));
        assert!(matches("fleet/#", "fleet"));
        assert!(!matches("fleet/#", "depot/edge-1"));
    }

    #[test]
    fn test_catch_all() {
        assert!(matches("#", "anything/at/all"));
        assert!(matches("#", "x"));
    }

    #[test]
    fn test_validate_accepts_wildcards() {
        assert!(validate_filter("fleet/+/status").is_ok());
        assert!(validate_filter("fleet/#").is_ok());
        assert!(validate_filter("#").is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_filters() {
        assert!(validate_filter("").is_err());
        assert!(validate_filter("fleet//status").is_err());
        assert!(validate_filter("fleet/#/status").is_err());
        assert!(validate_filter("fleet+/status").is_err());
    }
}
