//! Stream configuration.

use std::env;

use console_bus::CATCH_ALL_TOPIC;

use super::queue::{DEFAULT_BURST_THRESHOLD, DEFAULT_DRAIN_DELAY_MS};
use super::summary::DEFAULT_SUMMARY_MAX_LEN;

/// Configuration for the message stream core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConfig {
    /// Maximum records retained in the visible buffer.
    pub buffer_capacity: usize,
    /// Records per page in the paginated view.
    pub page_size: usize,
    /// Flush delay under light load (milliseconds).
    pub drain_delay_ms: u64,
    /// Backlog size at which drains become immediate.
    pub burst_threshold: usize,
    /// Maximum summary length for list display.
    pub summary_max_len: usize,
    /// Topic filters to subscribe; empty means catch-all.
    pub topics: Vec<String>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: 200,
            page_size: 25,
            drain_delay_ms: DEFAULT_DRAIN_DELAY_MS,
            burst_threshold: DEFAULT_BURST_THRESHOLD,
            summary_max_len: DEFAULT_SUMMARY_MAX_LEN,
            topics: Vec::new(),
        }
    }
}

impl StreamConfig {
    /// Loads configuration from environment variables, falling back to
    /// defaults for anything missing or unparseable.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `CONSOLE_BUFFER_CAPACITY` | 200 |
    /// | `CONSOLE_PAGE_SIZE` | 25 |
    /// | `CONSOLE_DRAIN_DELAY_MS` | 100 |
    /// | `CONSOLE_BURST_THRESHOLD` | 20 |
    /// | `CONSOLE_SUMMARY_MAX_LEN` | 150 |
    /// | `CONSOLE_TOPICS` | (catch-all) comma-separated filters |
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            buffer_capacity: env_parse("CONSOLE_BUFFER_CAPACITY", defaults.buffer_capacity),
            page_size: env_parse("CONSOLE_PAGE_SIZE", defaults.page_size),
            drain_delay_ms: env_parse("CONSOLE_DRAIN_DELAY_MS", defaults.drain_delay_ms),
            burst_threshold: env_parse("CONSOLE_BURST_THRESHOLD", defaults.burst_threshold),
            summary_max_len: env_parse("CONSOLE_SUMMARY_MAX_LEN", defaults.summary_max_len),
            topics: env::var("CONSOLE_TOPICS")
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    /// Configured topics, defaulting to the catch-all filter when empty.
    #[must_use]
    pub fn topics_or_default(&self) -> Vec<String> {
        if self.topics.is_empty() {
            vec![CATCH_ALL_TOPIC.to_string()]
        } else {
            self.topics.clone()
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}
