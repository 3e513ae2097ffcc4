//! Outbound ports: collaborators the stream core depends on.
//!
//! The bus client port lives in `console-bus`; the only port defined here
//! is the clock, kept behind a trait so ingestion timestamps are
//! deterministic in tests.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Clock used to assign capture timestamps at ingestion.
pub trait TimeSource: Send + Sync {
    /// Current instant, epoch milliseconds.
    fn now_ms(&self) -> u64;
}

/// System wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0)
    }
}

/// Shared trait object form used by the service.
pub type SharedTimeSource = Arc<dyn TimeSource>;

/// Fixed clock for deterministic tests.
#[derive(Debug)]
pub struct FixedTimeSource(pub std::sync::atomic::AtomicU64);

impl FixedTimeSource {
    /// Creates a clock pinned at `now_ms`.
    #[must_use]
    pub fn at(now_ms: u64) -> Self {
        Self(std::sync::atomic::AtomicU64::new(now_ms))
    }

    /// Advances the clock.
    pub fn advance(&self, delta_ms: u64) {
        self.0
            .fetch_add(delta_ms, std::sync::atomic::Ordering::SeqCst);
    }
}

impl TimeSource for FixedTimeSource {
    fn now_ms(&self) -> u64 {
        self.0.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_past_2023() {
        assert!(SystemTimeSource.now_ms() > 1_672_531_200_000);
    }

    #[test]
    fn test_fixed_clock_advances() {
        let clock = FixedTimeSource::at(1_000);
        assert_eq!(clock.now_ms(), 1_000);
        clock.advance(500);
        assert_eq!(clock.now_ms(), 1_500);
    }
}
