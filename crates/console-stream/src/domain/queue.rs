//! Pending message queue and batching policy.
//!
//! Decouples the (possibly very high frequency) arrival callback from the
//! comparatively expensive act of publishing records to the visible buffer.
//! The queue itself is synchronous; the owning service drives the actual
//! drain timer.
//!
//! ## Batching policy
//!
//! - backlog below the burst threshold: drain after a fixed short delay,
//!   keeping per-message latency bounded under light load
//! - backlog at or above the threshold: drain immediately, keeping the
//!   visible-state update frequency bounded under heavy load
//! - records arriving while a drain is applying are left for the next
//!   cycle, which the service schedules with zero delay

use std::sync::Arc;
use std::time::Duration;

use super::record::MessageRecord;

/// Default flush delay under light load.
pub const DEFAULT_DRAIN_DELAY_MS: u64 = 100;

/// Backlog size above which drains are scheduled immediately.
pub const DEFAULT_BURST_THRESHOLD: usize = 20;

/// Accumulates inbound records between drain cycles.
#[derive(Debug)]
pub struct PendingQueue {
    pending: Vec<Arc<MessageRecord>>,
    paused: bool,
    draining: bool,
    drain_delay: Duration,
    burst_threshold: usize,
}

impl PendingQueue {
    /// Creates a queue with the given batching parameters.
    #[must_use]
    pub fn new(drain_delay_ms: u64, burst_threshold: usize) -> Self {
        Self {
            pending: Vec::new(),
            paused: false,
            draining: false,
            drain_delay: Duration::from_millis(drain_delay_ms),
            burst_threshold,
        }
    }

    /// Appends a record to the backlog.
    ///
    /// Returns false (record dropped) while paused; the caller must not
    /// schedule a drain in that case.
    pub fn push(&mut self, record: Arc<MessageRecord>) -> bool {
        if self.paused {
            return false;
        }
        self.pending.push(record);
        true
    }

    /// Current backlog size.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// True when the backlog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Whether ingestion is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pauses or resumes ingestion.
    ///
    /// Pausing means "stop watching": the undrained backlog is discarded
    /// along with future arrivals, not buffered for later replay.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
        if paused {
            self.pending.clear();
        }
    }

    /// Delay to use for the next scheduled drain, based on backlog size.
    #[must_use]
    pub fn drain_delay(&self) -> Duration {
        if self.pending.len() >= self.burst_threshold {
            Duration::ZERO
        } else {
            self.drain_delay
        }
    }

    /// Takes the whole backlog (oldest arrival first) and marks a drain in
    /// flight. Returns `None` if a drain is already applying; the records
    /// stay queued for the follow-up cycle.
    pub fn begin_drain(&mut self) -> Option<Vec<Arc<MessageRecord>>> {
        if self.draining {
            return None;
        }
        self.draining = true;
        Some(std::mem::take(&mut self.pending))
    }

    /// Ends the in-flight drain. Returns the number of records that arrived
    /// while it was applying; when nonzero the caller schedules an immediate
    /// follow-up cycle so those records are not starved.
    pub fn finish_drain(&mut self) -> usize {
        self.draining = false;
        self.pending.len()
    }
}

impl Default for PendingQueue {
    fn default() -> Self {
        Self::new(DEFAULT_DRAIN_DELAY_MS, DEFAULT_BURST_THRESHOLD)
    }
}
