//! # Console Stream - Real-Time Message Ingestion Core
//!
//! Absorbs a potentially high-rate, bursty stream of bus messages and
//! exposes a stable, paginated, bounded view of the most recent ones to a
//! UI that must never block or jank.
//!
//! ## Pipeline
//!
//! ```text
//! Bus Client ──handler──▶ PendingQueue ──debounced drain──▶ MessageBuffer
//!                                                                │
//!                               UI ◀── StreamSnapshot ◀── PageView
//! ```
//!
//! ## Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | Buffer never exceeds capacity | `domain/buffer.rs` - `insert_batch()` truncation |
//! | Newest-first insertion order | `domain/buffer.rs` - front insertion of reversed batch |
//! | At most one live subscription per topic | `service/subscriptions.rs` - entry map |
//! | At most one pending drain timer | `service/stream.rs` - timer slot replacement |
//! | Paused-era messages are never replayed | `domain/queue.rs` - `set_paused()` discard |
//!
//! ## Batching policy
//!
//! A message arriving with a small backlog becomes visible within the
//! debounce delay (100 ms by default); once the backlog reaches the burst
//! threshold (20), the drain is scheduled on the next event-loop turn
//! instead, bounding the UI update frequency under load. Records arriving
//! while a drain applies are carried into an immediately-scheduled
//! follow-up cycle, so nothing is starved or lost.
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  service/ - stream orchestration, subscription lifecycle     │
//! └──────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌──────────────────────────────────────────────────────────────┐
//! │  ports/inbound.rs  - MessageStreamApi trait, StreamSnapshot  │
//! │  ports/outbound.rs - TimeSource                              │
//! └──────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌──────────────────────────────────────────────────────────────┐
//! │  domain/ - queue, buffer, pagination, summarizer, config     │
//! └──────────────────────────────────────────────────────────────┘
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod domain;
pub mod ports;
pub mod service;

// Re-export main types
pub use domain::{
    extract_payload, format_message_data, format_timestamp, MessageBuffer, MessageRecord,
    PageView, PendingQueue, StreamConfig, StreamError, DEFAULT_SUMMARY_MAX_LEN,
};
pub use ports::{FixedTimeSource, MessageStreamApi, StreamSnapshot, SystemTimeSource, TimeSource};
pub use service::{MessageStreamService, SubscribeOutcome, SubscriptionManager, SubscriptionState};
