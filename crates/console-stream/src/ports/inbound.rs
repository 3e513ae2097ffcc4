//! Inbound port: the surface the UI layer drives.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{MessageRecord, StreamError};
use crate::service::subscriptions::SubscribeOutcome;

/// One coherent snapshot of the stream state for rendering.
///
/// The UI pulls a snapshot whenever the revision channel signals a change;
/// all fields are read under the same locks so they are mutually
/// consistent.
#[derive(Debug, Clone)]
pub struct StreamSnapshot {
    /// The current page's records, newest first.
    pub records: Vec<Arc<MessageRecord>>,
    /// Current page number (1-indexed).
    pub current_page: usize,
    /// Total pages, minimum 1.
    pub total_pages: usize,
    /// Records per page.
    pub page_size: usize,
    /// Records currently retained in the buffer.
    pub buffered: usize,
    /// Whether ingestion is paused.
    pub paused: bool,
    /// Whether at least one topic subscription is live.
    pub subscribed: bool,
    /// Whether the bus connection is up.
    pub connection_ready: bool,
}

/// Primary API for the message stream.
///
/// Implemented by the stream service; the UI layer holds this trait so the
/// whole pipeline can be doubled in component tests.
#[async_trait]
pub trait MessageStreamApi: Send + Sync {
    /// Subscribes every configured topic. Partial failure is tolerated;
    /// the outcome lists per-topic results.
    async fn subscribe_to_all_topics(&self) -> SubscribeOutcome;

    /// Releases every live subscription, best-effort. Returns how many
    /// were released.
    async fn unsubscribe_from_all_topics(&self) -> usize;

    /// Toggles ingestion pause. Returns the new paused state. Pausing
    /// discards the undrained backlog; it does not tear down
    /// subscriptions.
    fn toggle_pause(&self) -> bool;

    /// Empties the buffer and resets pagination to page 1.
    fn clear_messages(&self);

    /// Navigates to page `n` (1-indexed).
    ///
    /// # Errors
    ///
    /// `PageOutOfRange` for 0 or past the last page; no state changes.
    fn go_to_page(&self, n: usize) -> Result<(), StreamError>;

    /// Moves to the next page.
    ///
    /// # Errors
    ///
    /// `PageOutOfRange` when already on the last page.
    fn next_page(&self) -> Result<(), StreamError>;

    /// Moves to the previous page.
    ///
    /// # Errors
    ///
    /// `PageOutOfRange` when already on page 1.
    fn prev_page(&self) -> Result<(), StreamError>;

    /// Changes the page size.
    ///
    /// # Errors
    ///
    /// `InvalidPageSize` for 0.
    fn set_page_size(&self, page_size: usize) -> Result<(), StreamError>;

    /// Current coherent state for rendering.
    fn snapshot(&self) -> StreamSnapshot;
}
