//! Stream error types.
//!
//! Connectivity failures are surfaced as state for the UI to render, never
//! thrown across the ingestion path. Malformed payloads are not an error at
//! all: the summarizer degrades to a best-effort string instead.

use thiserror::Error;

/// Errors from the message stream core.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// Subscribe attempted while the bus is down.
    #[error("bus is not connected")]
    NotConnected,

    /// A topic could not be subscribed.
    #[error("failed to subscribe to topic '{topic}'")]
    SubscribeFailed {
        /// The topic that failed.
        topic: String,
    },

    /// A topic could not be unsubscribed; the handle is retained for retry.
    #[error("failed to unsubscribe from topic '{topic}'")]
    UnsubscribeFailed {
        /// The topic whose handle is still live.
        topic: String,
    },

    /// Buffer capacity must be a positive integer.
    #[error("invalid buffer capacity {capacity}")]
    InvalidCapacity {
        /// The rejected capacity.
        capacity: usize,
    },

    /// Page size must be a positive integer.
    #[error("page size must be at least 1")]
    InvalidPageSize,

    /// A page navigation request was out of range; no state changed.
    #[error("page {requested} out of range (1..={total})")]
    PageOutOfRange {
        /// The requested page number.
        requested: usize,
        /// The current total page count.
        total: usize,
    },
}

impl From<console_bus::BusError> for StreamError {
    fn from(err: console_bus::BusError) -> Self {
        match err {
            console_bus::BusError::NotConnected => Self::NotConnected,
            console_bus::BusError::SubscribeFailed { topic }
            | console_bus::BusError::InvalidTopicFilter { filter: topic } => {
                Self::SubscribeFailed { topic }
            }
            console_bus::BusError::UnsubscribeFailed { topic } => Self::UnsubscribeFailed { topic },
        }
    }
}
