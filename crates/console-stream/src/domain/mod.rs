//! Domain layer: pure, synchronous state machines for the message stream.
//!
//! Nothing in this layer touches the bus or the runtime; the service layer
//! drives these types from the event callbacks and the drain timer.

pub mod buffer;
pub mod config;
pub mod errors;
pub mod pagination;
pub mod queue;
pub mod record;
pub mod summary;

pub use buffer::MessageBuffer;
pub use config::StreamConfig;
pub use errors::StreamError;
pub use pagination::PageView;
pub use queue::{PendingQueue, DEFAULT_BURST_THRESHOLD, DEFAULT_DRAIN_DELAY_MS};
pub use record::MessageRecord;
pub use summary::{
    extract_payload, format_message_data, format_timestamp, DEFAULT_SUMMARY_MAX_LEN,
};
