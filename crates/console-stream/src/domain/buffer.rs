//! Bounded message buffer.
//!
//! Holds the visible window of most-recent records, newest first, with a
//! hard capacity ceiling. Inserting beyond capacity permanently discards
//! the oldest entries; there is no overflow spooling.

use std::collections::VecDeque;
use std::sync::Arc;

use super::errors::StreamError;
use super::record::MessageRecord;

/// Fixed-capacity, newest-first store of message records.
///
/// INVARIANTS:
/// - `len() <= capacity` after every operation
/// - index 0 is always the most recently inserted retained record
/// - insertion order is preserved for all retained records
#[derive(Debug)]
pub struct MessageBuffer {
    capacity: usize,
    records: VecDeque<Arc<MessageRecord>>,
}

impl MessageBuffer {
    /// Creates an empty buffer.
    ///
    /// # Errors
    ///
    /// `InvalidCapacity` if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, StreamError> {
        if capacity == 0 {
            return Err(StreamError::InvalidCapacity { capacity });
        }
        Ok(Self {
            capacity,
            records: VecDeque::with_capacity(capacity),
        })
    }

    /// Inserts a drained batch, oldest arrival first.
    ///
    /// The batch is prepended in reverse so the most recent arrival lands at
    /// index 0, then the buffer is truncated to capacity. Returns the number
    /// of records evicted. An empty batch is a no-op.
    pub fn insert_batch(&mut self, oldest_first: Vec<Arc<MessageRecord>>) -> usize {
        if oldest_first.is_empty() {
            return 0;
        }

        for record in oldest_first {
            self.records.push_front(record);
        }

        let evicted = self.records.len().saturating_sub(self.capacity);
        self.records.truncate(self.capacity);
        evicted
    }

    /// Empties the buffer.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Number of retained records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no records are retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Configured capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records in `[start, end)` window, newest first. Out-of-range bounds
    /// are clamped to the buffer length.
    #[must_use]
    pub fn window(&self, start: usize, end: usize) -> Vec<Arc<MessageRecord>> {
        let end = end.min(self.records.len());
        let start = start.min(end);
        self.records.range(start..end).cloned().collect()
    }

    /// Newest-first iterator over retained records.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<MessageRecord>> {
        self.records.iter()
    }
}
