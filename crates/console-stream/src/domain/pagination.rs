//! Paginated view over the bounded buffer.
//!
//! The page slice is memoized on a `(current_page, page_size, buffer_len)`
//! cache key. Recomputation is cheap; the memoization exists to keep the
//! consuming UI from re-rendering on every drain cycle when the visible
//! page did not actually change.

use std::sync::Arc;

use super::buffer::MessageBuffer;
use super::errors::StreamError;
use super::record::MessageRecord;

/// Cache key for the materialized page slice.
type PageKey = (usize, usize, usize);

/// 1-indexed page window over a [`MessageBuffer`].
#[derive(Debug)]
pub struct PageView {
    page_size: usize,
    current_page: usize,
    cache_key: Option<PageKey>,
    cached: Vec<Arc<MessageRecord>>,
}

impl PageView {
    /// Creates a view at page 1.
    ///
    /// # Errors
    ///
    /// `InvalidPageSize` if `page_size` is zero.
    pub fn new(page_size: usize) -> Result<Self, StreamError> {
        if page_size == 0 {
            return Err(StreamError::InvalidPageSize);
        }
        Ok(Self {
            page_size,
            current_page: 1,
            cache_key: None,
            cached: Vec::new(),
        })
    }

    /// Current page number (1-indexed).
    #[must_use]
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Records per page.
    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Total pages for a buffer of `buffer_len` records, minimum 1.
    #[must_use]
    pub fn total_pages(&self, buffer_len: usize) -> usize {
        buffer_len.div_ceil(self.page_size).max(1)
    }

    /// Changes the page size, invalidating the cache. The current page is
    /// not reset; the next recomputation corrects it if it fell out of
    /// range.
    ///
    /// # Errors
    ///
    /// `InvalidPageSize` if `page_size` is zero; no state changes.
    pub fn set_page_size(&mut self, page_size: usize) -> Result<(), StreamError> {
        if page_size == 0 {
            return Err(StreamError::InvalidPageSize);
        }
        self.page_size = page_size;
        self.invalidate();
        Ok(())
    }

    /// Navigates to page `n`.
    ///
    /// # Errors
    ///
    /// `PageOutOfRange` for `n == 0` or `n > total_pages`; the current page
    /// is left unchanged (no clamping).
    pub fn go_to_page(&mut self, n: usize, buffer_len: usize) -> Result<(), StreamError> {
        let total = self.total_pages(buffer_len);
        if n == 0 || n > total {
            return Err(StreamError::PageOutOfRange {
                requested: n,
                total,
            });
        }
        self.current_page = n;
        Ok(())
    }

    /// Moves to the next page.
    ///
    /// # Errors
    ///
    /// `PageOutOfRange` when already on the last page.
    pub fn next_page(&mut self, buffer_len: usize) -> Result<(), StreamError> {
        self.go_to_page(self.current_page + 1, buffer_len)
    }

    /// Moves to the previous page.
    ///
    /// # Errors
    ///
    /// `PageOutOfRange` when already on page 1.
    pub fn prev_page(&mut self, buffer_len: usize) -> Result<(), StreamError> {
        self.go_to_page(self.current_page.wrapping_sub(1), buffer_len)
    }

    /// Drops the memoized slice, forcing the next [`PageView::page`] call to
    /// recompute.
    pub fn invalidate(&mut self) {
        self.cache_key = None;
        self.cached.clear();
    }

    /// Back to page 1 with an empty cache (after `clear()`).
    pub fn reset(&mut self) {
        self.current_page = 1;
        self.invalidate();
    }

    /// The current page's records, newest first.
    ///
    /// Recomputed only when the cache key changed or after
    /// [`PageView::invalidate`]. If the buffer shrank below the current
    /// page, the view auto-corrects to the last page here: the correction
    /// settles with the structural change instead of mid-mutation.
    pub fn page(&mut self, buffer: &MessageBuffer) -> Vec<Arc<MessageRecord>> {
        let total = self.total_pages(buffer.len());
        if self.current_page > total {
            self.current_page = total;
        }

        let key: PageKey = (self.current_page, self.page_size, buffer.len());
        if self.cache_key != Some(key) {
            let start = (self.current_page - 1) * self.page_size;
            self.cached = buffer.window(start, start + self.page_size);
            self.cache_key = Some(key);
        }
        self.cached.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use console_bus::Payload;

    fn filled_buffer(n: usize) -> MessageBuffer {
        let mut buffer = MessageBuffer::new(100).unwrap();
        let batch = (0..n)
            .map(|i| Arc::new(MessageRecord::new("t", Payload::from(i.to_string()), 0)))
            .collect();
        buffer.insert_batch(batch);
        buffer
    }

    fn tags(page: &[Arc<MessageRecord>]) -> Vec<String> {
        page.iter().map(|r| r.payload.raw_string()).collect()
    }

    #[test]
    fn test_zero_page_size_rejected() {
        assert!(matches!(
            PageView::new(0),
            Err(StreamError::InvalidPageSize)
        ));
    }

    #[test]
    fn test_total_pages_minimum_one() {
        let view = PageView::new(10).unwrap();
        assert_eq!(view.total_pages(0), 1);
        assert_eq!(view.total_pages(10), 1);
        assert_eq!(view.total_pages(11), 2);
    }

    #[test]
    fn test_page_one_is_newest() {
        let buffer = filled_buffer(5);
        let mut view = PageView::new(2).unwrap();
        assert_eq!(tags(&view.page(&buffer)), vec!["4", "3"]);
    }

    #[test]
    fn test_last_page_is_partial() {
        let buffer = filled_buffer(5);
        let mut view = PageView::new(2).unwrap();
        view.go_to_page(3, buffer.len()).unwrap();
        assert_eq!(tags(&view.page(&buffer)), vec!["0"]);
    }

    #[test]
    fn test_out_of_range_navigation_rejected() {
        let buffer = filled_buffer(5);
        let mut view = PageView::new(2).unwrap();

        assert!(matches!(
            view.go_to_page(0, buffer.len()),
            Err(StreamError::PageOutOfRange { requested: 0, .. })
        ));
        assert!(matches!(
            view.go_to_page(4, buffer.len()),
            Err(StreamError::PageOutOfRange { requested: 4, total: 3 })
        ));
        assert_eq!(view.current_page(), 1);
    }

    #[test]
    fn test_next_prev_wrappers() {
        let buffer = filled_buffer(5);
        let mut view = PageView::new(2).unwrap();

        assert!(view.prev_page(buffer.len()).is_err());
        view.next_page(buffer.len()).unwrap();
        assert_eq!(view.current_page(), 2);
        view.prev_page(buffer.len()).unwrap();
        assert_eq!(view.current_page(), 1);
    }

    #[test]
    fn test_cache_hit_skips_recompute() {
        let buffer = filled_buffer(5);
        let mut view = PageView::new(2).unwrap();

        let first = view.page(&buffer);
        let second = view.page(&buffer);
        assert_eq!(tags(&first), tags(&second));
        assert_eq!(view.cache_key, Some((1, 2, 5)));
    }

    #[test]
    fn test_buffer_growth_changes_key() {
        let mut buffer = filled_buffer(2);
        let mut view = PageView::new(2).unwrap();
        assert_eq!(tags(&view.page(&buffer)), vec!["1", "0"]);

        buffer.insert_batch(vec![Arc::new(MessageRecord::new(
            "t",
            Payload::from("new"),
            0,
        ))]);
        assert_eq!(tags(&view.page(&buffer)), vec!["new", "1"]);
    }

    #[test]
    fn test_shrink_auto_corrects_current_page() {
        let mut buffer = filled_buffer(5);
        let mut view = PageView::new(2).unwrap();
        view.go_to_page(3, buffer.len()).unwrap();

        buffer.clear();
        let page = view.page(&buffer);
        assert!(page.is_empty());
        assert_eq!(view.current_page(), 1);
    }

    #[test]
    fn test_set_page_size_invalidates_but_keeps_page() {
        let buffer = filled_buffer(10);
        let mut view = PageView::new(2).unwrap();
        view.go_to_page(2, buffer.len()).unwrap();
        view.page(&buffer);

        view.set_page_size(5).unwrap();
        assert_eq!(view.current_page(), 2);
        assert_eq!(tags(&view.page(&buffer)), vec!["4", "3", "2", "1", "0"]);

        assert!(view.set_page_size(0).is_err());
        assert_eq!(view.page_size(), 5);
    }

    #[test]
    fn test_reset_returns_to_page_one() {
        let buffer = filled_buffer(5);
        let mut view = PageView::new(2).unwrap();
        view.go_to_page(2, buffer.len()).unwrap();
        view.reset();
        assert_eq!(view.current_page(), 1);
    }
}
