//! Message stream service.
//!
//! Wires the ingestion pipeline together: bus handler → pending queue →
//! (debounced drain) → bounded buffer → paginated view. Owns the single
//! cancellable drain timer and the reconnect policy.
//!
//! All UI-observable state lives behind plain locks; consumers learn about
//! changes through a `watch` revision channel and pull a coherent
//! [`StreamSnapshot`] when it ticks. Must be used inside a tokio runtime
//! (the drain timer is a spawned task).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use console_bus::{BusClient, ConnectionStatus, ListenerId, MessageHandler, Payload};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::{
    MessageBuffer, MessageRecord, PageView, PendingQueue, StreamConfig, StreamError,
};
use crate::ports::inbound::{MessageStreamApi, StreamSnapshot};
use crate::ports::outbound::{SharedTimeSource, SystemTimeSource};
use crate::service::subscriptions::{SubscribeOutcome, SubscriptionManager};

/// The message ingestion core behind the console's live-messages view.
///
/// One instance per UI component; the bus client is shared and injected.
pub struct MessageStreamService {
    inner: Arc<StreamInner>,
}

struct StreamInner {
    queue: Mutex<PendingQueue>,
    buffer: Mutex<MessageBuffer>,
    pages: Mutex<PageView>,

    /// The single pending drain timer. Rescheduling replaces (aborts) it;
    /// there is never a queue of timers.
    drain_timer: Mutex<Option<JoinHandle<()>>>,

    subscriptions: SubscriptionManager<dyn BusClient>,
    client: Arc<dyn BusClient>,
    time: SharedTimeSource,

    connection_ready: AtomicBool,
    status_listener: Mutex<Option<ListenerId>>,

    /// Set by `close()` before the buffer is cleared; a drain that was
    /// already applying discards its batch instead of landing it.
    closed: AtomicBool,

    /// Monotonic revision; bumped whenever UI-observable state changed.
    revision: watch::Sender<u64>,
}

impl MessageStreamService {
    /// Creates a service over an injected bus client with the system clock.
    ///
    /// # Errors
    ///
    /// `InvalidCapacity` / `InvalidPageSize` for a zero buffer capacity or
    /// page size.
    pub fn new(client: Arc<dyn BusClient>, config: StreamConfig) -> Result<Self, StreamError> {
        Self::with_time_source(client, config, Arc::new(SystemTimeSource))
    }

    /// Creates a service with an explicit clock (deterministic tests).
    ///
    /// # Errors
    ///
    /// Same validation as [`MessageStreamService::new`].
    pub fn with_time_source(
        client: Arc<dyn BusClient>,
        config: StreamConfig,
        time: SharedTimeSource,
    ) -> Result<Self, StreamError> {
        let buffer = MessageBuffer::new(config.buffer_capacity)?;
        let pages = PageView::new(config.page_size)?;
        let queue = PendingQueue::new(config.drain_delay_ms, config.burst_threshold);
        let subscriptions =
            SubscriptionManager::new(client.clone(), config.topics_or_default());

        let (revision, _) = watch::channel(0);
        let connected = client.is_connected();

        Ok(Self {
            inner: Arc::new(StreamInner {
                queue: Mutex::new(queue),
                buffer: Mutex::new(buffer),
                pages: Mutex::new(pages),
                drain_timer: Mutex::new(None),
                subscriptions,
                client,
                time,
                connection_ready: AtomicBool::new(connected),
                status_listener: Mutex::new(None),
                closed: AtomicBool::new(false),
                revision,
            }),
        })
    }

    /// Registers the connection status listener (reconnect policy).
    ///
    /// On a disconnected→connected transition with zero live subscriptions,
    /// the configured topic set is re-subscribed automatically.
    pub fn start(&self) {
        let weak = Arc::downgrade(&self.inner);
        let id = self.inner.client.on_status_change(Arc::new(move |status| {
            if let Some(inner) = weak.upgrade() {
                StreamInner::on_status_change(&inner, status);
            }
        }));
        *lock(&self.inner.status_listener) = Some(id);
        self.inner
            .connection_ready
            .store(self.inner.client.is_connected(), Ordering::SeqCst);
    }

    /// Tears the instance down: releases subscriptions and the status
    /// listener, cancels the drain timer, and discards all records,
    /// including any drain already applying. The bus connection itself is
    /// left untouched. Terminal; a closed instance stays empty.
    pub async fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        self.inner.subscriptions.unsubscribe_all().await;
        if let Some(id) = lock(&self.inner.status_listener).take() {
            self.inner.client.remove_status_listener(id);
        }
        StreamInner::cancel_drain_timer(&self.inner);
        {
            let mut queue = lock(&self.inner.queue);
            queue.set_paused(true);
            queue.set_paused(false);
        }
        lock(&self.inner.buffer).clear();
        lock(&self.inner.pages).reset();
        self.inner.bump_revision();
        info!("Message stream closed");
    }

    /// A change receiver: the value ticks whenever a new snapshot is worth
    /// pulling.
    #[must_use]
    pub fn watch_changes(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }
}

impl Drop for MessageStreamService {
    fn drop(&mut self) {
        StreamInner::cancel_drain_timer(&self.inner);
        if let Some(id) = lock(&self.inner.status_listener).take() {
            self.inner.client.remove_status_listener(id);
        }
    }
}

impl StreamInner {
    /// Builds the per-message bus callback for this instance.
    ///
    /// Holds only a weak reference so a dropped service cannot be revived
    /// by in-flight messages.
    fn message_handler(inner: &Arc<Self>) -> MessageHandler {
        let weak = Arc::downgrade(inner);
        Arc::new(move |topic, payload| {
            if let Some(inner) = weak.upgrade() {
                Self::ingest(&inner, topic, payload);
            }
        })
    }

    /// Ingestion entry point: record creation, enqueue, drain scheduling.
    fn ingest(inner: &Arc<Self>, topic: &str, payload: Payload) {
        let record = Arc::new(MessageRecord::new(topic, payload, inner.time.now_ms()));

        let delay = {
            let mut queue = lock(&inner.queue);
            if !queue.push(record) {
                // Paused: drop without scheduling
                return;
            }
            queue.drain_delay()
        };

        Self::schedule_drain(inner, delay);
    }

    /// Sets or replaces the pending drain timer; the latest scheduling
    /// request wins.
    fn schedule_drain(inner: &Arc<Self>, delay: Duration) {
        let weak = Arc::downgrade(inner);
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                Self::drain(&inner);
            }
        });

        let mut slot = lock(&inner.drain_timer);
        if let Some(previous) = slot.replace(task) {
            previous.abort();
        }
    }

    fn cancel_drain_timer(inner: &Arc<Self>) {
        if let Some(task) = lock(&inner.drain_timer).take() {
            task.abort();
        }
    }

    /// Applies one drain cycle: snapshot the backlog, publish it to the
    /// buffer, then immediately reschedule if records arrived meanwhile.
    ///
    /// No failure here may stop future cycles; the follow-up is scheduled
    /// after the buffer mutation completes regardless of eviction.
    fn drain(inner: &Arc<Self>) {
        if inner.closed.load(Ordering::SeqCst) {
            return;
        }

        let batch = {
            let mut queue = lock(&inner.queue);
            queue.begin_drain()
        };
        let Some(batch) = batch else {
            // A drain is mid-application; it reschedules on finish
            return;
        };

        let landed = batch.len();
        if landed > 0 {
            let applied = {
                let mut buffer = lock(&inner.buffer);
                // Re-checked under the buffer lock; close() sets the flag
                // before it clears, so a stale batch never survives a close
                if inner.closed.load(Ordering::SeqCst) {
                    false
                } else {
                    let evicted = buffer.insert_batch(batch);
                    if evicted > 0 {
                        debug!(landed, evicted, "Drain applied with eviction");
                    } else {
                        debug!(landed, "Drain applied");
                    }
                    true
                }
            };
            if !applied {
                lock(&inner.queue).finish_drain();
                return;
            }
            lock(&inner.pages).invalidate();
        }

        let leftover = lock(&inner.queue).finish_drain();

        if landed > 0 {
            inner.bump_revision();
        }
        if leftover > 0 {
            // Records arrived during application; next cycle runs on the
            // next event-loop turn rather than waiting for a new enqueue
            Self::schedule_drain(inner, Duration::ZERO);
        }
    }

    fn on_status_change(inner: &Arc<Self>, status: ConnectionStatus) {
        let connected = inner.client.is_connected();
        inner.connection_ready.store(connected, Ordering::SeqCst);
        debug!(%status, connected, "Connection status observed");

        if status == ConnectionStatus::Connected && inner.subscriptions.live_count() == 0 {
            let weak = Arc::downgrade(inner);
            tokio::spawn(async move {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                let handler = Self::message_handler(&inner);
                let outcome = inner.subscriptions.subscribe_all(handler).await;
                if outcome.any_succeeded() {
                    info!(
                        topics = outcome.subscribed.len(),
                        "Re-subscribed after reconnect"
                    );
                } else {
                    warn!("Reconnect re-subscribe failed for every topic");
                }
                inner.bump_revision();
            });
        }

        inner.bump_revision();
    }

    fn bump_revision(&self) {
        self.revision.send_modify(|rev| *rev = rev.wrapping_add(1));
    }
}

#[async_trait]
impl MessageStreamApi for MessageStreamService {
    async fn subscribe_to_all_topics(&self) -> SubscribeOutcome {
        let handler = StreamInner::message_handler(&self.inner);
        let outcome = self.inner.subscriptions.subscribe_all(handler).await;
        self.inner.bump_revision();
        outcome
    }

    async fn unsubscribe_from_all_topics(&self) -> usize {
        let released = self.inner.subscriptions.unsubscribe_all().await;
        self.inner.bump_revision();
        released
    }

    fn toggle_pause(&self) -> bool {
        let paused = {
            let mut queue = lock(&self.inner.queue);
            let next = !queue.is_paused();
            queue.set_paused(next);
            next
        };

        if paused {
            // Stop watching: discard the timer along with the backlog
            StreamInner::cancel_drain_timer(&self.inner);
        }

        debug!(paused, "Ingestion pause toggled");
        self.inner.bump_revision();
        paused
    }

    fn clear_messages(&self) {
        lock(&self.inner.buffer).clear();
        lock(&self.inner.pages).reset();
        self.inner.bump_revision();
    }

    fn go_to_page(&self, n: usize) -> Result<(), StreamError> {
        let buffer_len = lock(&self.inner.buffer).len();
        lock(&self.inner.pages).go_to_page(n, buffer_len)?;
        self.inner.bump_revision();
        Ok(())
    }

    fn next_page(&self) -> Result<(), StreamError> {
        let buffer_len = lock(&self.inner.buffer).len();
        lock(&self.inner.pages).next_page(buffer_len)?;
        self.inner.bump_revision();
        Ok(())
    }

    fn prev_page(&self) -> Result<(), StreamError> {
        let buffer_len = lock(&self.inner.buffer).len();
        lock(&self.inner.pages).prev_page(buffer_len)?;
        self.inner.bump_revision();
        Ok(())
    }

    fn set_page_size(&self, page_size: usize) -> Result<(), StreamError> {
        lock(&self.inner.pages).set_page_size(page_size)?;
        self.inner.bump_revision();
        Ok(())
    }

    fn snapshot(&self) -> StreamSnapshot {
        let buffer = lock(&self.inner.buffer);
        let mut pages = lock(&self.inner.pages);
        let records = pages.page(&buffer);

        StreamSnapshot {
            records,
            current_page: pages.current_page(),
            total_pages: pages.total_pages(buffer.len()),
            page_size: pages.page_size(),
            buffered: buffer.len(),
            paused: lock(&self.inner.queue).is_paused(),
            subscribed: self.inner.subscriptions.is_subscribed(),
            connection_ready: self.inner.connection_ready.load(Ordering::SeqCst),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
