//! Subscription lifecycle management.
//!
//! Maintains the 1:1 mapping of configured topics to live bus
//! subscriptions. All operations are idempotent and individually
//! recoverable: bulk subscribe tolerates per-topic failure, and a failed
//! unsubscribe retains the entry so the handle is never leaked.
//!
//! ## State machine
//!
//! ```text
//! Idle ──subscribe──▶ Subscribing ──▶ Subscribed (>=1 live)
//!                          │               │  ▲
//!                          │ all topics    │  │ subscribe
//!                          │ failed        ▼  │
//!                          └────────▶ Unsubscribed (0 live)
//!                                     (also: unsubscribe_all)
//! ```
//!
//! A handle that loses a subscribe race and cannot be released is parked
//! on a pending-release list and retried on the next release cycle.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use console_bus::{BusClient, MessageHandler, SubscriptionHandle};
use tracing::{debug, info, warn};

use crate::domain::StreamError;

/// Lifecycle state of the topic set as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    /// No subscribe attempt made yet.
    Idle,
    /// First subscribe attempt of the current cycle is in flight.
    Subscribing,
    /// At least one subscription is live.
    Subscribed,
    /// All subscriptions were released (or never established this cycle).
    Unsubscribed,
}

/// Per-topic results of a bulk subscribe.
#[derive(Debug, Clone, Default)]
pub struct SubscribeOutcome {
    /// Topics that subscribed successfully this call (or were already live).
    pub subscribed: Vec<String>,
    /// Topics that failed, with the reason.
    pub failed: Vec<(String, StreamError)>,
}

impl SubscribeOutcome {
    /// Overall success: at least one topic is live.
    #[must_use]
    pub fn any_succeeded(&self) -> bool {
        !self.subscribed.is_empty()
    }
}

/// Maps configured topics to live bus subscription handles.
///
/// INVARIANT: at most one live handle per topic; an entry is removed only
/// after the bus confirmed the release. Every handle the bus ever issued
/// is either live, parked in `orphaned`, or confirmed released.
pub struct SubscriptionManager<C: BusClient + ?Sized> {
    client: std::sync::Arc<C>,
    topics: Vec<String>,
    live: Mutex<HashMap<String, SubscriptionHandle>>,

    /// Handles that lost a subscribe race and failed to release; retried
    /// on the next release cycle.
    orphaned: Mutex<Vec<SubscriptionHandle>>,

    state: Mutex<SubscriptionState>,
}

impl<C: BusClient + ?Sized> SubscriptionManager<C> {
    /// Creates a manager for a configured topic set.
    #[must_use]
    pub fn new(client: std::sync::Arc<C>, topics: Vec<String>) -> Self {
        Self {
            client,
            topics,
            live: Mutex::new(HashMap::new()),
            orphaned: Mutex::new(Vec::new()),
            state: Mutex::new(SubscriptionState::Idle),
        }
    }

    /// The configured topic set.
    #[must_use]
    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn live_count(&self) -> usize {
        lock(&self.live).len()
    }

    /// Number of parked handles awaiting release.
    #[must_use]
    pub fn orphan_count(&self) -> usize {
        lock(&self.orphaned).len()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SubscriptionState {
        *lock(&self.state)
    }

    /// True when at least one subscription is live.
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.state() == SubscriptionState::Subscribed
    }

    /// Subscribes a single topic.
    ///
    /// Idempotent: an already-live topic returns its existing handle
    /// unchanged.
    ///
    /// # Errors
    ///
    /// - `NotConnected` when the bus is down; no state changes.
    /// - `SubscribeFailed` when the bus rejects the subscription.
    pub async fn subscribe(
        &self,
        topic: &str,
        handler: MessageHandler,
    ) -> Result<SubscriptionHandle, StreamError> {
        if let Some(existing) = lock(&self.live).get(topic) {
            debug!(topic, "Already subscribed, reusing handle");
            return Ok(existing.clone());
        }

        if !self.client.is_connected() {
            return Err(StreamError::NotConnected);
        }

        {
            let mut state = lock(&self.state);
            if matches!(
                *state,
                SubscriptionState::Idle | SubscriptionState::Unsubscribed
            ) {
                *state = SubscriptionState::Subscribing;
            }
        }

        let handle = self.client.subscribe(topic, handler).await?;

        let existing = match lock(&self.live).entry(topic.to_string()) {
            Entry::Occupied(entry) => Some(entry.get().clone()),
            Entry::Vacant(entry) => {
                entry.insert(handle.clone());
                None
            }
        };

        // A concurrent call won the race: keep its handle, release ours.
        // A failed release parks the handle; it is never silently dropped.
        if let Some(existing) = existing {
            if let Err(err) = self.client.unsubscribe(&handle).await {
                warn!(topic, %err, "Duplicate handle release failed, parked for retry");
                lock(&self.orphaned).push(handle);
            }
            return Ok(existing);
        }

        *lock(&self.state) = SubscriptionState::Subscribed;
        debug!(topic, "Subscription registered");
        Ok(handle)
    }

    /// Releases a single topic's subscription.
    ///
    /// A topic with no live handle succeeds trivially.
    ///
    /// # Errors
    ///
    /// `UnsubscribeFailed` if the bus could not release the handle; the
    /// entry is retained so the caller can retry.
    pub async fn unsubscribe(&self, topic: &str) -> Result<(), StreamError> {
        let Some(handle) = lock(&self.live).get(topic).cloned() else {
            return Ok(());
        };

        if let Err(err) = self.client.unsubscribe(&handle).await {
            warn!(topic, %err, "Unsubscribe failed, handle retained for retry");
            return Err(StreamError::UnsubscribeFailed {
                topic: topic.to_string(),
            });
        }

        let remaining = {
            let mut live = lock(&self.live);
            live.remove(topic);
            live.len()
        };
        if remaining == 0 {
            *lock(&self.state) = SubscriptionState::Unsubscribed;
        }
        debug!(topic, remaining, "Subscription released");
        Ok(())
    }

    /// Subscribes every configured topic independently.
    ///
    /// Partial failure is tolerated; per-topic results are reported in the
    /// outcome and overall success means at least one live topic.
    pub async fn subscribe_all(&self, handler: MessageHandler) -> SubscribeOutcome {
        let mut outcome = SubscribeOutcome::default();

        for topic in &self.topics {
            match self.subscribe(topic, handler.clone()).await {
                Ok(_) => outcome.subscribed.push(topic.clone()),
                Err(err) => {
                    warn!(topic, %err, "Topic subscription failed");
                    outcome.failed.push((topic.clone(), err));
                }
            }
        }

        // Total failure with nothing live settles the cycle instead of
        // staying in Subscribing
        if outcome.subscribed.is_empty() && self.live_count() == 0 {
            let mut state = lock(&self.state);
            if *state == SubscriptionState::Subscribing {
                *state = SubscriptionState::Unsubscribed;
            }
        }

        info!(
            subscribed = outcome.subscribed.len(),
            failed = outcome.failed.len(),
            "Bulk subscribe finished"
        );
        outcome
    }

    /// Releases every live subscription plus any parked duplicate handles,
    /// best-effort.
    ///
    /// Individual failures are skipped (those entries stay for retry);
    /// returns the number of handles actually released.
    pub async fn unsubscribe_all(&self) -> usize {
        let topics: Vec<String> = lock(&self.live).keys().cloned().collect();
        let mut released = 0;

        for topic in topics {
            if self.unsubscribe(&topic).await.is_ok() {
                released += 1;
            }
        }
        released += self.release_orphans().await;

        info!(released, remaining = self.live_count(), "Bulk unsubscribe finished");
        released
    }

    /// Retries the parked handles; failures are parked again.
    async fn release_orphans(&self) -> usize {
        let orphans = std::mem::take(&mut *lock(&self.orphaned));
        if orphans.is_empty() {
            return 0;
        }

        let mut released = 0;
        let mut retained = Vec::new();
        for handle in orphans {
            match self.client.unsubscribe(&handle).await {
                Ok(()) => released += 1,
                Err(err) => {
                    warn!(topic = %handle.topic_filter, %err, "Orphan release failed, parked again");
                    retained.push(handle);
                }
            }
        }
        if !retained.is_empty() {
            lock(&self.orphaned).append(&mut retained);
        }
        released
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
