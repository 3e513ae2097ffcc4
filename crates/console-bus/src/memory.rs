//! In-memory implementation of the bus client.
//!
//! Dispatches published messages synchronously to every registered handler
//! whose filter matches the topic. Suitable for tests and single-process
//! development; production deployments adapt the real broker connection
//! behind the same [`BusClient`] trait.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::client::{
    BusClient, BusError, ConnectionStatus, ListenerId, MessageHandler, StatusListener,
    SubscriptionHandle,
};
use crate::payload::Payload;
use crate::topic;

struct HandlerEntry {
    topic_filter: String,
    handler: MessageHandler,
}

/// In-memory message bus.
///
/// Starts connected. Tests drive connection transitions through
/// [`InMemoryBus::set_connected`].
pub struct InMemoryBus {
    /// Connection flag; flipped by `set_connected`.
    connected: AtomicBool,

    /// Live handlers keyed by subscription id.
    handlers: RwLock<HashMap<Uuid, HandlerEntry>>,

    /// Registered status listeners.
    listeners: RwLock<HashMap<Uuid, StatusListener>>,

    /// Total messages published.
    published: AtomicU64,
}

impl InMemoryBus {
    /// Creates a connected in-memory bus.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connected: AtomicBool::new(true),
            handlers: RwLock::new(HashMap::new()),
            listeners: RwLock::new(HashMap::new()),
            published: AtomicU64::new(0),
        }
    }

    /// Flips the connection flag and notifies status listeners.
    pub fn set_connected(&self, connected: bool) {
        let was = self.connected.swap(connected, Ordering::SeqCst);
        if was == connected {
            return;
        }

        let status = if connected {
            ConnectionStatus::Connected
        } else {
            ConnectionStatus::Disconnected
        };
        debug!(%status, "Bus connection status changed");
        self.notify_listeners(status);
    }

    /// Reports a transport error to status listeners without changing the
    /// connection flag.
    pub fn report_error(&self) {
        self.notify_listeners(ConnectionStatus::Error);
    }

    fn notify_listeners(&self, status: ConnectionStatus) {
        let listeners: Vec<StatusListener> = {
            let Ok(map) = self.listeners.read() else {
                return;
            };
            map.values().cloned().collect()
        };
        for listener in listeners {
            listener(status);
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.handlers.read().map(|m| m.len()).unwrap_or(0)
    }

    /// Total messages published through this bus.
    #[must_use]
    pub fn messages_published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}

impl Default for InMemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BusClient for InMemoryBus {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn subscribe(
        &self,
        topic_filter: &str,
        handler: MessageHandler,
    ) -> Result<SubscriptionHandle, BusError> {
        if !self.is_connected() {
            return Err(BusError::NotConnected);
        }
        topic::validate_filter(topic_filter)?;

        let handle = SubscriptionHandle::new(topic_filter);
        let mut handlers = self.handlers.write().map_err(|_| BusError::SubscribeFailed {
            topic: topic_filter.to_string(),
        })?;
        handlers.insert(
            handle.id,
            HandlerEntry {
                topic_filter: topic_filter.to_string(),
                handler,
            },
        );

        debug!(topic = topic_filter, id = %handle.id, "Subscription created");
        Ok(handle)
    }

    async fn unsubscribe(&self, handle: &SubscriptionHandle) -> Result<(), BusError> {
        let mut handlers = self
            .handlers
            .write()
            .map_err(|_| BusError::UnsubscribeFailed {
                topic: handle.topic_filter.clone(),
            })?;

        if handlers.remove(&handle.id).is_none() {
            return Err(BusError::UnsubscribeFailed {
                topic: handle.topic_filter.clone(),
            });
        }

        debug!(topic = %handle.topic_filter, id = %handle.id, "Subscription released");
        Ok(())
    }

    async fn publish(&self, topic: &str, payload: Payload) -> Result<usize, BusError> {
        if !self.is_connected() {
            return Err(BusError::NotConnected);
        }

        self.published.fetch_add(1, Ordering::Relaxed);

        let matching: Vec<MessageHandler> = {
            let Ok(handlers) = self.handlers.read() else {
                return Ok(0);
            };
            handlers
                .values()
                .filter(|entry| topic::matches(&entry.topic_filter, topic))
                .map(|entry| entry.handler.clone())
                .collect()
        };

        if matching.is_empty() {
            warn!(topic, "Message dropped (no matching subscriptions)");
            return Ok(0);
        }

        let delivered = matching.len();
        for handler in matching {
            handler(topic, payload.clone());
        }

        debug!(topic, delivered, "Message published");
        Ok(delivered)
    }

    fn on_status_change(&self, listener: StatusListener) -> ListenerId {
        let id = Uuid::new_v4();
        if let Ok(mut listeners) = self.listeners.write() {
            listeners.insert(id, listener);
        }
        ListenerId(id)
    }

    fn remove_status_listener(&self, id: ListenerId) {
        if let Ok(mut listeners) = self.listeners.write() {
            listeners.remove(&id.0);
        }
    }
}
