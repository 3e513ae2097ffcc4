//! Bus client trait and associated types.
//!
//! The broker connection is owned outside the console; implementations of
//! [`BusClient`] adapt whatever transport the deployment uses (WebSocket
//! gateway, MQTT bridge, or the in-memory bus for tests).

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::payload::Payload;

/// Errors from bus client operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    /// The bus is not connected.
    #[error("bus is not connected")]
    NotConnected,

    /// Subscribing to a topic failed.
    #[error("subscribe failed for topic '{topic}'")]
    SubscribeFailed {
        /// The topic filter that could not be subscribed.
        topic: String,
    },

    /// Releasing a subscription failed; the handle is still live.
    #[error("unsubscribe failed for topic '{topic}'")]
    UnsubscribeFailed {
        /// The topic filter the handle was registered under.
        topic: String,
    },

    /// A topic filter was syntactically invalid.
    #[error("invalid topic filter '{filter}'")]
    InvalidTopicFilter {
        /// The rejected filter.
        filter: String,
    },
}

/// Connection state reported through status listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// The bus is connected and subscriptions can be established.
    Connected,
    /// The bus is down; subscribe attempts fail with `NotConnected`.
    Disconnected,
    /// The bus reported a transport error.
    Error,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected => write!(f, "connected"),
            Self::Disconnected => write!(f, "disconnected"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Per-message callback. Receives the concrete topic the message arrived on
/// (post-wildcard-expansion) and the raw payload.
pub type MessageHandler = Arc<dyn Fn(&str, Payload) + Send + Sync>;

/// Callback invoked on connection status transitions.
pub type StatusListener = Arc<dyn Fn(ConnectionStatus) + Send + Sync>;

/// Identifier for a registered status listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub Uuid);

/// Opaque handle for a live topic subscription.
///
/// Handles are cloneable tokens; releasing one goes through
/// [`BusClient::unsubscribe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionHandle {
    /// Unique identifier for this subscription.
    pub id: Uuid,
    /// Topic filter this subscription covers.
    pub topic_filter: String,
}

impl SubscriptionHandle {
    /// Creates a new handle for a topic filter.
    #[must_use]
    pub fn new(topic_filter: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            topic_filter: topic_filter.into(),
        }
    }
}

/// Client interface to the externally-owned message bus.
#[async_trait]
pub trait BusClient: Send + Sync {
    /// Whether the bus connection is currently up.
    fn is_connected(&self) -> bool;

    /// Subscribes `handler` to messages matching `topic_filter`.
    ///
    /// # Errors
    ///
    /// - `NotConnected` if the bus is down
    /// - `InvalidTopicFilter` if the filter is malformed
    /// - `SubscribeFailed` if the broker rejected the subscription
    async fn subscribe(
        &self,
        topic_filter: &str,
        handler: MessageHandler,
    ) -> Result<SubscriptionHandle, BusError>;

    /// Releases a subscription.
    ///
    /// # Errors
    ///
    /// `UnsubscribeFailed` if the broker could not release the handle; the
    /// subscription must then be treated as still live.
    async fn unsubscribe(&self, handle: &SubscriptionHandle) -> Result<(), BusError>;

    /// Publishes a payload to a concrete topic.
    ///
    /// Returns the number of local handlers the message was delivered to.
    ///
    /// # Errors
    ///
    /// `NotConnected` if the bus is down.
    async fn publish(&self, topic: &str, payload: Payload) -> Result<usize, BusError>;

    /// Registers a listener for connection status transitions.
    fn on_status_change(&self, listener: StatusListener) -> ListenerId;

    /// Removes a previously registered status listener.
    fn remove_status_listener(&self, id: ListenerId);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        assert_eq!(ConnectionStatus::Connected.to_string(), "connected");
        assert_eq!(ConnectionStatus::Disconnected.to_string(), "disconnected");
        assert_eq!(ConnectionStatus::Error.to_string(), "error");
    }

    #[test]
    fn test_subscription_handle_is_unique() {
        let a = SubscriptionHandle::new("fleet/#");
        let b = SubscriptionHandle::new("fleet/#");
        assert_eq!(a.topic_filter, b.topic_filter);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_error_display() {
        let err = BusError::SubscribeFailed {
            topic: "fleet/#".to_string(),
        };
        assert!(err.to_string().contains("fleet/#"));
    }
}
