//! # Console Bus - Message Bus Boundary for the Fleet Console
//!
//! The console never owns the broker connection; it only consumes a client
//! handle for topic subscribe/unsubscribe/publish. This crate defines that
//! boundary as the [`BusClient`] trait plus an in-memory implementation used
//! by tests and local development.
//!
//! ## Boundary
//!
//! ```text
//! ┌──────────────┐                        ┌──────────────────┐
//! │ Broker /     │   subscribe(topic)     │ console-stream   │
//! │ gateway      │ ◀───────────────────── │ (ingestion core) │
//! │ (external)   │   handler(topic, msg)  │                  │
//! └──────────────┘ ─────────────────────▶ └──────────────────┘
//! ```
//!
//! ## Rules
//!
//! - The client is an **injected dependency**: the core receives it at
//!   construction and never reaches for a global singleton.
//! - Handlers receive the concrete topic a message arrived on, after
//!   wildcard expansion.
//! - Connection lifecycle is owned outside this crate; consumers only
//!   register/deregister status listeners.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod client;
pub mod memory;
pub mod payload;
pub mod topic;

// Re-export main types
pub use client::{
    BusClient, BusError, ConnectionStatus, ListenerId, MessageHandler, StatusListener,
    SubscriptionHandle,
};
pub use memory::InMemoryBus;
pub use payload::Payload;

/// Catch-all topic filter used when no topics are configured.
pub const CATCH_ALL_TOPIC: &str = "#";

/// Topic level separator.
pub const TOPIC_SEPARATOR: char = '/';
