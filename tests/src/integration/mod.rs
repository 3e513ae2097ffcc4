//! Integration flows.

pub mod reconnect;
pub mod stream_flow;
