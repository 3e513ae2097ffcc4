//! Port traits: the boundary between the stream core and its collaborators.

pub mod inbound;
pub mod outbound;

pub use inbound::{MessageStreamApi, StreamSnapshot};
pub use outbound::{FixedTimeSource, SharedTimeSource, SystemTimeSource, TimeSource};
