//! Service layer: async orchestration over the domain types.

pub mod stream;
pub mod subscriptions;

pub use stream::MessageStreamService;
pub use subscriptions::{SubscribeOutcome, SubscriptionManager, SubscriptionState};
