//! Application-facing notifications.

pub mod publisher;

pub use publisher::{Event, EventPublisher, SubscriptionId};
