//! Event data model: topics, events, subscribers and the storefront payloads.
//!
//! ## Contents
//! - [`Topic`] unique event-stream name
//! - [`Event`], [`Routed`] topic + payload, and payloads that route themselves
//! - [`Subscriber`] named delivery address (sending half of a bounded channel)
//! - [`StoreEvent`], [`ProductPayload`], [`topics`] the storefront event family
//!
//! ## Quick reference
//! - **Publishers**: `ProductService`, `InventoryListener` (via [`EventEngine`](crate::EventEngine)).
//! - **Consumers**: listener workers spawned by [`ListenerSet`](crate::ListenerSet).

mod event;
mod store;
mod topic;

pub use event::{Event, Routed, Subscriber};
pub use store::{ProductPayload, StoreEvent, topics};
pub use topic::Topic;
