//! # Core listener trait
//!
//! `Listen` is the extension point for modules that react to events. Each
//! listener gets one bounded address channel, subscribed to every topic it
//! names, and one worker task that drains it (see
//! [`ListenerSet`](crate::ListenerSet)).
//!
//! ## Contract
//! - `on_event` runs on the listener's own worker, one payload at a time, in
//!   the order the engine delivered them.
//! - A slow listener fills its channel and then throttles the engine's
//!   delivery for the topics it subscribes to; nothing is dropped.
//! - The worker ends once the engine closes the channel at shutdown and the
//!   buffered payloads have been handled.
//!
//! ## Example (skeleton)
//! ```rust
//! use async_trait::async_trait;
//! use eventvisor::{Listen, StoreEvent, Topic, topics};
//!
//! struct Audit;
//!
//! #[async_trait]
//! impl Listen<StoreEvent> for Audit {
//!     async fn on_event(&self, payload: StoreEvent) {
//!         let _ = payload; // write audit record...
//!     }
//!     fn name(&self) -> &'static str { "audit" }
//!     fn topics(&self) -> Vec<Topic> { vec![topics::PRODUCT_DELETED] }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Topic;

/// Contract for event listeners.
///
/// Implementations should avoid blocking the async runtime (prefer async I/O
/// and cooperative waits).
#[async_trait]
pub trait Listen<P>: Send + Sync + 'static {
    /// Handle a single delivered payload.
    async fn on_event(&self, payload: P);

    /// Human-readable name (subscriber name in the registry and in logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Topics this listener subscribes to.
    fn topics(&self) -> Vec<Topic>;

    /// Topics this listener's module publishes; registered before any
    /// listener subscribes.
    fn publishes(&self) -> Vec<Topic> {
        Vec::new()
    }

    /// Capacity of this listener's address channel.
    fn queue_capacity(&self) -> usize {
        10
    }
}
