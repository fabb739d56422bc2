//! # Events and subscribers.
//!
//! An [`Event`] pairs a [`Topic`] with a payload. The payload type is chosen by
//! the application; it is expected to be a closed enum so listeners can match
//! on the variant instead of inspecting types at runtime (see
//! [`StoreEvent`](crate::StoreEvent)).
//!
//! A [`Subscriber`] is a named delivery address: the sending half of a bounded
//! `mpsc` channel whose receiving half is owned by the subscribing module.
//!
//! ## Example
//! ```rust
//! use eventvisor::{Event, Subscriber, Topic};
//!
//! let ev = Event::new(Topic::from_static("order.created"), "A");
//! assert_eq!(ev.topic.as_str(), "order.created");
//!
//! let (sub, _rx) = Subscriber::<&str>::channel("billing", 2);
//! assert_eq!(sub.name(), "billing");
//! assert!(!sub.is_dangling());
//! ```

use std::borrow::Cow;
use std::fmt;

use tokio::sync::mpsc;

use super::topic::Topic;

/// Payloads that know which topic they belong to.
///
/// Implementing this lets callers publish a payload directly with
/// `Event::from(payload)`.
pub trait Routed {
    /// Topic this payload is published on.
    fn topic(&self) -> Topic;
}

/// A published fact: the topic it belongs to plus its payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event<P> {
    /// Topic the event is published on.
    pub topic: Topic,
    /// Topic-specific payload delivered to every subscriber.
    pub payload: P,
}

impl<P> Event<P> {
    /// Creates an event for an explicit topic.
    pub fn new(topic: impl Into<Topic>, payload: P) -> Self {
        Self {
            topic: topic.into(),
            payload,
        }
    }
}

impl<P: Routed> From<P> for Event<P> {
    fn from(payload: P) -> Self {
        Self {
            topic: payload.topic(),
            payload,
        }
    }
}

/// Named delivery address registered against a topic.
///
/// The name is diagnostic only. The address is the sending half of the
/// subscriber's own channel; the engine keeps it until final shutdown and then
/// drops it, which closes the channel once every topic entry sharing it is gone.
///
/// A subscriber without an address is *dangling*: it is a wiring mistake that
/// the broadcaster logs and skips.
pub struct Subscriber<P> {
    name: Cow<'static, str>,
    address: Option<mpsc::Sender<P>>,
}

impl<P> Subscriber<P> {
    /// Wraps an existing sender.
    ///
    /// The channel only closes at shutdown if the caller does not keep other
    /// clones of `address` alive.
    pub fn new(name: impl Into<Cow<'static, str>>, address: mpsc::Sender<P>) -> Self {
        Self {
            name: name.into(),
            address: Some(address),
        }
    }

    /// Creates a subscriber together with the receiving half of its channel.
    ///
    /// `capacity` is clamped to a minimum of 1.
    pub fn channel(
        name: impl Into<Cow<'static, str>>,
        capacity: usize,
    ) -> (Self, mpsc::Receiver<P>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(name, tx), rx)
    }

    /// Creates a subscriber with no delivery address.
    pub fn dangling(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            address: None,
        }
    }

    /// Diagnostic name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Delivery address, if any.
    pub fn address(&self) -> Option<&mpsc::Sender<P>> {
        self.address.as_ref()
    }

    /// True if the subscriber has no delivery address.
    pub fn is_dangling(&self) -> bool {
        self.address.is_none()
    }
}

// Manual impl: `mpsc::Sender<P>` is `Clone` for any `P`.
impl<P> Clone for Subscriber<P> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            address: self.address.clone(),
        }
    }
}

impl<P> fmt::Debug for Subscriber<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("name", &self.name)
            .field("dangling", &self.is_dangling())
            .finish()
    }
}
