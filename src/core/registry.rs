//! # Topic registry - topic name to ordered subscriber list.
//!
//! ## Architecture
//! ```text
//! register_events(topics) ──► entry(topic).or_default()        (idempotent)
//! subscribe(topic, sub)   ──► entries[topic] = [..old, sub]    (copy-on-write)
//! snapshot(topic)         ──► Arc<[Subscriber]>                (dispatcher reads)
//! close_all()             ──► drop every Subscriber            (final shutdown)
//! ```
//!
//! ## Rules
//! - All access goes through one `RwLock`; the lock is never held across an `.await`.
//! - Subscriber lists are immutable `Arc` slices: a snapshot taken by the
//!   dispatcher stays valid while `subscribe` installs a new list.
//! - Insertion order is delivery order on the synchronous fan-out path.
//! - Nothing is removed at runtime; `close_all` runs once, after the drain.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::error::EngineError;
use crate::events::{Subscriber, Topic};

type SubscriberList<P> = Arc<[Subscriber<P>]>;

struct Entries<P> {
    topics: HashMap<Topic, SubscriberList<P>>,
    closed: bool,
}

/// Lock-guarded mapping from topic to its ordered subscribers.
pub(crate) struct TopicRegistry<P> {
    inner: RwLock<Entries<P>>,
}

impl<P> TopicRegistry<P> {
    /// Creates an empty registry.
    pub(crate) fn new() -> Self {
        Self {
            inner: RwLock::new(Entries {
                topics: HashMap::new(),
                closed: false,
            }),
        }
    }

    /// Registers topics; already known topics are left as they are.
    pub(crate) fn register<I>(&self, topics: I)
    where
        I: IntoIterator<Item = Topic>,
    {
        let mut g = self.inner.write();
        if g.closed {
            warn!("registry is closed; ignoring topic registration");
            return;
        }
        for topic in topics {
            if g.topics.contains_key(&topic) {
                debug!(topic = %topic, "topic already registered");
                continue;
            }
            info!(topic = %topic, "registering topic");
            g.topics.insert(topic, Arc::from(Vec::new()));
        }
    }

    /// Appends `subscriber` to the topic's list.
    ///
    /// Fails without touching the registry if the topic is unknown or the
    /// subscriber channels were already closed.
    pub(crate) fn subscribe(&self, topic: &Topic, subscriber: Subscriber<P>) -> Result<(), EngineError> {
        let mut g = self.inner.write();
        if g.closed {
            return Err(EngineError::Closed {
                topic: topic.clone(),
            });
        }
        let Some(list) = g.topics.get_mut(topic) else {
            return Err(EngineError::UnknownTopic {
                topic: topic.clone(),
            });
        };

        debug!(topic = %topic, subscriber = subscriber.name(), "subscribing");
        let mut next = Vec::with_capacity(list.len() + 1);
        next.extend(list.iter().cloned());
        next.push(subscriber);
        *list = Arc::from(next);
        Ok(())
    }

    /// True if the topic was registered.
    pub(crate) fn contains(&self, topic: &Topic) -> bool {
        self.inner.read().topics.contains_key(topic)
    }

    /// Current subscribers of `topic`, in registration order.
    pub(crate) fn snapshot(&self, topic: &Topic) -> Option<SubscriberList<P>> {
        self.inner.read().topics.get(topic).cloned()
    }

    /// Number of subscribers of `topic` (`None` if unregistered).
    pub(crate) fn subscriber_count(&self, topic: &Topic) -> Option<usize> {
        self.inner.read().topics.get(topic).map(|l| l.len())
    }

    /// Sorted list of registered topics.
    pub(crate) fn topics(&self) -> Vec<Topic> {
        let mut names: Vec<Topic> = self.inner.read().topics.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Drops every subscriber address, closing their channels.
    ///
    /// Topics stay registered so that later calls fail with `Closed` rather
    /// than `UnknownTopic`. Returns the number of subscriber entries released;
    /// a second call releases nothing.
    pub(crate) fn close_all(&self) -> usize {
        let lists: Vec<SubscriberList<P>> = {
            let mut g = self.inner.write();
            if g.closed {
                return 0;
            }
            g.closed = true;
            g.topics
                .values_mut()
                .map(|l| std::mem::replace(l, Arc::from(Vec::new())))
                .collect()
        };
        // Senders are dropped here, outside the lock.
        lists.iter().map(|l| l.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc::error::TryRecvError;

    use super::*;

    fn topic() -> Topic {
        Topic::from_static("order.created")
    }

    #[test]
    fn test_register_is_idempotent() {
        let reg = TopicRegistry::<u32>::new();
        reg.register([topic()]);
        let (s, _rx) = Subscriber::channel("s1", 1);
        reg.subscribe(&topic(), s).unwrap();

        reg.register([topic(), topic()]);
        assert_eq!(reg.topics(), vec![topic()]);
        assert_eq!(reg.subscriber_count(&topic()), Some(1));
    }

    #[test]
    fn test_unknown_topic_leaves_registry_untouched() {
        let reg = TopicRegistry::<u32>::new();
        let (s, _rx) = Subscriber::channel("s1", 1);
        let err = reg
            .subscribe(&Topic::from_static("no.such.topic"), s)
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownTopic { .. }));
        assert!(reg.topics().is_empty());
    }

    #[test]
    fn test_subscribers_kept_in_registration_order() {
        let reg = TopicRegistry::<u32>::new();
        reg.register([topic()]);
        for name in ["a", "b", "c"] {
            let (s, _rx) = Subscriber::channel(name, 1);
            reg.subscribe(&topic(), s).unwrap();
        }
        let snap = reg.snapshot(&topic()).unwrap();
        let names: Vec<&str> = snap.iter().map(|s| s.name()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn test_snapshot_is_stable_across_subscribe() {
        let reg = TopicRegistry::<u32>::new();
        reg.register([topic()]);
        let before = reg.snapshot(&topic()).unwrap();
        let (s, _rx) = Subscriber::channel("late", 1);
        reg.subscribe(&topic(), s).unwrap();
        assert_eq!(before.len(), 0);
        assert_eq!(reg.subscriber_count(&topic()), Some(1));
    }

    #[test]
    fn test_close_all_closes_channels_once() {
        let reg = TopicRegistry::<u32>::new();
        reg.register([topic(), Topic::from_static("order.paid")]);
        let (s, mut rx) = Subscriber::channel("shared", 1);
        reg.subscribe(&topic(), s.clone()).unwrap();
        reg.subscribe(&Topic::from_static("order.paid"), s).unwrap();

        assert_eq!(reg.close_all(), 2);
        assert_eq!(reg.close_all(), 0);
        assert_eq!(rx.try_recv(), Err(TryRecvError::Disconnected));

        let (late, _rx) = Subscriber::channel("late", 1);
        let err = reg.subscribe(&topic(), late).unwrap_err();
        assert!(matches!(err, EngineError::Closed { .. }));
    }
}
