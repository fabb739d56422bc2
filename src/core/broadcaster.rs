//! # Broadcaster: per-topic fan-out with an optional split.
//!
//! For a topic with `n` subscribers the partition size is `n / 2 + 1`.
//!
//! ```text
//! partition < threshold:                 partition >= threshold:
//!   dispatcher ─► S1 ─► S2 ─► ... ─► Sn    helper (JoinSet) ─► S1 ─► ... ─► Sp
//!   (registration order, awaits each)      dispatcher       ─► Sp+1 ─► ... ─► Sn
//!                                          (both halves run concurrently)
//! ```
//!
//! ## Rules
//! - Each send awaits channel capacity: a full subscriber buffer stalls the
//!   sender instead of dropping the payload.
//! - Order is kept within each partition; nothing is promised across the two
//!   partitions of a split topic.
//! - Helpers are spawned into the dispatcher's [`JoinSet`], which is awaited
//!   before the queue is closed and again before subscriber channels close.
//! - A dangling subscriber (no address) or one whose receiver is gone is
//!   logged and skipped; delivery to the rest continues.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, trace, warn};

use crate::events::{Event, Subscriber, Topic};

use super::registry::TopicRegistry;

/// Outcome of handing one payload to a list of subscribers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Delivery {
    /// Subscribers whose channel accepted the payload.
    pub delivered: usize,
    /// Dangling subscribers and subscribers whose listener went away.
    pub skipped: usize,
}

/// Fan-out of a single event to its topic's subscribers.
pub(crate) struct Broadcaster<P> {
    registry: Arc<TopicRegistry<P>>,
    partition_threshold: usize,
}

impl<P> Broadcaster<P>
where
    P: Clone + Send + 'static,
{
    pub(crate) fn new(registry: Arc<TopicRegistry<P>>, partition_threshold: usize) -> Self {
        Self {
            registry,
            partition_threshold,
        }
    }

    /// Partition size for `n` subscribers.
    #[inline]
    pub(crate) fn partition_size(n: usize) -> usize {
        n / 2 + 1
    }

    /// Delivers `event` to every current subscriber of its topic.
    ///
    /// Returns what was delivered inline; the helper half of a split topic
    /// reports through its own task.
    pub(crate) async fn broadcast(&self, event: Event<P>, helpers: &mut JoinSet<Delivery>) -> Delivery {
        let Event { topic, payload } = event;
        let Some(subs) = self.registry.snapshot(&topic) else {
            warn!(topic = %topic, "broadcast for unregistered topic; event dropped");
            return Delivery::default();
        };
        if subs.is_empty() {
            trace!(topic = %topic, "no subscribers");
            return Delivery::default();
        }

        let partition = Self::partition_size(subs.len());
        if partition < self.partition_threshold {
            return deliver(&topic, &subs, payload).await;
        }

        debug!(
            topic = %topic,
            subscribers = subs.len(),
            partition,
            "splitting fan-out across helper"
        );
        {
            let topic = topic.clone();
            let subs = Arc::clone(&subs);
            let payload = payload.clone();
            helpers.spawn(async move { deliver(&topic, &subs[..partition], payload).await });
        }
        deliver(&topic, &subs[partition..], payload).await
    }
}

/// Sends a clone of `payload` to each subscriber in order.
async fn deliver<P: Clone>(topic: &Topic, subs: &[Subscriber<P>], payload: P) -> Delivery {
    let mut out = Delivery::default();
    for sub in subs {
        let Some(address) = sub.address() else {
            warn!(
                topic = %topic,
                subscriber = sub.name(),
                "subscriber has no address; check its wiring"
            );
            out.skipped += 1;
            continue;
        };
        match address.send(payload.clone()).await {
            Ok(()) => out.delivered += 1,
            Err(_) => {
                warn!(
                    topic = %topic,
                    subscriber = sub.name(),
                    "subscriber listener is gone; payload dropped for it"
                );
                out.skipped += 1;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::sync::mpsc;

    use super::*;

    fn topic() -> Topic {
        Topic::from_static("order.created")
    }

    fn setup(n: usize, cap: usize) -> (Broadcaster<u32>, Vec<mpsc::Receiver<u32>>) {
        let reg = Arc::new(TopicRegistry::new());
        reg.register([topic()]);
        let mut rxs = Vec::new();
        for i in 0..n {
            let (s, rx) = Subscriber::channel(format!("s{i}"), cap);
            reg.subscribe(&topic(), s).unwrap();
            rxs.push(rx);
        }
        (Broadcaster::new(reg, 4), rxs)
    }

    #[test]
    fn test_partition_size() {
        assert_eq!(Broadcaster::<u32>::partition_size(0), 1);
        assert_eq!(Broadcaster::<u32>::partition_size(5), 3);
        assert_eq!(Broadcaster::<u32>::partition_size(6), 4);
        assert_eq!(Broadcaster::<u32>::partition_size(9), 5);
    }

    #[tokio::test]
    async fn test_narrow_topic_is_delivered_inline() {
        let (b, mut rxs) = setup(5, 1);
        let mut helpers = JoinSet::new();

        let out = b.broadcast(Event::new(topic(), 7), &mut helpers).await;
        assert_eq!(out.delivered, 5);
        assert!(helpers.is_empty());
        for rx in &mut rxs {
            assert_eq!(rx.try_recv().unwrap(), 7);
        }
    }

    #[tokio::test]
    async fn test_wide_topic_splits_into_helper() {
        let (b, mut rxs) = setup(8, 1);
        let mut helpers = JoinSet::new();

        let inline = b.broadcast(Event::new(topic(), 1), &mut helpers).await;
        assert_eq!(inline.delivered, 3);
        assert_eq!(helpers.len(), 1);

        let helper = helpers.join_next().await.unwrap().unwrap();
        assert_eq!(helper.delivered, 5);
        for rx in &mut rxs {
            assert_eq!(rx.try_recv().unwrap(), 1);
        }
    }

    #[tokio::test]
    async fn test_dangling_and_gone_subscribers_are_skipped() {
        let reg = Arc::new(TopicRegistry::new());
        reg.register([topic()]);
        let (first, mut rx1) = Subscriber::channel("first", 1);
        let (gone, rx_gone) = Subscriber::channel("gone", 1);
        drop(rx_gone);
        let (last, mut rx3) = Subscriber::channel("last", 1);
        reg.subscribe(&topic(), first).unwrap();
        reg.subscribe(&topic(), Subscriber::dangling("unwired")).unwrap();
        reg.subscribe(&topic(), gone).unwrap();
        reg.subscribe(&topic(), last).unwrap();

        let b = Broadcaster::new(reg, 4);
        let mut helpers = JoinSet::new();
        let out = b.broadcast(Event::new(topic(), 9u32), &mut helpers).await;

        assert_eq!(
            out,
            Delivery {
                delivered: 2,
                skipped: 2
            }
        );
        assert_eq!(rx1.try_recv().unwrap(), 9);
        assert_eq!(rx3.try_recv().unwrap(), 9);
    }

    #[tokio::test]
    async fn test_full_subscriber_applies_backpressure() {
        let (b, mut rxs) = setup(1, 1);
        let mut helpers = JoinSet::new();
        b.broadcast(Event::new(topic(), 1), &mut helpers).await;

        let blocked = tokio::time::timeout(
            Duration::from_millis(50),
            b.broadcast(Event::new(topic(), 2), &mut helpers),
        )
        .await;
        assert!(blocked.is_err(), "second send must wait for capacity");

        assert_eq!(rxs[0].try_recv().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_zero_subscribers_is_a_no_op() {
        let (b, _rxs) = setup(0, 1);
        let mut helpers = JoinSet::new();
        let out = b.broadcast(Event::new(topic(), 1), &mut helpers).await;
        assert_eq!(out, Delivery::default());
    }
}
