//! # Dispatcher: the single consumer of the ingestion queue.
//!
//! ```text
//! loop (Running) {
//!   select! (biased) {
//!     shutdown.cancelled()     ─► break
//!     helpers.join_next()      ─► reap finished fan-out helper
//!     queue.recv() = Some(ev)  ─► broadcaster.broadcast(ev)   (may block: backpressure)
//!     queue.recv() = None      ─► break   (every engine handle dropped)
//!   }
//! }
//! drain:
//!   Draining            ─► await helpers ─► close queue ─► broadcast leftovers ─► await helpers
//!   ClosingSubscribers  ─► registry.close_all()
//!   Stopped
//! ```
//!
//! ## Rules
//! - Events are taken from the queue strictly in FIFO order by this task only.
//! - Every event that entered the queue is broadcast, including those still
//!   queued when shutdown is observed.
//! - Subscriber channels are closed only after the last helper has returned.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, trace};

use crate::events::Event;

use super::broadcaster::{Broadcaster, Delivery};
use super::lifecycle::{EngineState, Lifecycle};
use super::registry::TopicRegistry;

/// Owns the receiving half of the ingestion queue and the fan-out helpers.
pub(crate) struct Dispatcher<P> {
    queue: mpsc::Receiver<Event<P>>,
    broadcaster: Broadcaster<P>,
    registry: Arc<TopicRegistry<P>>,
    lifecycle: Arc<Lifecycle>,
    shutdown: CancellationToken,
    helpers: JoinSet<Delivery>,
}

impl<P> Dispatcher<P>
where
    P: Clone + Send + 'static,
{
    pub(crate) fn new(
        queue: mpsc::Receiver<Event<P>>,
        registry: Arc<TopicRegistry<P>>,
        lifecycle: Arc<Lifecycle>,
        shutdown: CancellationToken,
        partition_threshold: usize,
    ) -> Self {
        Self {
            queue,
            broadcaster: Broadcaster::new(Arc::clone(&registry), partition_threshold),
            registry,
            lifecycle,
            shutdown,
            helpers: JoinSet::new(),
        }
    }

    /// Services the queue until shutdown, then drains and closes subscribers.
    pub(crate) async fn run(mut self) {
        info!("event engine is listening");

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    info!("shutdown requested");
                    break;
                }
                Some(joined) = self.helpers.join_next(), if !self.helpers.is_empty() => {
                    reap(joined);
                }
                msg = self.queue.recv() => match msg {
                    Some(ev) => self.dispatch(ev).await,
                    None => {
                        info!("every engine handle dropped; shutting down");
                        break;
                    }
                },
            }
        }

        self.drain().await;
    }

    async fn dispatch(&mut self, ev: Event<P>) {
        let topic = ev.topic.clone();
        let out = self.broadcaster.broadcast(ev, &mut self.helpers).await;
        trace!(
            topic = %topic,
            delivered = out.delivered,
            skipped = out.skipped,
            "event dispatched"
        );
    }

    async fn drain(mut self) {
        self.lifecycle.advance(EngineState::Draining);

        self.await_helpers().await;
        self.queue.close();
        info!("ingestion queue closed; draining");

        let mut drained = 0usize;
        while let Some(ev) = self.queue.recv().await {
            self.dispatch(ev).await;
            drained += 1;
        }
        self.await_helpers().await;
        info!(drained, "ingestion queue drained");

        self.lifecycle.advance(EngineState::ClosingSubscribers);
        let closed = self.registry.close_all();
        info!(closed, "subscriber channels closed");

        self.lifecycle.advance(EngineState::Stopped);
    }

    async fn await_helpers(&mut self) {
        while let Some(joined) = self.helpers.join_next().await {
            reap(joined);
        }
    }
}

fn reap(joined: Result<Delivery, JoinError>) {
    match joined {
        Ok(out) => trace!(
            delivered = out.delivered,
            skipped = out.skipped,
            "fan-out helper finished"
        ),
        Err(e) if e.is_panic() => error!(error = %e, "fan-out helper panicked"),
        Err(e) => error!(error = %e, "fan-out helper cancelled"),
    }
}
