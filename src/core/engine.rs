//! # EventEngine: the public handle.
//!
//! [`EventEngine`] is what feature modules hold. It is a cheap `Clone` over
//! shared state: the topic registry, the sending half of the ingestion queue,
//! the lifecycle and the shutdown token.
//!
//! ## Contract
//! - `register_events` is idempotent; `subscribe`/`publish` on an unknown
//!   topic fail with [`EngineError::UnknownTopic`] and change nothing.
//! - `publish` waits while the queue is full; once shutdown begins it fails
//!   with [`EngineError::Closed`]. It never enqueues into a closed queue and
//!   never drops an event silently.
//! - Every event `publish` accepted is delivered to the topic's subscribers
//!   before their channels close.
//!
//! ## Example
//! ```rust
//! use eventvisor::{EngineConfig, Event, EventEngine, Subscriber, Topic};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), eventvisor::EngineError> {
//!     const ORDER_CREATED: Topic = Topic::from_static("order.created");
//!
//!     let engine = EventEngine::<String>::builder(EngineConfig::default()).build()?;
//!     engine.register_events([ORDER_CREATED]);
//!
//!     let (sub, mut rx) = Subscriber::channel("billing", 2);
//!     engine.subscribe(&ORDER_CREATED, sub)?;
//!
//!     engine.publish(Event::new(ORDER_CREATED, "A".to_string())).await?;
//!     engine.shutdown().await?;
//!
//!     assert_eq!(rx.recv().await.as_deref(), Some("A"));
//!     assert_eq!(rx.recv().await, None);
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::EngineError;
use crate::events::{Event, Subscriber, Topic};

use super::builder::EngineBuilder;
use super::config::EngineConfig;
use super::lifecycle::{EngineState, Lifecycle};
use super::registry::TopicRegistry;

pub(crate) struct Shared<P> {
    pub(crate) registry: Arc<TopicRegistry<P>>,
    pub(crate) lifecycle: Arc<Lifecycle>,
    pub(crate) queue: mpsc::Sender<Event<P>>,
    pub(crate) shutdown: CancellationToken,
    pub(crate) dispatcher: Mutex<Option<JoinHandle<()>>>,
}

/// In-process topic broadcaster.
pub struct EventEngine<P> {
    shared: Arc<Shared<P>>,
}

impl<P> Clone for EventEngine<P> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<P> EventEngine<P>
where
    P: Clone + Send + 'static,
{
    /// Starts building an engine with the given configuration.
    pub fn builder(cfg: EngineConfig) -> EngineBuilder<P> {
        EngineBuilder::new(cfg)
    }

    pub(crate) fn from_shared(shared: Shared<P>) -> Self {
        Self {
            shared: Arc::new(shared),
        }
    }

    /// Registers the topics a module will publish.
    ///
    /// Already registered topics are skipped; this is never an error.
    pub fn register_events<I, T>(&self, topics: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<Topic>,
    {
        self.shared
            .registry
            .register(topics.into_iter().map(Into::into));
    }

    /// Appends `subscriber` to the topic's delivery list.
    ///
    /// The subscriber stays bound to the topic for the engine's lifetime; its
    /// channel is closed when the engine stops.
    pub fn subscribe(&self, topic: &Topic, subscriber: Subscriber<P>) -> Result<(), EngineError> {
        self.shared.registry.subscribe(topic, subscriber)
    }

    /// Enqueues an event for delivery.
    ///
    /// Waits while the ingestion queue is full.
    ///
    /// # Errors
    /// - [`EngineError::UnknownTopic`] if the topic was never registered;
    /// - [`EngineError::Closed`] once shutdown has begun, including when the
    ///   queue is closed while this call is waiting for room.
    pub async fn publish(&self, event: Event<P>) -> Result<(), EngineError> {
        self.admit(&event.topic)?;
        self.shared
            .queue
            .send(event)
            .await
            .map_err(|mpsc::error::SendError(ev)| EngineError::Closed { topic: ev.topic })
    }

    /// Enqueues an event without waiting.
    ///
    /// # Errors
    /// As [`publish`](Self::publish), plus [`EngineError::QueueFull`] when the
    /// queue has no room right now.
    pub fn try_publish(&self, event: Event<P>) -> Result<(), EngineError> {
        self.admit(&event.topic)?;
        self.shared.queue.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(ev) => EngineError::QueueFull { topic: ev.topic },
            mpsc::error::TrySendError::Closed(ev) => EngineError::Closed { topic: ev.topic },
        })
    }

    fn admit(&self, topic: &Topic) -> Result<(), EngineError> {
        if !self.shared.registry.contains(topic) {
            return Err(EngineError::UnknownTopic {
                topic: topic.clone(),
            });
        }
        if !self.shared.lifecycle.state().is_accepting() {
            return Err(EngineError::Closed {
                topic: topic.clone(),
            });
        }
        Ok(())
    }

    /// Sorted list of registered topics.
    pub fn topics(&self) -> Vec<Topic> {
        self.shared.registry.topics()
    }

    /// Number of subscribers bound to `topic`, `None` if it is unregistered.
    pub fn subscriber_count(&self, topic: &Topic) -> Option<usize> {
        self.shared.registry.subscriber_count(topic)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        self.shared.lifecycle.state()
    }

    /// Token that triggers shutdown when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shared.shutdown.clone()
    }

    /// Resolves once the engine reaches [`EngineState::Stopped`].
    pub async fn stopped(&self) {
        self.shared.lifecycle.stopped().await;
    }

    /// Requests shutdown and waits until the queue is drained and every
    /// subscriber channel is closed.
    ///
    /// # Errors
    /// [`EngineError::DispatcherFailed`] if the dispatcher task ended abnormally.
    pub async fn shutdown(&self) -> Result<(), EngineError> {
        self.shared.shutdown.cancel();

        let handle = self.shared.dispatcher.lock().take();
        match handle {
            Some(h) => h.await.map_err(|e| EngineError::DispatcherFailed {
                reason: e.to_string(),
            }),
            None => {
                self.stopped().await;
                Ok(())
            }
        }
    }
}

/// Publishing seam for feature services.
///
/// Services that only announce facts depend on this trait rather than on the
/// whole engine.
#[async_trait]
pub trait Publish<P>: Send + Sync {
    /// See [`EventEngine::publish`].
    async fn publish(&self, event: Event<P>) -> Result<(), EngineError>;
}

#[async_trait]
impl<P> Publish<P> for EventEngine<P>
where
    P: Clone + Send + 'static,
{
    async fn publish(&self, event: Event<P>) -> Result<(), EngineError> {
        EventEngine::publish(self, event).await
    }
}
