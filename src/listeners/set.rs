//! # ListenerSet: one address channel and one worker per listener
//!
//! ## Wiring
//! ```text
//! spawn(engine, listeners)
//!   1. engine.register_events(l.publishes())          for every listener
//!   2. (sub, rx) = Subscriber::channel(l.name(), cap)  per listener
//!      engine.subscribe(topic, sub.clone())           for every l.topics()
//!   3. worker: while let Some(p) = rx.recv() { l.on_event(p) }
//!
//! engine shutdown ─► registry drops senders ─► rx.recv() == None ─► worker exits
//! ```
//!
//! ## What it guarantees
//! - Per-listener FIFO (channel order).
//! - Panics inside `on_event` are caught and logged; the worker keeps going.
//! - Registration happens before any subscription, so listeners may subscribe
//!   to each other's topics regardless of the order they are passed in.

use std::sync::Arc;

use futures::FutureExt;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::core::EventEngine;
use crate::error::EngineError;
use crate::events::Subscriber;

use super::Listen;

/// Running listener workers.
pub struct ListenerSet {
    workers: Vec<(&'static str, JoinHandle<()>)>,
}

impl ListenerSet {
    /// Registers, subscribes and spawns a worker for every listener.
    ///
    /// # Errors
    /// The first subscription failure. Workers are only spawned once every
    /// subscription succeeded; channels created so far are simply dropped.
    pub fn spawn<P>(
        engine: &EventEngine<P>,
        listeners: Vec<Arc<dyn Listen<P>>>,
    ) -> Result<Self, EngineError>
    where
        P: Clone + Send + 'static,
    {
        for l in &listeners {
            engine.register_events(l.publishes());
        }

        let mut ready = Vec::with_capacity(listeners.len());
        for l in listeners {
            let (sub, rx) = Subscriber::channel(l.name(), l.queue_capacity());
            for topic in l.topics() {
                engine.subscribe(&topic, sub.clone())?;
            }
            // Only the registry keeps senders, so shutdown closes the channel.
            drop(sub);
            ready.push((l, rx));
        }

        let workers = ready
            .into_iter()
            .map(|(l, mut rx)| {
                let name = l.name();
                let handle = tokio::spawn(async move {
                    info!(listener = name, "listening");
                    while let Some(payload) = rx.recv().await {
                        let fut = l.on_event(payload);
                        if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                            error!(
                                listener = name,
                                panic = panic_message(&*panic_err),
                                "listener panicked"
                            );
                        }
                    }
                    info!(listener = name, "address channel closed; listener stopped");
                });
                (name, handle)
            })
            .collect();

        Ok(Self { workers })
    }

    /// Waits for every worker to finish (after the engine has stopped).
    pub async fn join(self) {
        for (name, h) in self.workers {
            if let Err(e) = h.await {
                error!(listener = name, error = %e, "listener worker ended abnormally");
            }
        }
    }

    /// True if there are no listeners.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Number of listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.workers.len()
    }
}

fn panic_message(err: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = err.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
