//! # EventLog: records every payload it receives
//!
//! A minimal listener that writes each delivered payload to `tracing` at
//! `info` level. Use it for demos or as an audit trail.
//!
//! ## Example output
//! ```text
//! INFO eventvisor::listeners::log: event received listener="event-log" seq=1 payload=ProductCreated(..)
//! ```

use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tracing::info;

use crate::events::Topic;

use super::Listen;

/// Payload-logging listener for a fixed set of topics.
pub struct EventLog<P> {
    topics: Vec<Topic>,
    seen: AtomicU64,
    _payload: PhantomData<fn(P)>,
}

impl<P> EventLog<P> {
    /// Logs every payload published on `topics`.
    #[must_use]
    pub fn new(topics: Vec<Topic>) -> Self {
        Self {
            topics,
            seen: AtomicU64::new(0),
            _payload: PhantomData,
        }
    }

    /// Number of payloads logged so far.
    pub fn seen(&self) -> u64 {
        self.seen.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl<P> Listen<P> for EventLog<P>
where
    P: Debug + Send + 'static,
{
    async fn on_event(&self, payload: P) {
        let seq = self.seen.fetch_add(1, Ordering::Relaxed) + 1;
        info!(listener = "event-log", seq, payload = ?payload, "event received");
    }

    fn name(&self) -> &'static str {
        "event-log"
    }

    fn topics(&self) -> Vec<Topic> {
        self.topics.clone()
    }

    fn queue_capacity(&self) -> usize {
        64
    }
}
