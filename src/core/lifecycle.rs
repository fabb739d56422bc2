//! # Engine lifecycle state machine.
//!
//! ```text
//! Running ──(shutdown token / all handles dropped)──► Draining
//!    Draining: await helpers → close queue → broadcast leftovers → await helpers
//! Draining ──(queue empty)──► ClosingSubscribers
//!    ClosingSubscribers: drop every subscriber address (channels close once)
//! ClosingSubscribers ──► Stopped   (terminal)
//! ```
//!
//! The dispatcher is the only writer. Everyone else observes the state through
//! a `watch` channel, so waiting for `Stopped` never polls.

use std::fmt;

use tokio::sync::watch;
use tracing::info;

/// Lifecycle state of an event engine.
///
/// States are ordered; the engine only ever moves forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EngineState {
    /// Dispatching queued events as they arrive.
    Running,
    /// Shutdown observed; the queue is closed and its leftovers are broadcast.
    Draining,
    /// Queue drained; subscriber channels are being closed.
    ClosingSubscribers,
    /// Terminal; no further work happens.
    Stopped,
}

impl EngineState {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            EngineState::Running => "running",
            EngineState::Draining => "draining",
            EngineState::ClosingSubscribers => "closing_subscribers",
            EngineState::Stopped => "stopped",
        }
    }

    /// True while `publish` may still enqueue.
    pub fn is_accepting(&self) -> bool {
        matches!(self, EngineState::Running)
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Single source of truth for the engine's lifecycle state.
pub(crate) struct Lifecycle {
    tx: watch::Sender<EngineState>,
}

impl Lifecycle {
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(EngineState::Running);
        Self { tx }
    }

    /// Current state.
    pub(crate) fn state(&self) -> EngineState {
        *self.tx.borrow()
    }

    /// Moves to `next` if it is ahead of the current state.
    ///
    /// Returns `false` (and changes nothing) for backward or repeated moves.
    pub(crate) fn advance(&self, next: EngineState) -> bool {
        let mut from = None;
        let moved = self.tx.send_if_modified(|cur| {
            if next > *cur {
                from = Some(*cur);
                *cur = next;
                true
            } else {
                false
            }
        });
        if let Some(from) = from {
            info!(from = %from, to = %next, "event engine state changed");
        }
        moved
    }

    /// Resolves once the engine reaches `Stopped`.
    pub(crate) async fn stopped(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so `wait_for` cannot observe a closed channel.
        let _ = rx.wait_for(|s| *s == EngineState::Stopped).await;
    }
}
