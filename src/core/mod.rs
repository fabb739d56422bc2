//! Engine core: registry, dispatch, fan-out and lifecycle.
//!
//! The public API from this module is [`EventEngine`] (plus its builder,
//! configuration and state). Internal modules:
//! - [`registry`]: topic → ordered subscribers, behind one lock;
//! - [`dispatch`]: the single consumer of the bounded ingestion queue;
//! - [`broadcaster`]: per-topic fan-out, split across a helper for wide topics;
//! - [`lifecycle`]: `Running → Draining → ClosingSubscribers → Stopped`;
//! - [`shutdown`]: OS signal helpers for hosts.
//!
//! ## Wiring
//! ```text
//! publish(ev) ──► [ingestion queue (bounded)] ──► Dispatcher::run()
//!                                                   │
//!                                                   ├─► Broadcaster::broadcast(ev)
//!                                                   │     ├─► registry.snapshot(topic)
//!                                                   │     ├─► inline sends
//!                                                   │     └─► helper sends (JoinSet)
//!                                                   │
//!                         shutdown token ──────────►└─► drain ─► close_all ─► Stopped
//! ```

mod broadcaster;
mod builder;
mod config;
mod dispatch;
mod engine;
mod lifecycle;
mod registry;
mod shutdown;

pub use builder::EngineBuilder;
pub use config::{ENV_PARTITION_THRESHOLD, ENV_QUEUE_CAPACITY, EngineConfig};
pub use engine::{EventEngine, Publish};
pub use lifecycle::EngineState;
pub use shutdown::{cancel_on_signal, wait_for_shutdown_signal};
