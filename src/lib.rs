//! # eventvisor
//!
//! **Eventvisor** is an in-process event broadcaster for Rust services.
//!
//! A module announces a fact ("product created") without knowing who reacts.
//! The engine guarantees that every event accepted before shutdown reaches the
//! topic's subscribers, that a slow subscriber throttles instead of losing
//! events, and that shutdown drains deterministically before closing anything.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ ProductServ. │   │  Listener    │   │  any module  │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            │ publish(ev)      │ publish(ev)      │ publish(ev)
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │        Ingestion queue (bounded; EngineConfig::queue_capacity)    │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │      Dispatcher        │  (single consumer)
//!                       └───────────┬────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │      Broadcaster       │◄── TopicRegistry
//!                       └───┬────────────────┬───┘    (topic → [Subscriber])
//!                  inline   │                │  helper (wide topics)
//!                           ▼                ▼
//!                   [address S1..]     [address ..Sn]
//!                           ▼                ▼
//!                    listener worker   listener worker
//! ```
//!
//! ### Lifecycle
//! ```text
//! Running ─► (shutdown token) ─► Draining ─► ClosingSubscribers ─► Stopped
//!
//! Draining:
//!   ├─► await fan-out helpers
//!   ├─► close ingestion queue      (publish now fails with Closed)
//!   ├─► broadcast every queued event
//!   └─► await fan-out helpers
//! ClosingSubscribers:
//!   └─► drop every subscriber address (listener loops see end-of-stream)
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                        |
//! |-------------------|--------------------------------------------------------------|-------------------------------------------|
//! | **Engine**        | Register topics, subscribe, publish, shut down.              | [`EventEngine`], [`EngineBuilder`]        |
//! | **Data model**    | Topics, events, subscribers, storefront payloads.            | [`Topic`], [`Event`], [`StoreEvent`]      |
//! | **Listeners**     | Subscriber-owned workers draining their address channel.     | [`Listen`], [`ListenerSet`]               |
//! | **Catalog**       | Product/inventory modules wired through events.              | [`ProductService`], [`InventoryListener`] |
//! | **Errors**        | Typed errors for the engine and the catalog.                 | [`EngineError`], [`CatalogError`]         |
//! | **Configuration** | Queue bound and fan-out split threshold.                     | [`EngineConfig`]                          |
//!
//! ## Optional features
//! - `logging`: exports the built-in [`EventLog`] listener.
//!
//! ## Example
//! ```rust
//! use eventvisor::{EngineConfig, Event, EventEngine, Subscriber, Topic};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let order_created = Topic::from_static("order.created");
//!
//!     let engine = EventEngine::<&'static str>::builder(EngineConfig::default()).build()?;
//!     engine.register_events([order_created.clone()]);
//!
//!     let (s1, mut rx1) = Subscriber::channel("s1", 2);
//!     let (s2, mut rx2) = Subscriber::channel("s2", 2);
//!     engine.subscribe(&order_created, s1)?;
//!     engine.subscribe(&order_created, s2)?;
//!
//!     let r1 = tokio::spawn(async move {
//!         let mut seen = Vec::new();
//!         while let Some(p) = rx1.recv().await { seen.push(p); }
//!         seen
//!     });
//!     let r2 = tokio::spawn(async move {
//!         let mut seen = Vec::new();
//!         while let Some(p) = rx2.recv().await { seen.push(p); }
//!         seen
//!     });
//!
//!     for p in ["A", "B", "C"] {
//!         engine.publish(Event::new(order_created.clone(), p)).await?;
//!     }
//!     engine.shutdown().await?;
//!
//!     assert_eq!(r1.await?, ["A", "B", "C"]);
//!     assert_eq!(r2.await?, ["A", "B", "C"]);
//!     Ok(())
//! }
//! ```
mod catalog;
mod core;
mod error;
mod events;
mod listeners;

// ---- Public re-exports ----

pub use catalog::{
    Inventory, InventoryListener, InventoryStore, MemoryCatalog, NewProduct, Product,
    ProductListener, ProductService, ProductStore,
};
pub use crate::core::{
    ENV_PARTITION_THRESHOLD, ENV_QUEUE_CAPACITY, EngineBuilder, EngineConfig, EngineState,
    EventEngine, Publish, cancel_on_signal, wait_for_shutdown_signal,
};
pub use error::{CatalogError, EngineError};
pub use events::{Event, ProductPayload, Routed, StoreEvent, Subscriber, Topic, topics};
pub use listeners::{Listen, ListenerSet};

// Optional: expose a simple built-in logging listener.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use listeners::EventLog;
