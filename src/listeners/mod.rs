//! # Event listeners.
//!
//! This module provides the [`Listen`] trait and [`ListenerSet`], which turns
//! listeners into subscriber-owned worker tasks reading from their address
//! channels.
//!
//! ## Architecture
//! ```text
//! EventEngine ── fan-out ──► [address S1] ─► worker S1 ─► Listen::on_event(payload)
//!                       ├──► [address S2] ─► worker S2 ─► Listen::on_event(payload)
//!                       └──► [address SN] ─► worker SN ─► Listen::on_event(payload)
//! ```
//!
//! ## Listener types
//! - **Feature listeners** - react and may publish follow-up events
//!   (`InventoryListener`, `ProductListener`)
//! - **Passive listeners** - observe only (`EventLog`, behind the `logging` feature)

mod listen;
#[cfg(feature = "logging")]
mod log;
mod set;

pub use listen::Listen;
#[cfg(feature = "logging")]
pub use log::EventLog;
pub use set::ListenerSet;
