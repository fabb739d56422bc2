//! Catalog feature modules built on the event engine.
//!
//! ## Flow
//! ```text
//! ProductService::create_product
//!   ├─► ProductStore::create_product
//!   └─► publish ProductCreated ──(rejected)──► ProductStore::delete_product
//!             │
//!             ▼
//! InventoryListener ─► InventoryStore::create_inventory
//!             │ (failed)
//!             ▼
//!   publish InventoryCreationFailed ─► ProductListener ─► ProductStore::delete_product
//! ```
//!
//! Stores are collaborators behind [`ProductStore`] and [`InventoryStore`];
//! [`MemoryCatalog`] is the in-process implementation.

mod inventory;
mod product;
mod store;

pub use inventory::InventoryListener;
pub use product::{ProductListener, ProductService};
pub use store::{Inventory, InventoryStore, MemoryCatalog, NewProduct, Product, ProductStore};
