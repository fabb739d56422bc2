//! # Storefront event family.
//!
//! [`StoreEvent`] is the closed set of payloads exchanged between the catalog
//! feature modules. Each variant maps to exactly one topic in [`topics`].
//!
//! ## Quick reference
//! ```text
//! ProductService ── ProductCreated ──────────► InventoryListener
//!                                                   │ (store failure)
//! ProductListener ◄── InventoryCreationFailed ──────┘
//!       └─► delete product (compensation)
//! ```

use uuid::Uuid;

use super::event::Routed;
use super::topic::Topic;

/// Well-known storefront topics.
pub mod topics {
    use super::Topic;

    /// A product was created and needs an inventory row.
    pub const PRODUCT_CREATED: Topic = Topic::from_static("product.created");
    /// Product details changed.
    pub const PRODUCT_UPDATED: Topic = Topic::from_static("product.updated");
    /// Product stock quantity changed.
    pub const PRODUCT_QUANTITY_UPDATED: Topic = Topic::from_static("product.updated.quantity");
    /// A product was removed.
    pub const PRODUCT_DELETED: Topic = Topic::from_static("product.deleted");
    /// The inventory row for a new product could not be created.
    pub const INVENTORY_CREATION_FAILED: Topic = Topic::from_static("inventory.creation.failed");
}

/// Product identity plus the stock quantity it was announced with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProductPayload {
    pub product_id: Uuid,
    pub stock_quantity: u32,
}

/// Payloads published by the storefront feature modules.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreEvent {
    /// Published on [`topics::PRODUCT_CREATED`].
    ProductCreated(ProductPayload),
    /// Published on [`topics::PRODUCT_UPDATED`].
    ProductUpdated(ProductPayload),
    /// Published on [`topics::PRODUCT_QUANTITY_UPDATED`].
    ProductQuantityUpdated(ProductPayload),
    /// Published on [`topics::PRODUCT_DELETED`].
    ProductDeleted { product_id: Uuid },
    /// Published on [`topics::INVENTORY_CREATION_FAILED`].
    InventoryCreationFailed { product_id: Uuid },
}

impl StoreEvent {
    /// Product the event refers to.
    pub fn product_id(&self) -> Uuid {
        match self {
            StoreEvent::ProductCreated(p)
            | StoreEvent::ProductUpdated(p)
            | StoreEvent::ProductQuantityUpdated(p) => p.product_id,
            StoreEvent::ProductDeleted { product_id }
            | StoreEvent::InventoryCreationFailed { product_id } => *product_id,
        }
    }

    /// Short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            StoreEvent::ProductCreated(_) => "product_created",
            StoreEvent::ProductUpdated(_) => "product_updated",
            StoreEvent::ProductQuantityUpdated(_) => "product_quantity_updated",
            StoreEvent::ProductDeleted { .. } => "product_deleted",
            StoreEvent::InventoryCreationFailed { .. } => "inventory_creation_failed",
        }
    }
}

impl Routed for StoreEvent {
    fn topic(&self) -> Topic {
        match self {
            StoreEvent::ProductCreated(_) => topics::PRODUCT_CREATED,
            StoreEvent::ProductUpdated(_) => topics::PRODUCT_UPDATED,
            StoreEvent::ProductQuantityUpdated(_) => topics::PRODUCT_QUANTITY_UPDATED,
            StoreEvent::ProductDeleted { .. } => topics::PRODUCT_DELETED,
            StoreEvent::InventoryCreationFailed { .. } => topics::INVENTORY_CREATION_FAILED,
        }
    }
}
