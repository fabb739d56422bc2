//! Inventory feature module: creates the inventory row of every new product.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, warn};

use crate::core::Publish;
use crate::events::{Event, ProductPayload, StoreEvent, Topic, topics};
use crate::listeners::Listen;

use super::store::InventoryStore;

/// Creates inventory for `product.created`; reports failures on
/// `inventory.creation.failed`.
pub struct InventoryListener {
    store: Arc<dyn InventoryStore>,
    events: Arc<dyn Publish<StoreEvent>>,
}

impl InventoryListener {
    pub fn new(store: Arc<dyn InventoryStore>, events: Arc<dyn Publish<StoreEvent>>) -> Self {
        Self { store, events }
    }

    async fn product_created(&self, p: ProductPayload) {
        let Err(e) = self
            .store
            .create_inventory(p.product_id, p.stock_quantity)
            .await
        else {
            return;
        };

        warn!(
            product_id = %p.product_id,
            error = %e,
            "inventory creation failed; reporting"
        );
        let failed = StoreEvent::InventoryCreationFailed {
            product_id: p.product_id,
        };
        if let Err(e) = self.events.publish(Event::from(failed)).await {
            error!(
                product_id = %p.product_id,
                error = %e,
                "could not report inventory failure; product left without inventory"
            );
        }
    }
}

#[async_trait]
impl Listen<StoreEvent> for InventoryListener {
    async fn on_event(&self, payload: StoreEvent) {
        match payload {
            StoreEvent::ProductCreated(p) => self.product_created(p).await,
            other => warn!(event = other.as_label(), "unexpected event for inventory listener"),
        }
    }

    fn name(&self) -> &'static str {
        "inventory-listener"
    }

    fn topics(&self) -> Vec<Topic> {
        vec![topics::PRODUCT_CREATED]
    }

    fn publishes(&self) -> Vec<Topic> {
        vec![topics::INVENTORY_CREATION_FAILED]
    }
}
