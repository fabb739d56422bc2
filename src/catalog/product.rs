//! Product feature module: the service that announces new products and the
//! listener that rolls them back when their inventory could not be created.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::core::Publish;
use crate::error::CatalogError;
use crate::events::{Event, ProductPayload, StoreEvent, Topic, topics};
use crate::listeners::Listen;

use super::store::{NewProduct, ProductStore};

/// Product use cases that publish storefront events.
pub struct ProductService {
    store: Arc<dyn ProductStore>,
    events: Arc<dyn Publish<StoreEvent>>,
}

impl ProductService {
    pub fn new(store: Arc<dyn ProductStore>, events: Arc<dyn Publish<StoreEvent>>) -> Self {
        Self { store, events }
    }

    /// Stores a product and announces it on `product.created`.
    ///
    /// If the announcement is rejected the product is deleted again, so no
    /// product exists without the inventory module having been told.
    ///
    /// # Errors
    /// - [`CatalogError::ProductExists`] for a duplicate name;
    /// - [`CatalogError::Publish`] if the event was rejected (product rolled back);
    /// - [`CatalogError::CompensationFailed`] if the rollback failed as well;
    /// - store errors as returned by the [`ProductStore`].
    pub async fn create_product(&self, mut product: NewProduct) -> Result<Uuid, CatalogError> {
        product.name = product.name.trim().to_string();
        product.description = product.description.trim().to_string();
        product.image_url = product.image_url.trim().to_string();

        if self.store.find_by_name(&product.name).await?.is_some() {
            return Err(CatalogError::ProductExists { name: product.name });
        }

        let product_id = self.store.create_product(&product).await?;
        let created = StoreEvent::ProductCreated(ProductPayload {
            product_id,
            stock_quantity: product.quantity,
        });

        if let Err(publish) = self.events.publish(Event::from(created)).await {
            warn!(
                product_id = %product_id,
                error = %publish,
                "announcing product failed; rolling back"
            );
            return match self.store.delete_product(product_id).await {
                Ok(()) => Err(CatalogError::Publish { source: publish }),
                Err(compensation) => Err(CatalogError::CompensationFailed {
                    publish,
                    compensation: Box::new(compensation),
                }),
            };
        }

        info!(product_id = %product_id, name = %product.name, "product created");
        Ok(product_id)
    }

    /// Deletes a product and announces it on `product.deleted`.
    ///
    /// The deletion is not undone if the announcement fails; the failure is
    /// logged.
    pub async fn delete_product(&self, product_id: Uuid) -> Result<(), CatalogError> {
        self.store.delete_product(product_id).await?;
        let deleted = StoreEvent::ProductDeleted { product_id };
        if let Err(e) = self.events.publish(Event::from(deleted)).await {
            warn!(product_id = %product_id, error = %e, "announcing product deletion failed");
        }
        Ok(())
    }
}

/// Reacts to inventory failures by deleting the product they refer to.
pub struct ProductListener {
    store: Arc<dyn ProductStore>,
}

impl ProductListener {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Listen<StoreEvent> for ProductListener {
    async fn on_event(&self, payload: StoreEvent) {
        match payload {
            StoreEvent::InventoryCreationFailed { product_id } => {
                if let Err(e) = self.store.delete_product(product_id).await {
                    error!(
                        product_id = %product_id,
                        error = %e,
                        "deleting product after inventory failure failed"
                    );
                }
            }
            other => warn!(event = other.as_label(), "unexpected event for product listener"),
        }
    }

    fn name(&self) -> &'static str {
        "product-listener"
    }

    fn topics(&self) -> Vec<Topic> {
        vec![topics::INVENTORY_CREATION_FAILED]
    }

    fn publishes(&self) -> Vec<Topic> {
        vec![
            topics::PRODUCT_CREATED,
            topics::PRODUCT_UPDATED,
            topics::PRODUCT_QUANTITY_UPDATED,
            topics::PRODUCT_DELETED,
        ]
    }
}
