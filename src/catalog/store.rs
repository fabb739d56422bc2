//! Persistence collaborators for the catalog feature modules.
//!
//! The real backing store is outside this crate; services only see these
//! narrow traits. [`MemoryCatalog`] implements both for demos and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::error::CatalogError;

/// Input for creating a product.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub price: f64,
    pub category: String,
    /// Initial stock, announced to the inventory module.
    pub quantity: u32,
}

/// Stored product.
#[derive(Clone, Debug, PartialEq)]
pub struct Product {
    pub product_id: Uuid,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub price: f64,
    pub category: String,
}

/// Stored inventory row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Inventory {
    pub product_id: Uuid,
    pub stock_quantity: u32,
    pub reserved_quantity: u32,
}

/// Product persistence.
#[async_trait]
pub trait ProductStore: Send + Sync + 'static {
    /// Inserts a product and returns its id.
    async fn create_product(&self, product: &NewProduct) -> Result<Uuid, CatalogError>;
    /// Looks a product up by exact name.
    async fn find_by_name(&self, name: &str) -> Result<Option<Product>, CatalogError>;
    /// Removes a product.
    async fn delete_product(&self, product_id: Uuid) -> Result<(), CatalogError>;
}

/// Inventory persistence.
#[async_trait]
pub trait InventoryStore: Send + Sync + 'static {
    /// Inserts the inventory row of a freshly created product.
    async fn create_inventory(&self, product_id: Uuid, stock_quantity: u32) -> Result<(), CatalogError>;
}

#[derive(Default)]
struct Tables {
    products: HashMap<Uuid, Product>,
    inventory: HashMap<Uuid, Inventory>,
}

/// In-memory product and inventory tables.
#[derive(Default)]
pub struct MemoryCatalog {
    tables: Mutex<Tables>,
}

impl MemoryCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Product by id.
    pub fn product(&self, product_id: Uuid) -> Option<Product> {
        self.tables.lock().products.get(&product_id).cloned()
    }

    /// Inventory row by product id.
    pub fn inventory(&self, product_id: Uuid) -> Option<Inventory> {
        self.tables.lock().inventory.get(&product_id).copied()
    }

    /// Number of stored products.
    pub fn product_count(&self) -> usize {
        self.tables.lock().products.len()
    }
}

#[async_trait]
impl ProductStore for MemoryCatalog {
    async fn create_product(&self, product: &NewProduct) -> Result<Uuid, CatalogError> {
        let product_id = Uuid::new_v4();
        let row = Product {
            product_id,
            name: product.name.clone(),
            description: product.description.clone(),
            image_url: product.image_url.clone(),
            price: product.price,
            category: product.category.clone(),
        };
        self.tables.lock().products.insert(product_id, row);
        Ok(product_id)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Product>, CatalogError> {
        let g = self.tables.lock();
        Ok(g.products.values().find(|p| p.name == name).cloned())
    }

    async fn delete_product(&self, product_id: Uuid) -> Result<(), CatalogError> {
        let mut g = self.tables.lock();
        g.inventory.remove(&product_id);
        match g.products.remove(&product_id) {
            Some(_) => Ok(()),
            None => Err(CatalogError::NotFound {
                entity: "product",
                id: product_id,
            }),
        }
    }
}

#[async_trait]
impl InventoryStore for MemoryCatalog {
    async fn create_inventory(&self, product_id: Uuid, stock_quantity: u32) -> Result<(), CatalogError> {
        let mut g = self.tables.lock();
        if !g.products.contains_key(&product_id) {
            return Err(CatalogError::NotFound {
                entity: "product",
                id: product_id,
            });
        }
        if g.inventory.contains_key(&product_id) {
            return Err(CatalogError::Store {
                error: format!("inventory for {product_id} already exists"),
            });
        }
        g.inventory.insert(
            product_id,
            Inventory {
                product_id,
                stock_quantity,
                reserved_quantity: 0,
            },
        );
        Ok(())
    }
}
