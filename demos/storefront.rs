//! # Example: storefront
//!
//! Product and inventory modules cooperating through the engine.
//!
//! Shows how to:
//! - Configure the engine from `EVENTVISOR_*` variables (a `.env` file works).
//! - Wire [`ProductListener`], [`InventoryListener`] and [`EventLog`] with a
//!   [`ListenerSet`].
//! - Create products through [`ProductService`] and watch `product.created`
//!   flow into the inventory table.
//! - Stop on Ctrl-C or after a short run, draining every queued event.
//!
//! ## Flow
//! ```text
//! ProductService::create_product
//!   └─► publish(product.created) ──► InventoryListener ──► inventory row
//!                                └─► EventLog
//! shutdown token ──► drain queue ──► close channels ──► listeners exit
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=eventvisor=debug,storefront=info cargo run --example storefront --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use eventvisor::{
    EngineConfig, EventEngine, EventLog, InventoryListener, Listen, ListenerSet, MemoryCatalog,
    NewProduct, ProductListener, ProductService, Publish, StoreEvent, cancel_on_signal, topics,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eventvisor=info,storefront=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = EngineConfig::from_env()?;
    info!(?cfg, "starting engine");
    let engine = EventEngine::<StoreEvent>::builder(cfg).build()?;

    let signals = tokio::spawn(cancel_on_signal(engine.shutdown_token()));

    let catalog = Arc::new(MemoryCatalog::new());
    let events: Arc<dyn Publish<StoreEvent>> = Arc::new(engine.clone());

    let listeners: Vec<Arc<dyn Listen<StoreEvent>>> = vec![
        Arc::new(ProductListener::new(catalog.clone())),
        Arc::new(InventoryListener::new(catalog.clone(), events.clone())),
        Arc::new(EventLog::<StoreEvent>::new(vec![
            topics::PRODUCT_CREATED,
            topics::PRODUCT_DELETED,
            topics::INVENTORY_CREATION_FAILED,
        ])),
    ];
    let listeners = ListenerSet::spawn(&engine, listeners)?;
    info!(listeners = listeners.len(), topics = ?engine.topics(), "storefront wired");

    let products = ProductService::new(catalog.clone(), events);
    let mut created = Vec::new();
    for (name, quantity) in [("acorn", 40), ("pine cone", 12), ("chestnut", 7)] {
        let id = products
            .create_product(NewProduct {
                name: name.into(),
                category: "seeds".into(),
                price: 0.5,
                quantity,
                ..NewProduct::default()
            })
            .await?;
        created.push(id);
    }

    // Duplicate names are rejected before anything is published.
    if let Err(e) = products
        .create_product(NewProduct {
            name: "acorn".into(),
            ..NewProduct::default()
        })
        .await
    {
        warn!(error = %e, "second acorn rejected");
    }

    if let Some(&first) = created.first() {
        products.delete_product(first).await?;
    }

    tokio::select! {
        _ = engine.stopped() => {}
        _ = tokio::time::sleep(Duration::from_millis(500)) => {}
    }
    engine.shutdown().await?;
    listeners.join().await;
    signals.await??;

    for id in created {
        match (catalog.product(id), catalog.inventory(id)) {
            (Some(p), Some(inv)) => info!(name = %p.name, stock = inv.stock_quantity, "in stock"),
            (Some(p), None) => warn!(name = %p.name, "product without inventory"),
            (None, _) => info!(product_id = %id, "product removed"),
        }
    }
    info!(state = %engine.state(), "storefront stopped");
    Ok(())
}
