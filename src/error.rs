//! Error types used by the event engine and the catalog feature modules.
//!
//! This module defines two main error enums:
//!
//! - [`EngineError`]: errors raised by the engine itself (registry, queue, lifecycle).
//! - [`CatalogError`]: errors raised by the catalog services and their stores.
//!
//! Both types provide `as_label` for logging, and [`EngineError::is_recoverable`]
//! tells callers whether retrying or compensating makes sense.

use thiserror::Error;

use crate::events::Topic;

/// # Errors produced by the event engine.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// `subscribe`/`publish` targeted a topic that was never registered.
    /// The registry and the queue are left untouched.
    #[error("topic '{topic}' is not registered; register it before subscribing or publishing")]
    UnknownTopic {
        /// The unregistered topic.
        topic: Topic,
    },

    /// The engine stopped accepting work (shutdown started).
    #[error("event engine is shut down; '{topic}' was not accepted")]
    Closed {
        /// Topic of the rejected call.
        topic: Topic,
    },

    /// Non-blocking publish found the ingestion queue full.
    #[error("ingestion queue is full; '{topic}' was not accepted")]
    QueueFull {
        /// Topic of the rejected event.
        topic: Topic,
    },

    /// Invalid configuration detected at construction.
    #[error("invalid engine configuration: {reason}")]
    Config {
        /// What is wrong.
        reason: String,
    },

    /// The dispatcher task ended without reaching the stopped state.
    #[error("dispatcher terminated abnormally: {reason}")]
    DispatcherFailed {
        /// Join error description.
        reason: String,
    },
}

impl EngineError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use eventvisor::{EngineError, Topic};
    ///
    /// let err = EngineError::UnknownTopic { topic: Topic::from_static("no.such.topic") };
    /// assert_eq!(err.as_label(), "engine_unknown_topic");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            EngineError::UnknownTopic { .. } => "engine_unknown_topic",
            EngineError::Closed { .. } => "engine_closed",
            EngineError::QueueFull { .. } => "engine_queue_full",
            EngineError::Config { .. } => "engine_config",
            EngineError::DispatcherFailed { .. } => "engine_dispatcher_failed",
        }
    }

    /// Indicates whether the caller may recover from the error locally.
    ///
    /// `UnknownTopic` and `QueueFull` leave the engine fully usable; the other
    /// variants mean the engine is gone or was never valid.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::UnknownTopic { .. } | EngineError::QueueFull { .. }
        )
    }
}

/// # Errors produced by the catalog services.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CatalogError {
    /// A product with the same name already exists.
    #[error("product '{name}' already exists")]
    ProductExists {
        /// Trimmed product name.
        name: String,
    },

    /// Referenced entity does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity kind ("product", "inventory").
        entity: &'static str,
        /// Identifier that was looked up.
        id: uuid::Uuid,
    },

    /// Persistence layer failure.
    #[error("store failure: {error}")]
    Store {
        /// The underlying error message.
        error: String,
    },

    /// Announcing the fact failed; the write was rolled back.
    #[error("publishing event failed: {source}")]
    Publish {
        #[source]
        source: EngineError,
    },

    /// Announcing the fact failed and so did the rollback.
    #[error("publishing event failed ({publish}); compensating delete failed too: {compensation}")]
    CompensationFailed {
        /// Why the publish failed.
        publish: EngineError,
        /// Why the rollback failed.
        compensation: Box<CatalogError>,
    },
}

impl CatalogError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            CatalogError::ProductExists { .. } => "catalog_product_exists",
            CatalogError::NotFound { .. } => "catalog_not_found",
            CatalogError::Store { .. } => "catalog_store",
            CatalogError::Publish { .. } => "catalog_publish",
            CatalogError::CompensationFailed { .. } => "catalog_compensation_failed",
        }
    }
}
