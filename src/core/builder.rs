use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::EngineError;

use super::{
    config::EngineConfig,
    dispatch::Dispatcher,
    engine::{EventEngine, Shared},
    lifecycle::Lifecycle,
    registry::TopicRegistry,
};

/// Builder for constructing an [`EventEngine`].
pub struct EngineBuilder<P> {
    cfg: EngineConfig,
    shutdown: Option<CancellationToken>,
    _payload: PhantomData<fn() -> P>,
}

impl<P> EngineBuilder<P>
where
    P: Clone + Send + 'static,
{
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: EngineConfig) -> Self {
        Self {
            cfg,
            shutdown: None,
            _payload: PhantomData,
        }
    }

    /// Uses the host's shutdown token instead of a private one.
    ///
    /// Cancelling the token moves the engine from `Running` to `Draining`.
    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = Some(token);
        self
    }

    /// Validates the configuration and spawns the dispatcher.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    /// [`EngineError::Config`] for an invalid configuration or when no runtime
    /// is available; nothing is spawned in that case.
    pub fn build(self) -> Result<EventEngine<P>, EngineError> {
        self.cfg.validate()?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| EngineError::Config {
            reason: format!("event engine must be built inside a tokio runtime: {e}"),
        })?;

        let registry = Arc::new(TopicRegistry::new());
        let lifecycle = Arc::new(Lifecycle::new());
        let shutdown = self.shutdown.unwrap_or_else(CancellationToken::new);
        let (tx, rx) = mpsc::channel(self.cfg.queue_capacity);

        let dispatcher = Dispatcher::new(
            rx,
            Arc::clone(&registry),
            Arc::clone(&lifecycle),
            shutdown.clone(),
            self.cfg.partition_threshold,
        );
        let handle = runtime.spawn(dispatcher.run());

        Ok(EventEngine::from_shared(Shared {
            registry,
            lifecycle,
            queue: tx,
            shutdown,
            dispatcher: Mutex::new(Some(handle)),
        }))
    }
}
