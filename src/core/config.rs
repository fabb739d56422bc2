//! # Engine configuration.
//!
//! Provides [`EngineConfig`] centralized settings for the event engine.
//!
//! Config is used in two ways:
//! 1. **Engine creation**: `EventEngine::builder(config).build()`
//! 2. **Environment overrides**: `EngineConfig::from_env()` for hosts that
//!    configure through `EVENTVISOR_*` variables.
//!
//! Unlike clamped sentinels, zero values are rejected by [`EngineConfig::validate`]:
//! a zero-capacity queue or a zero threshold is a wiring mistake and the engine
//! refuses to start with it.

use std::env;
use std::str::FromStr;

use crate::error::EngineError;

/// Environment variable overriding [`EngineConfig::queue_capacity`].
pub const ENV_QUEUE_CAPACITY: &str = "EVENTVISOR_QUEUE_CAPACITY";
/// Environment variable overriding [`EngineConfig::partition_threshold`].
pub const ENV_PARTITION_THRESHOLD: &str = "EVENTVISOR_PARTITION_THRESHOLD";

/// Global configuration for the event engine.
///
/// ## Field semantics
/// - `queue_capacity`: bound of the ingestion queue; `publish` waits when full
/// - `partition_threshold`: smallest partition size (`n / 2 + 1`) at which a
///   topic's fan-out is split across a helper task
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Capacity of the bounded ingestion queue.
    ///
    /// Producers calling `publish` block once this many events are waiting for
    /// the dispatcher.
    pub queue_capacity: usize,

    /// Fan-out split threshold.
    ///
    /// With `n` subscribers the partition size is `n / 2 + 1`. Below the
    /// threshold every subscriber is served in registration order on the
    /// dispatcher; at or above it the first partition is handed to a helper task.
    pub partition_threshold: usize,
}

impl EngineConfig {
    /// Smallest subscriber count whose fan-out is split.
    #[inline]
    pub fn split_at_subscribers(&self) -> usize {
        // n / 2 + 1 >= t  <=>  n >= 2 * (t - 1)
        2 * self.partition_threshold.saturating_sub(1)
    }

    /// Checks that the configuration can start an engine.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.queue_capacity == 0 {
            return Err(EngineError::Config {
                reason: "queue_capacity must be at least 1".into(),
            });
        }
        if self.partition_threshold == 0 {
            return Err(EngineError::Config {
                reason: "partition_threshold must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Builds a configuration from defaults overridden by `EVENTVISOR_*`
    /// environment variables.
    ///
    /// Unset variables keep their defaults; unparsable values are errors.
    pub fn from_env() -> Result<Self, EngineError> {
        let mut cfg = Self::default();
        if let Some(v) = read_var(ENV_QUEUE_CAPACITY)? {
            cfg.queue_capacity = v;
        }
        if let Some(v) = read_var(ENV_PARTITION_THRESHOLD)? {
            cfg.partition_threshold = v;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn read_var<T: FromStr>(key: &str) -> Result<Option<T>, EngineError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| EngineError::Config {
                reason: format!("{key}={raw:?} is not a valid number"),
            }),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(EngineError::Config {
            reason: format!("{key} is not valid unicode"),
        }),
    }
}

impl Default for EngineConfig {
    /// Default configuration:
    ///
    /// - `queue_capacity = 20`
    /// - `partition_threshold = 4` (topics with 6+ subscribers are split)
    fn default() -> Self {
        Self {
            queue_capacity: 20,
            partition_threshold: 4,
        }
    }
}
