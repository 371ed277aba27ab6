//! Bus configuration.

use std::num::NonZeroUsize;
use std::thread;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use cyberbus_core::{BusError, BusResult};

const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Options applied when a bus is first built.
///
/// Supplied through [`Holder::configure`](crate::Holder::configure) before
/// the first [`Holder::instance`](crate::Holder::instance) call; fixed for
/// the life of the bus afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BusConfig {
    /// Keep notification and subscription counters.
    pub with_metrics: bool,
    /// Number of worker threads running handlers.
    pub workers: usize,
    /// Jobs that may wait for a worker before `notify` blocks.
    pub queue_capacity: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            with_metrics: false,
            workers: thread::available_parallelism().map_or(1, NonZeroUsize::get),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl BusConfig {
    /// Build a config from an option-name → value mapping.
    ///
    /// Missing options keep their defaults. Unknown names, ill-typed values
    /// and zero sizes are rejected.
    ///
    /// ```ignore
    /// let options = serde_json::json!({ "with_metrics": true });
    /// let config = BusConfig::from_options(options.as_object().cloned().unwrap_or_default())?;
    /// ```
    pub fn from_options(options: Map<String, Value>) -> BusResult<Self> {
        let config: Self = serde_json::from_value(Value::Object(options))
            .map_err(|e| BusError::invalid_argument(format!("bus options: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.with_metrics = enabled;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Check that sizes are usable.
    pub fn validate(&self) -> BusResult<()> {
        if self.workers == 0 {
            return Err(BusError::invalid_argument("workers must be at least 1"));
        }
        if self.queue_capacity == 0 {
            return Err(BusError::invalid_argument("queue_capacity must be at least 1"));
        }
        Ok(())
    }
}
