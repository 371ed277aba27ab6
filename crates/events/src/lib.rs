//! `cyberbus-events` — in-process publish/subscribe bus.
//!
//! - [`Bus`]: binds event names to handlers and dispatches notifications to
//!   a worker pool
//! - [`Holder`]: builds the bus lazily, once, from options recorded beforehand
//! - [`configure`] / [`instance`] / [`register`]: the process-wide bus

pub mod bus;
pub mod config;
pub mod global;
pub mod handler;
pub mod metrics;
pub mod payload;
mod pool;
pub mod singleton;
mod subscription;

pub use bus::{BUS_IDENTITY, Bus};
pub use config::BusConfig;
pub use global::{configure, holder, instance, is_bus, register};
pub use handler::HandlerOutcome;
pub use metrics::MetricsSnapshot;
pub use payload::Payload;
pub use singleton::{Construction, Holder, Singleton};

pub use cyberbus_core::{BusError, BusResult, EventName, SubscriptionId};
