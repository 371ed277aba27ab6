//! Process-wide bus.
//!
//! Configure once at startup, then reach the bus from anywhere:
//!
//! ```ignore
//! // In main.rs, before anything touches the bus:
//! cyberbus_events::configure(BusConfig::default().with_metrics(true))?;
//!
//! // At startup, wherever handlers live:
//! cyberbus_events::register("orders", handle_order)?;
//!
//! // In any module:
//! cyberbus_events::instance().notify("orders", order)?;
//! ```
//!
//! Code that can take the bus (or a [`Holder`]) as an argument should prefer
//! that over reaching for the global.

use std::any::Any;

use cyberbus_core::BusResult;

use crate::handler::HandlerOutcome;
use crate::{Bus, BusConfig, Holder, Payload};

static BUS: Holder<Bus> = Holder::new();

/// The holder behind the process-wide bus.
pub fn holder() -> &'static Holder<Bus> {
    &BUS
}

/// Set the options of the process-wide bus. Fails once it has been built.
pub fn configure(config: BusConfig) -> BusResult<&'static Holder<Bus>> {
    BUS.configure(config)
}

/// The process-wide bus, built on first call.
pub fn instance() -> &'static Bus {
    BUS.instance()
}

/// Whether `value` is a [`Bus`].
pub fn is_bus(value: &dyn Any) -> bool {
    BUS.is_instance(value)
}

/// Subscribe `handler` to `event` on the process-wide bus.
pub fn register<F, R>(event: impl AsRef<str>, handler: F) -> BusResult<&'static Bus>
where
    F: Fn(Payload) -> R + Send + Sync + 'static,
    R: HandlerOutcome,
{
    BUS.register(event, handler)
}

impl Holder<Bus> {
    /// Subscribe `handler` to `event` on this holder's bus, building it if needed.
    pub fn register<F, R>(&self, event: impl AsRef<str>, handler: F) -> BusResult<&Bus>
    where
        F: Fn(Payload) -> R + Send + Sync + 'static,
        R: HandlerOutcome,
    {
        self.instance().subscribe(event, handler)
    }
}
