//! The event bus: subscription registry plus asynchronous dispatch.
//!
//! ## Delivery model
//!
//! - **One handler per event**: subscribing a second handler to a registered
//!   event fails with [`BusError::DuplicateSubscription`]; nothing is replaced
//! - **Fire-and-forget**: `notify` queues the handler on the worker pool and
//!   returns; it never waits for, or sees the result of, the handler
//! - **Lossy**: notifying an event nobody subscribed to drops the payload
//! - **No ordering** between different events
//!
//! ## Locking
//!
//! The registry and the optional counters sit behind one `Mutex`. Every scan
//! and every mutation takes it, so concurrent subscribe/unsubscribe/notify
//! always see a consistent registry. The lock is released before a job is
//! submitted, which means handlers are free to call back into the bus.

use std::any::Any;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, info, warn};

use cyberbus_core::{BusError, BusResult, EventName, SubscriptionId};

use crate::config::BusConfig;
use crate::handler::{self, HandlerOutcome};
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::pool::WorkerPool;
use crate::singleton::{Construction, Singleton};
use crate::subscription::{Registry, Subscription};
use crate::Payload;

/// Identity string rendered for a bus without metrics.
pub const BUS_IDENTITY: &str = "cyberbus::Bus";

#[derive(Debug, Default)]
struct State {
    registry: Registry,
    metrics: Option<Metrics>,
}

/// In-process publish/subscribe bus.
///
/// Obtained from a [`Holder`](crate::Holder), never constructed directly:
///
/// ```ignore
/// let bus = cyberbus_events::instance();
/// bus.subscribe("orders", |payload: Payload| {
///     if let Some(order) = payload.downcast_ref::<Order>() {
///         ship(order);
///     }
/// })?;
/// bus.notify("orders", order)?;
/// ```
pub struct Bus {
    config: BusConfig,
    state: Mutex<State>,
    pool: WorkerPool,
}

impl Bus {
    /// Always fails: a bus only comes from [`Holder::instance`](crate::Holder::instance).
    pub fn new() -> BusResult<Self> {
        Err(BusError::DirectConstructionForbidden)
    }

    fn build(config: BusConfig) -> Self {
        let pool = WorkerPool::new(config.workers, config.queue_capacity);
        let state = State {
            registry: Registry::default(),
            metrics: config.with_metrics.then(Metrics::default),
        };

        info!(
            with_metrics = config.with_metrics,
            workers = pool.size(),
            queue_capacity = config.queue_capacity,
            "bus created"
        );

        Self {
            config,
            state: Mutex::new(state),
            pool,
        }
    }

    /// Registry and counters are only mutated in single, non-panicking
    /// steps, so a poisoned lock still guards consistent data.
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bind `handler` to `event`.
    ///
    /// The handler receives the payload of each matching notification on a
    /// worker thread. It may return `()` or a `Result<(), E>`; errors are
    /// logged and otherwise ignored.
    pub fn subscribe<F, R>(&self, event: impl AsRef<str>, handler: F) -> BusResult<&Self>
    where
        F: Fn(Payload) -> R + Send + Sync + 'static,
        R: HandlerOutcome,
    {
        let event = EventName::new(event.as_ref())?;
        let subscription = Subscription::new(event, handler::boxed(handler));

        let mut state = self.state();
        let State { registry, metrics } = &mut *state;

        let added = registry.insert(subscription)?;
        if let Some(metrics) = metrics {
            metrics.record_subscribe();
        }
        debug!(event = %added.event(), subscription = %added.id(), "subscribed");

        Ok(self)
    }

    /// Remove the handler bound to `event`. Unknown events are a no-op.
    pub fn unsubscribe(&self, event: impl AsRef<str>) -> BusResult<&Self> {
        let event = EventName::new(event.as_ref())?;

        let mut state = self.state();
        let State { registry, metrics } = &mut *state;

        if let Some(removed) = registry.remove(event.as_str()) {
            if let Some(metrics) = metrics {
                metrics.record_unsubscribe();
            }
            debug!(
                event = %removed.event(),
                subscription = %removed.id(),
                subscribed_at = %removed.subscribed_at(),
                "unsubscribed"
            );
        }

        Ok(self)
    }

    /// Deliver `payload` to the handler bound to `event`, if any.
    ///
    /// Returns once the handler is queued. Blocks only while the worker
    /// queue is full; called from a handler, a full queue runs the handler
    /// inline on the current worker instead.
    pub fn notify<T>(&self, event: impl AsRef<str>, payload: T) -> BusResult<&Self>
    where
        T: Any + Send + Sync,
    {
        let event = EventName::new(event.as_ref())?;

        let (subscription, handler) = {
            let state = self.state();
            match state.registry.get(event.as_str()) {
                Some(s) => (s.id(), s.handler().clone()),
                None => {
                    debug!(event = %event, "no subscriber, notification dropped");
                    return Ok(self);
                }
            }
        };

        let payload = Payload::new(payload);
        let job_event = event.clone();
        let job = Box::new(move || {
            if let Some(failure) = handler(payload) {
                warn!(event = %job_event, subscription = %subscription, error = %failure, "handler failed");
            }
        });

        if let Err(e) = self.pool.submit(job) {
            error!(event = %event, subscription = %subscription, error = %e, "dispatch failed");
            return Ok(self);
        }

        if let Some(metrics) = self.state().metrics.as_mut() {
            metrics.record_notification();
        }
        debug!(event = %event, subscription = %subscription, "notification dispatched");

        Ok(self)
    }

    /// Whether a handler is bound to `event`.
    pub fn is_subscribed(&self, event: impl AsRef<str>) -> bool {
        self.state().registry.get(event.as_ref()).is_some()
    }

    /// Id of the subscription currently bound to `event`.
    pub fn subscription_id(&self, event: impl AsRef<str>) -> Option<SubscriptionId> {
        self.state().registry.get(event.as_ref()).map(Subscription::id)
    }

    /// Registered event names, in subscription order.
    pub fn events(&self) -> Vec<EventName> {
        self.state()
            .registry
            .iter()
            .map(|s| s.event().clone())
            .collect()
    }

    /// Number of registered subscriptions.
    pub fn len(&self) -> usize {
        self.state().registry.len()
    }

    /// Whether no event has a handler.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current counters, or `None` when the bus was built without metrics.
    pub fn metrics(&self) -> Option<MetricsSnapshot> {
        self.state().metrics.as_ref().map(Metrics::snapshot)
    }

    /// Options the bus was built with.
    pub fn config(&self) -> &BusConfig {
        &self.config
    }
}

impl Singleton for Bus {
    type Options = BusConfig;

    fn validate(options: &BusConfig) -> BusResult<()> {
        options.validate()
    }

    fn construct(options: BusConfig, _token: Construction) -> Self {
        Self::build(options)
    }
}

impl core::fmt::Display for Bus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.metrics() {
            Some(m) => write!(
                f,
                "Bus with: \nNotifications delivered: {} \nSubscribers: {} \n",
                m.notifications, m.subscriptions
            ),
            None => f.write_str(BUS_IDENTITY),
        }
    }
}

impl core::fmt::Debug for Bus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.state();
        f.debug_struct("Bus")
            .field("config", &self.config)
            .field("registry", &state.registry)
            .field("metrics", &state.metrics)
            .finish_non_exhaustive()
    }
}
