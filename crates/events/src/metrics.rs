//! Optional bus counters.

use serde::Serialize;

/// Counters kept by a bus configured `with_metrics`.
///
/// Lives next to the registry under the same lock, so the subscription
/// count always matches the registry.
#[derive(Debug, Default)]
pub(crate) struct Metrics {
    notifications: u64,
    subscriptions: u64,
}

impl Metrics {
    pub(crate) fn record_subscribe(&mut self) {
        self.subscriptions += 1;
    }

    pub(crate) fn record_unsubscribe(&mut self) {
        self.subscriptions = self.subscriptions.saturating_sub(1);
    }

    pub(crate) fn record_notification(&mut self) {
        self.notifications += 1;
    }

    pub(crate) fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            notifications: self.notifications,
            subscriptions: self.subscriptions,
        }
    }
}

/// Point-in-time copy of the bus counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Notifications handed to a handler since the bus was built.
    pub notifications: u64,
    /// Live subscriptions.
    pub subscriptions: u64,
}
