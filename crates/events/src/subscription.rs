//! Subscription registry.
//!
//! The registry binds each event name to at most one handler. It is a plain
//! data structure: locking and metrics belong to the [`Bus`](crate::Bus)
//! that owns it.

use chrono::{DateTime, Utc};

use cyberbus_core::{BusError, BusResult, EventName, SubscriptionId};

use crate::handler::BoxedHandler;

/// The binding of one event to one handler.
#[derive(Clone)]
pub(crate) struct Subscription {
    id: SubscriptionId,
    event: EventName,
    handler: BoxedHandler,
    subscribed_at: DateTime<Utc>,
}

impl Subscription {
    pub(crate) fn new(event: EventName, handler: BoxedHandler) -> Self {
        Self {
            id: SubscriptionId::new(),
            event,
            handler,
            subscribed_at: Utc::now(),
        }
    }

    pub(crate) fn id(&self) -> SubscriptionId {
        self.id
    }

    pub(crate) fn event(&self) -> &EventName {
        &self.event
    }

    pub(crate) fn handler(&self) -> &BoxedHandler {
        &self.handler
    }

    pub(crate) fn subscribed_at(&self) -> DateTime<Utc> {
        self.subscribed_at
    }
}

impl core::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("event", &self.event)
            .field("subscribed_at", &self.subscribed_at)
            .finish_non_exhaustive()
    }
}

/// Ordered, keyed collection of subscriptions.
///
/// Lookups compare event names for exact equality. Iteration yields
/// subscriptions in the order they were added.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    entries: Vec<Subscription>,
}

impl Registry {
    /// Add a subscription, rejecting a second handler for the same event.
    pub(crate) fn insert(&mut self, subscription: Subscription) -> BusResult<&Subscription> {
        if self.get(subscription.event.as_str()).is_some() {
            return Err(BusError::duplicate(subscription.event.as_str()));
        }
        self.entries.push(subscription);
        let last = self.entries.len() - 1;
        Ok(&self.entries[last])
    }

    /// Remove the subscription for `event`, if any.
    pub(crate) fn remove(&mut self, event: &str) -> Option<Subscription> {
        let index = self.entries.iter().position(|s| s.event == event)?;
        // `remove`, not `swap_remove`: keep insertion order.
        Some(self.entries.remove(index))
    }

    pub(crate) fn get(&self, event: &str) -> Option<&Subscription> {
        self.entries.iter().find(|s| s.event == event)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Subscription> {
        self.entries.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
