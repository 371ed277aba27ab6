//! Bus error model.

use thiserror::Error;

/// Result type used across the bus.
pub type BusResult<T> = Result<T, BusError>;

/// Bus-level error.
///
/// Every variant is reported synchronously to the caller of the operation
/// that triggered it. Nothing is retried internally. Failures raised by
/// handlers during dispatch never surface here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    /// A parameter failed validation (e.g. a blank event name or an unknown option).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A handler is already registered for the event.
    #[error("handler already registered to event: {event}")]
    DuplicateSubscription { event: String },

    /// Configuration was supplied after the instance was constructed.
    #[error("configuration is not allowed on an already created instance")]
    ConfigurationNotAllowed,

    /// The singleton was constructed outside of its holder.
    #[error("constructor should not be used to create singletons, use instance()")]
    DirectConstructionForbidden,
}

impl BusError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn duplicate(event: impl Into<String>) -> Self {
        Self::DuplicateSubscription {
            event: event.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_event() {
        let err = BusError::duplicate("orders");
        assert_eq!(err.to_string(), "handler already registered to event: orders");

        let err = BusError::invalid_argument("event must not be empty");
        assert_eq!(err.to_string(), "invalid argument: event must not be empty");
    }
}
