use std::sync::Arc;

use crate::Payload;

/// What a handler may return.
///
/// The bus discards the value. A failed `Result` is reported through
/// `tracing` by the worker that ran the handler and goes no further.
pub trait HandlerOutcome {
    /// Failure message, if the handler failed.
    fn into_failure(self) -> Option<String>;
}

impl HandlerOutcome for () {
    fn into_failure(self) -> Option<String> {
        None
    }
}

impl<E> HandlerOutcome for Result<(), E>
where
    E: core::fmt::Display,
{
    fn into_failure(self) -> Option<String> {
        self.err().map(|e| e.to_string())
    }
}

/// A type-erased handler as stored in the registry.
pub(crate) type BoxedHandler = Arc<dyn Fn(Payload) -> Option<String> + Send + Sync>;

pub(crate) fn boxed<F, R>(handler: F) -> BoxedHandler
where
    F: Fn(Payload) -> R + Send + Sync + 'static,
    R: HandlerOutcome,
{
    Arc::new(move |payload| handler(payload).into_failure())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_handlers_never_fail() {
        let handler = boxed(|_payload| {});
        assert_eq!(handler(Payload::new(())), None);
    }

    #[test]
    fn failed_results_carry_their_message() {
        let handler = boxed(|payload: Payload| match payload.downcast_ref::<u32>() {
            Some(_) => Ok(()),
            None => Err("expected a u32"),
        });
        assert_eq!(handler(Payload::new(1u32)), None);
        assert_eq!(handler(Payload::new("x")), Some("expected a u32".to_string()));
    }
}
