//! Opaque notification payloads.

use std::any::Any;
use std::sync::Arc;

/// A value delivered to a handler on notification.
///
/// The bus never looks inside; handlers recover the concrete type with
/// [`Payload::downcast_ref`] or [`Payload::downcast`]. Cloning is cheap
/// (reference counted).
#[derive(Clone)]
pub struct Payload(Arc<dyn Any + Send + Sync>);

impl Payload {
    /// Wrap a value.
    ///
    /// Wrapping a `Payload` again returns it unchanged instead of nesting it.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        let boxed: Box<dyn Any + Send + Sync> = Box::new(value);
        match boxed.downcast::<Payload>() {
            Ok(payload) => *payload,
            Err(boxed) => Self(Arc::from(boxed)),
        }
    }

    pub fn is<T: Any>(&self) -> bool {
        (*self.0).is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (*self.0).downcast_ref::<T>()
    }

    /// Take shared ownership of the inner value, or get the payload back
    /// if it holds a different type.
    pub fn downcast<T: Any + Send + Sync>(self) -> Result<Arc<T>, Self> {
        self.0.downcast::<T>().map_err(Self)
    }
}

impl core::fmt::Debug for Payload {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Payload").finish_non_exhaustive()
    }
}
