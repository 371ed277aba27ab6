//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. Two
/// event names with the same text are the same event, whichever caller
/// created them.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
