//! `cyberbus-core` — shared building blocks of the event bus.
//!
//! This crate contains the error taxonomy and the small value types that the
//! bus validates its inputs into. No threading or dispatch lives here.

pub mod error;
pub mod event_name;
pub mod id;
pub mod value_object;

pub use error::{BusError, BusResult};
pub use event_name::EventName;
pub use id::SubscriptionId;
pub use value_object::ValueObject;
