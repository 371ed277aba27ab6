//! Validated event names.

use core::borrow::Borrow;
use serde::{Deserialize, Serialize};

use crate::error::{BusError, BusResult};
use crate::value_object::ValueObject;

/// Name of a class of notifications (e.g. `"orders"`, `"inventory.item.created"`).
///
/// Always non-empty and never all whitespace. Matching is exact: `"order"`
/// and `"orders"` are unrelated events.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EventName(String);

impl ValueObject for EventName {}

impl EventName {
    pub fn new(name: impl Into<String>) -> BusResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(BusError::invalid_argument("event must be a non-empty string"));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl core::fmt::Display for EventName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EventName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for EventName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EventName {
    type Error = BusError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for EventName {
    type Error = BusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EventName> for String {
    fn from(value: EventName) -> Self {
        value.0
    }
}

impl PartialEq<str> for EventName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for EventName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn blank_names_are_rejected() {
        for name in ["", " ", "\t\n"] {
            let err = EventName::new(name).unwrap_err();
            assert!(matches!(err, BusError::InvalidArgument(_)), "{name:?} accepted");
        }
    }

    #[test]
    fn names_compare_exactly() {
        let orders = EventName::new("orders").unwrap();
        assert_eq!(orders, "orders");
        assert_ne!(orders, EventName::new("order").unwrap());
        assert_ne!(orders, EventName::new("orders ").unwrap());
    }

    #[test]
    fn deserialization_validates() {
        let name: EventName = serde_json::from_str("\"orders\"").unwrap();
        assert_eq!(name.as_str(), "orders");
        assert!(serde_json::from_str::<EventName>("\"  \"").is_err());
    }

    proptest! {
        #[test]
        fn any_name_with_a_visible_char_is_accepted(name in "[ ]{0,3}[a-z.]{1,16}[ ]{0,3}") {
            let event = EventName::new(name.clone()).unwrap();
            prop_assert_eq!(event.as_str(), name.as_str());
        }
    }
}
