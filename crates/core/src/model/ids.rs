use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Reserved separator of the persisted mastery record. Never valid inside an identifier.
pub const RECORD_DELIMITER: char = '|';

/// Errors raised while building an `ItemId`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ItemIdError {
    #[error("item identifier cannot be empty")]
    Empty,

    #[error("item identifier `{0}` contains the reserved `|` delimiter")]
    ContainsDelimiter(String),
}

/// Stable identifier of a quiz item (the country name in the flag quiz).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(String);

impl ItemId {
    /// Creates a new `ItemId`.
    ///
    /// # Errors
    ///
    /// Returns `ItemIdError` if the value is empty or contains the record delimiter.
    pub fn new(value: impl Into<String>) -> Result<Self, ItemIdError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ItemIdError::Empty);
        }
        if value.contains(RECORD_DELIMITER) {
            return Err(ItemIdError::ContainsDelimiter(value));
        }
        Ok(Self(value))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemId({:?})", self.0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ItemId {
    type Err = ItemIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ItemId {
    type Error = ItemIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

impl Borrow<str> for ItemId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_id_display() {
        let id = ItemId::new("France").unwrap();
        assert_eq!(id.to_string(), "France");
    }

    #[test]
    fn item_id_keeps_inner_spaces() {
        let id: ItemId = "Bosnia and Herzegovina".parse().unwrap();
        assert_eq!(id.as_str(), "Bosnia and Herzegovina");
    }

    #[test]
    fn item_id_rejects_empty() {
        assert_eq!(ItemId::new("").unwrap_err(), ItemIdError::Empty);
    }

    #[test]
    fn item_id_rejects_delimiter() {
        let err = "Trinidad|Tobago".parse::<ItemId>().unwrap_err();
        assert!(matches!(err, ItemIdError::ContainsDelimiter(_)));
    }
}
