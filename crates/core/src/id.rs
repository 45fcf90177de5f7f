//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::Deserialize;

use crate::error::DomainError;

/// Identifier of an inventory item.
///
/// Assigned by the store, strictly increasing over the store's lifetime and
/// never reused after a deletion.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(transparent)]
pub struct ItemId(u64);

impl ItemId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// The identifier that follows this one.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl core::fmt::Display for ItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<u64> for ItemId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<ItemId> for u64 {
    fn from(value: ItemId) -> Self {
        value.0
    }
}

impl TryFrom<i64> for ItemId {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u64::try_from(value)
            .map(Self)
            .map_err(|_| DomainError::invalid_id(format!("ItemId: negative value {value}")))
    }
}

impl FromStr for ItemId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s
            .trim()
            .parse::<u64>()
            .map_err(|e| DomainError::invalid_id(format!("ItemId: {e}")))?;
        Ok(Self(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays() {
        let id: ItemId = " 42 ".parse().unwrap();
        assert_eq!(id, ItemId::new(42));
        assert_eq!(id.to_string(), "42");
        assert_eq!(id.next(), ItemId::new(43));
    }

    #[test]
    fn rejects_garbage_and_negatives() {
        assert!(matches!("abc".parse::<ItemId>(), Err(DomainError::InvalidId(_))));
        assert!(matches!(ItemId::try_from(-1_i64), Err(DomainError::InvalidId(_))));
        assert_eq!(ItemId::try_from(7_i64), Ok(ItemId::new(7)));
    }
}
