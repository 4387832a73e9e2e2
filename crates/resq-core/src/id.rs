//! Strongly-typed entity identifiers.

use std::fmt;

/// Identifies an entity (CRS, grid, property) within a model.
///
/// Identifiers are assigned by the registry from a monotonic counter and
/// are never reused for the lifetime of that registry, even after the
/// entity they named has been removed. Loaded models keep the ids stored
/// in the container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

impl EntityId {
    /// The raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_raw_value() {
        assert_eq!(EntityId(42).to_string(), "42");
    }

    #[test]
    fn ordering_follows_value() {
        assert!(EntityId(1) < EntityId(2));
        assert_eq!(EntityId::from(7).get(), 7);
    }
}
