//! Registry error types.

use std::error::Error;
use std::fmt;

use resq_core::EntityId;

/// Graph-consistency errors raised by the [`Registry`](crate::Registry).
///
/// These are never repaired automatically; the caller decides whether to
/// cascade, re-point, or abandon the operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// The entity already carries an id, or the id is already taken.
    DuplicateEntity {
        /// The conflicting id.
        id: EntityId,
    },
    /// No entity with this id is registered.
    UnknownEntity {
        /// The missing id.
        id: EntityId,
    },
    /// Removal without cascade of an entity that others still reference.
    DanglingReference {
        /// The entity whose removal was refused.
        id: EntityId,
        /// Entities that reference it directly.
        referrers: Vec<EntityId>,
    },
    /// The operation would make the reference graph cyclic.
    CycleDetected {
        /// The entity whose reference would close the cycle.
        from: EntityId,
        /// The reference target.
        to: EntityId,
    },
    /// A re-point named a reference the entity does not hold.
    MissingReference {
        /// The entity being re-pointed.
        referrer: EntityId,
        /// The reference it does not hold.
        target: EntityId,
    },
    /// No id remains after `id`; the counter cannot advance.
    IdSpaceExhausted {
        /// The id that would have overflowed the counter.
        id: EntityId,
    },
    /// An in-place update tried to change identity or references.
    ReferencesChanged {
        /// The entity being updated.
        id: EntityId,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateEntity { id } => write!(f, "entity {id} is already registered"),
            Self::UnknownEntity { id } => write!(f, "unknown entity {id}"),
            Self::DanglingReference { id, referrers } => {
                write!(f, "entity {id} is still referenced by ")?;
                for (i, r) in referrers.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{r}")?;
                }
                Ok(())
            }
            Self::CycleDetected { from, to } => {
                write!(f, "reference {from} -> {to} would create a cycle")
            }
            Self::MissingReference { referrer, target } => {
                write!(f, "entity {referrer} does not reference {target}")
            }
            Self::IdSpaceExhausted { id } => {
                write!(f, "id space exhausted after entity {id}")
            }
            Self::ReferencesChanged { id } => {
                write!(f, "update of entity {id} changed its identity or references")
            }
        }
    }
}

impl Error for RegistryError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dangling_lists_referrers() {
        let err = RegistryError::DanglingReference {
            id: EntityId(1),
            referrers: vec![EntityId(2), EntityId(5)],
        };
        assert_eq!(err.to_string(), "entity 1 is still referenced by 2, 5");
    }
}
