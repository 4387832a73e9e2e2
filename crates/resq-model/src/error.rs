//! Model error types.

use std::error::Error;
use std::fmt;

use resq_core::{EntityId, EntityKind};
use resq_crs::CrsError;
use resq_grid::GridError;
use resq_property::PropertyError;
use resq_registry::RegistryError;

/// Errors raised by [`Model`](crate::Model) operations.
#[derive(Clone, Debug, PartialEq)]
pub enum ModelError {
    /// Graph consistency failure from the registry.
    Registry(RegistryError),
    /// CRS definition failure.
    Crs(CrsError),
    /// Grid validation or geometry query failure.
    Grid(GridError),
    /// Property validation failure.
    Property(PropertyError),
    /// The entity exists but is of a different kind.
    WrongKind {
        /// The entity looked up.
        id: EntityId,
        /// Kind the operation needs.
        expected: EntityKind,
        /// Kind actually registered.
        found: EntityKind,
    },
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registry(e) => write!(f, "registry: {e}"),
            Self::Crs(e) => write!(f, "crs: {e}"),
            Self::Grid(e) => write!(f, "grid: {e}"),
            Self::Property(e) => write!(f, "property: {e}"),
            Self::WrongKind {
                id,
                expected,
                found,
            } => write!(f, "entity {id} is a {found}, expected a {expected}"),
        }
    }
}

impl Error for ModelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Registry(e) => Some(e),
            Self::Crs(e) => Some(e),
            Self::Grid(e) => Some(e),
            Self::Property(e) => Some(e),
            Self::WrongKind { .. } => None,
        }
    }
}

impl From<RegistryError> for ModelError {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

impl From<CrsError> for ModelError {
    fn from(e: CrsError) -> Self {
        Self::Crs(e)
    }
}

impl From<GridError> for ModelError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}

impl From<PropertyError> for ModelError {
    fn from(e: PropertyError) -> Self {
        Self::Property(e)
    }
}
