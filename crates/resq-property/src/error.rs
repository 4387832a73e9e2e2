//! Property error types.

use std::error::Error;
use std::fmt;

use resq_core::{ChunkError, IndexableElement};

use crate::kind::{DataType, PropertyKind};

/// Validation errors raised when attaching a property to a grid.
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyError {
    /// The grid has not been registered.
    UnregisteredGrid,
    /// The value array does not have one entry per domain element.
    ArrayShapeMismatch {
        /// Indexable domain of the property.
        domain: IndexableElement,
        /// Element count of the domain on the grid.
        expected: usize,
        /// Values supplied.
        found: usize,
    },
    /// Discrete data without a non-empty lookup table.
    MissingLookupTable,
    /// A discrete value has no label in the lookup table.
    CodeNotInLookup {
        /// The unlabelled code.
        code: i64,
        /// Position of the first occurrence.
        index: usize,
    },
    /// Values of the wrong data type for the kind.
    KindMismatch {
        /// The property kind.
        kind: PropertyKind,
        /// The data type supplied.
        found: DataType,
    },
    /// A lookup table or null value on non-discrete data.
    InvalidSpec {
        /// What was wrong.
        reason: &'static str,
    },
    /// Reading deferred values failed.
    Chunk(ChunkError),
}

impl fmt::Display for PropertyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnregisteredGrid => write!(f, "grid must be registered before attaching properties"),
            Self::ArrayShapeMismatch {
                domain,
                expected,
                found,
            } => write!(
                f,
                "property over {domain} needs {expected} values, got {found}"
            ),
            Self::MissingLookupTable => write!(f, "discrete property requires a non-empty lookup table"),
            Self::CodeNotInLookup { code, index } => {
                write!(f, "code {code} at index {index} is not in the lookup table")
            }
            Self::KindMismatch { kind, found } => write!(
                f,
                "kind '{kind}' requires {} data, got {found}",
                kind.natural_data_type()
            ),
            Self::InvalidSpec { reason } => write!(f, "invalid property spec: {reason}"),
            Self::Chunk(e) => write!(f, "property values unavailable: {e}"),
        }
    }
}

impl Error for PropertyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Chunk(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ChunkError> for PropertyError {
    fn from(e: ChunkError) -> Self {
        Self::Chunk(e)
    }
}
