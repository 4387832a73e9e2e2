//! Error types shared across the workspace.
//!
//! [`ChunkError`] is raised when a deferred array cannot be materialised
//! from its chunk store. [`UnitParseError`] is raised when a unit symbol
//! is not a member of the relevant closed enumeration.

use std::error::Error;
use std::fmt;
use std::io;
use std::time::Duration;

use crate::array::{ChunkKey, Dtype};

/// Errors raised while loading a deferred array.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChunkError {
    /// The chunk store has no chunk for this key.
    Missing {
        /// Entity and attribute that were requested.
        key: ChunkKey,
    },
    /// The chunk exists but its bytes are unusable (short read,
    /// checksum mismatch, out-of-range byte range).
    Corrupt {
        /// Entity and attribute that were requested.
        key: ChunkKey,
        /// What was wrong with the bytes.
        detail: String,
    },
    /// The chunk decodes to a different element type than requested.
    DtypeMismatch {
        /// Entity and attribute that were requested.
        key: ChunkKey,
        /// Element type the caller expected.
        expected: Dtype,
        /// Element type recorded for the chunk.
        found: Dtype,
    },
    /// The chunk holds a different number of elements than the entity
    /// metadata declares.
    LengthMismatch {
        /// Entity and attribute that were requested.
        key: ChunkKey,
        /// Element count declared by the metadata.
        expected: usize,
        /// Element count actually decoded.
        found: usize,
    },
    /// The read did not complete before the configured deadline.
    Timeout {
        /// Entity and attribute that were requested.
        key: ChunkKey,
        /// How long the caller waited.
        waited: Duration,
    },
    /// The underlying read failed.
    Io {
        /// Entity and attribute that were requested.
        key: ChunkKey,
        /// The I/O error kind.
        kind: io::ErrorKind,
        /// The I/O error message.
        detail: String,
    },
}

impl ChunkError {
    /// The key of the array that failed to load.
    pub fn key(&self) -> &ChunkKey {
        match self {
            Self::Missing { key }
            | Self::Corrupt { key, .. }
            | Self::DtypeMismatch { key, .. }
            | Self::LengthMismatch { key, .. }
            | Self::Timeout { key, .. }
            | Self::Io { key, .. } => key,
        }
    }

    /// Build an [`Io`](ChunkError::Io) variant from an `io::Error`.
    pub fn io(key: ChunkKey, err: &io::Error) -> Self {
        Self::Io {
            key,
            kind: err.kind(),
            detail: err.to_string(),
        }
    }
}

impl fmt::Display for ChunkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { key } => write!(f, "chunk {key} not present in store"),
            Self::Corrupt { key, detail } => write!(f, "chunk {key} is corrupt: {detail}"),
            Self::DtypeMismatch {
                key,
                expected,
                found,
            } => write!(f, "chunk {key} holds {found}, expected {expected}"),
            Self::LengthMismatch {
                key,
                expected,
                found,
            } => write!(
                f,
                "chunk {key} holds {found} elements, metadata declares {expected}"
            ),
            Self::Timeout { key, waited } => {
                write!(f, "reading chunk {key} timed out after {waited:?}")
            }
            Self::Io { key, detail, .. } => write!(f, "reading chunk {key} failed: {detail}"),
        }
    }
}

impl Error for ChunkError {}

/// A unit symbol that is not a member of the closed enumeration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitParseError {
    /// Unit family that was being parsed (`"length"`, `"angle"`, `"property"`).
    pub family: &'static str,
    /// The rejected input.
    pub input: String,
}

impl UnitParseError {
    /// Construct an error for `input` in `family`.
    pub fn new(family: &'static str, input: impl Into<String>) -> Self {
        Self {
            family,
            input: input.into(),
        }
    }
}

impl fmt::Display for UnitParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a recognised {} unit", self.input, self.family)
    }
}

impl Error for UnitParseError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::EntityId;

    #[test]
    fn display_names_entity_and_attribute() {
        let err = ChunkError::Missing {
            key: ChunkKey::new(EntityId(7), "values"),
        };
        assert_eq!(err.to_string(), "chunk 7/values not present in store");
    }

    #[test]
    fn io_variant_keeps_kind() {
        let io_err = io::Error::new(io::ErrorKind::UnexpectedEof, "short");
        let err = ChunkError::io(ChunkKey::new(EntityId(1), "corner_points"), &io_err);
        assert!(matches!(
            err,
            ChunkError::Io {
                kind: io::ErrorKind::UnexpectedEof,
                ..
            }
        ));
        assert_eq!(err.key().entity, EntityId(1));
    }

    #[test]
    fn errors_are_send_sync() {
        fn assert_bounds<T: Send + Sync + Error>() {}
        assert_bounds::<ChunkError>();
        assert_bounds::<UnitParseError>();
    }
}
