//! Error types for saving and loading containers.

use std::fmt;
use std::io;
use std::time::Duration;

use resq_core::{ChunkError, EntityId};

use crate::config::ConfigError;

/// Errors raised by the store.
///
/// Corruption, version and timeout failures are reported as found and
/// never retried.
#[derive(Debug)]
pub enum StoreError {
    /// The underlying read or write failed.
    Io(io::Error),
    /// A read did not complete before the configured deadline.
    IoTimeout {
        /// How long the caller waited.
        waited: Duration,
    },
    /// The container is unreadable: bad magic, missing or short chunk,
    /// checksum mismatch, malformed document or invalid enum value.
    CorruptContainer {
        /// Entity the problem was found in, when known.
        entity: Option<EntityId>,
        /// Attribute or array the problem was found in, when known.
        attribute: Option<String>,
        /// What was wrong.
        detail: String,
    },
    /// The document or chunk store was written by a newer format.
    SchemaVersion {
        /// Version found.
        found: u32,
        /// Newest version this build reads.
        supported: u32,
    },
    /// The model could not be encoded.
    Encode {
        /// What failed.
        detail: String,
    },
    /// Invalid [`StoreConfig`](crate::StoreConfig).
    Config(ConfigError),
}

impl StoreError {
    /// A [`CorruptContainer`](Self::CorruptContainer) error with no location.
    pub fn corrupt(detail: impl Into<String>) -> Self {
        Self::CorruptContainer {
            entity: None,
            attribute: None,
            detail: detail.into(),
        }
    }

    /// A [`CorruptContainer`](Self::CorruptContainer) error located at
    /// `entity` and `attribute`.
    pub fn corrupt_at(entity: EntityId, attribute: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::CorruptContainer {
            entity: Some(entity),
            attribute: Some(attribute.into()),
            detail: detail.into(),
        }
    }

    /// Classify an I/O error, turning a missed deadline into
    /// [`IoTimeout`](Self::IoTimeout).
    pub(crate) fn from_io(err: io::Error, timeout: Option<Duration>) -> Self {
        match (err.kind(), timeout) {
            (io::ErrorKind::TimedOut, Some(waited)) => Self::IoTimeout { waited },
            _ => Self::Io(err),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::IoTimeout { waited } => write!(f, "read timed out after {waited:?}"),
            Self::CorruptContainer {
                entity,
                attribute,
                detail,
            } => {
                write!(f, "corrupt container")?;
                if let Some(id) = entity {
                    write!(f, " at entity {id}")?;
                }
                if let Some(attr) = attribute {
                    write!(f, " ({attr})")?;
                }
                write!(f, ": {detail}")
            }
            Self::SchemaVersion { found, supported } => write!(
                f,
                "format version {found} is newer than supported version {supported}"
            ),
            Self::Encode { detail } => write!(f, "cannot encode model: {detail}"),
            Self::Config(e) => write!(f, "invalid store config: {e}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<ConfigError> for StoreError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Failures of deferred loads surface as container corruption located at
/// the chunk's entity and attribute, except for timeouts and plain I/O.
impl From<ChunkError> for StoreError {
    fn from(e: ChunkError) -> Self {
        let key = e.key().clone();
        match e {
            ChunkError::Timeout { waited, .. } => Self::IoTimeout { waited },
            ChunkError::Io { kind, detail, .. } => Self::Io(io::Error::new(kind, detail)),
            other => Self::corrupt_at(key.entity, key.attribute, other.to_string()),
        }
    }
}
