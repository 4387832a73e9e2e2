//! Store configuration and validation.

use std::error::Error;
use std::fmt;
use std::time::Duration;

/// Errors detected by [`StoreConfig::validate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// An I/O timeout of zero would fail every read.
    ZeroTimeout,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroTimeout => write!(f, "io_timeout must be non-zero (use None to disable)"),
        }
    }
}

impl Error for ConfigError {}

/// Tunables for saving and loading containers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    /// Deadline for a single file read. `None` waits indefinitely.
    /// Default: [`DEFAULT_IO_TIMEOUT`](Self::DEFAULT_IO_TIMEOUT).
    pub io_timeout: Option<Duration>,
    /// Verify chunk checksums when loading. Default: `true`.
    pub verify_checksums: bool,
}

impl StoreConfig {
    /// Default per-read deadline.
    pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(30);

    /// Default configuration.
    pub fn new() -> Self {
        Self {
            io_timeout: Some(Self::DEFAULT_IO_TIMEOUT),
            verify_checksums: true,
        }
    }

    /// Set the per-read deadline.
    pub fn with_io_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.io_timeout = timeout;
        self
    }

    /// Enable or disable checksum verification.
    pub fn with_verify_checksums(mut self, verify: bool) -> Self {
        self.verify_checksums = verify;
        self
    }

    /// Check structural constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.io_timeout == Some(Duration::ZERO) {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = StoreConfig::default();
        assert_eq!(c.io_timeout, Some(Duration::from_secs(30)));
        assert!(c.verify_checksums);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn zero_timeout_rejected() {
        let c = StoreConfig::new().with_io_timeout(Some(Duration::ZERO));
        assert_eq!(c.validate(), Err(ConfigError::ZeroTimeout));
        assert!(StoreConfig::new().with_io_timeout(None).validate().is_ok());
    }
}
