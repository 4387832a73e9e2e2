//! Mock [`ChunkLoader`] implementations.
//!
//! - [`MemoryChunkLoader`] serves buffers from a map and counts loads.
//! - [`FailingChunkLoader`] fails every load with a fixed error.
//! - [`SlowChunkLoader`] delays another loader.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use resq_core::{ArrayBuffer, ArrayElement, ChunkError, ChunkKey, ChunkLoader, EntityId};

/// Serves pre-registered buffers and counts every load.
#[derive(Default)]
pub struct MemoryChunkLoader {
    chunks: HashMap<ChunkKey, ArrayBuffer>,
    loads: AtomicUsize,
}

impl MemoryChunkLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `values` under `(entity, attribute)`.
    pub fn insert<T: ArrayElement>(&mut self, entity: EntityId, attribute: &str, values: &[T]) -> ChunkKey {
        let key = ChunkKey::new(entity, attribute);
        self.chunks.insert(key.clone(), T::to_buffer(values));
        key
    }

    /// Loads served so far, failed ones included.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl ChunkLoader for MemoryChunkLoader {
    fn load(&self, key: &ChunkKey) -> Result<ArrayBuffer, ChunkError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.chunks
            .get(key)
            .cloned()
            .ok_or_else(|| ChunkError::Missing { key: key.clone() })
    }
}

/// Fails every load with a copy of one error, re-keyed to the request.
pub struct FailingChunkLoader {
    error: ChunkError,
    attempts: AtomicUsize,
}

impl FailingChunkLoader {
    pub fn new(error: ChunkError) -> Self {
        Self {
            error,
            attempts: AtomicUsize::new(0),
        }
    }

    /// A loader reporting every chunk as missing.
    pub fn missing() -> Self {
        Self::new(ChunkError::Missing {
            key: ChunkKey::new(EntityId(0), ""),
        })
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl ChunkLoader for FailingChunkLoader {
    fn load(&self, key: &ChunkKey) -> Result<ArrayBuffer, ChunkError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let key = key.clone();
        Err(match self.error.clone() {
            ChunkError::Missing { .. } => ChunkError::Missing { key },
            ChunkError::Corrupt { detail, .. } => ChunkError::Corrupt { key, detail },
            ChunkError::DtypeMismatch {
                expected, found, ..
            } => ChunkError::DtypeMismatch {
                key,
                expected,
                found,
            },
            ChunkError::LengthMismatch {
                expected, found, ..
            } => ChunkError::LengthMismatch {
                key,
                expected,
                found,
            },
            ChunkError::Timeout { waited, .. } => ChunkError::Timeout { key, waited },
            ChunkError::Io { kind, detail, .. } => ChunkError::Io { key, kind, detail },
        })
    }
}

/// Sleeps for a fixed delay before delegating.
pub struct SlowChunkLoader<L> {
    inner: L,
    delay: Duration,
}

impl<L: ChunkLoader> SlowChunkLoader<L> {
    pub fn new(inner: L, delay: Duration) -> Self {
        Self { inner, delay }
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }
}

impl<L: ChunkLoader> ChunkLoader for SlowChunkLoader<L> {
    fn load(&self, key: &ChunkKey) -> Result<ArrayBuffer, ChunkError> {
        thread::sleep(self.delay);
        self.inner.load(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_loader_counts_loads() {
        let mut loader = MemoryChunkLoader::new();
        let key = loader.insert(EntityId(4), "values", &[1.0f64, 2.0]);
        assert_eq!(loader.load(&key).unwrap(), ArrayBuffer::F64(vec![1.0, 2.0]));
        assert!(loader.load(&ChunkKey::new(EntityId(5), "values")).is_err());
        assert_eq!(loader.load_count(), 2);
    }

    #[test]
    fn failing_loader_rekeys_error() {
        let loader = FailingChunkLoader::missing();
        let key = ChunkKey::new(EntityId(9), "corner_points");
        assert_eq!(loader.load(&key), Err(ChunkError::Missing { key: key.clone() }));
        assert_eq!(loader.attempts(), 1);
    }
}
