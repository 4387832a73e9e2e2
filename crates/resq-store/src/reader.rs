//! Container reader.
//!
//! The metadata document is parsed and validated eagerly; array payloads
//! stay in the chunk store until a [`LazyArray`](resq_core::LazyArray)
//! asks for them.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::RecvTimeoutError;
use serde_json::Value;
use tracing::{debug, info, warn};

use resq_core::{ArrayBuffer, ChunkError, ChunkKey, ChunkLoader, EntityId};
use resq_model::Model;

use crate::codec::{decode_header, decode_scalars, ByteOrder, HEADER_LEN};
use crate::config::StoreConfig;
use crate::document::{self, ChunkSpan, Document, FORMAT_NAME, SCHEMA_VERSION};
use crate::error::StoreError;
use crate::hash::chunk_checksum;

/// Random-access byte source backing a chunk store.
pub trait ChunkSource: Send + Sync {
    /// Total size in bytes.
    fn size(&self) -> io::Result<u64>;

    /// Read exactly `len` bytes at `offset`.
    fn read_at(&self, offset: u64, len: usize) -> io::Result<Vec<u8>>;
}

/// A chunk store held in memory.
#[derive(Clone, Debug)]
pub struct MemorySource(Arc<[u8]>);

impl MemorySource {
    /// Wrap `bytes`.
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self(bytes.into())
    }
}

impl From<Vec<u8>> for MemorySource {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes.into())
    }
}

impl ChunkSource for MemorySource {
    fn size(&self) -> io::Result<u64> {
        Ok(self.0.len() as u64)
    }

    fn read_at(&self, offset: u64, len: usize) -> io::Result<Vec<u8>> {
        let start = usize::try_from(offset).map_err(|_| io::Error::from(io::ErrorKind::UnexpectedEof))?;
        start
            .checked_add(len)
            .and_then(|end| self.0.get(start..end))
            .map(<[u8]>::to_vec)
            .ok_or_else(|| io::Error::from(io::ErrorKind::UnexpectedEof))
    }
}

/// A chunk store on disk. Every read opens the file afresh.
#[derive(Clone, Debug)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// A source reading from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ChunkSource for FileSource {
    fn size(&self) -> io::Result<u64> {
        Ok(std::fs::metadata(&self.path)?.len())
    }

    fn read_at(&self, offset: u64, len: usize) -> io::Result<Vec<u8>> {
        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(offset))?;
        let mut buf = vec![0; len];
        file.read_exact(&mut buf)?;
        Ok(buf)
    }
}

/// Run `job` on a helper thread and wait at most `timeout` for it.
///
/// A missed deadline returns [`io::ErrorKind::TimedOut`]; the helper
/// thread is abandoned and finishes on its own. With no timeout the job
/// runs inline.
pub(crate) fn read_with_deadline<T, F>(timeout: Option<Duration>, job: F) -> io::Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> io::Result<T> + Send + 'static,
{
    let Some(timeout) = timeout else {
        return job();
    };
    let (tx, rx) = crossbeam_channel::bounded(1);
    thread::Builder::new()
        .name("resq-store-read".into())
        .spawn(move || {
            let _ = tx.send(job());
        })?;
    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => Err(io::Error::new(
            io::ErrorKind::TimedOut,
            format!("read did not complete within {timeout:?}"),
        )),
        Err(RecvTimeoutError::Disconnected) => {
            Err(io::Error::other("read thread exited without a result"))
        }
    }
}

/// Serves deferred arrays from a chunk store.
pub(crate) struct StoreLoader {
    source: Arc<dyn ChunkSource>,
    order: ByteOrder,
    verify: bool,
    timeout: Option<Duration>,
    index: BTreeMap<ChunkKey, ChunkSpan>,
}

impl StoreLoader {
    fn read(&self, key: &ChunkKey, span: &ChunkSpan) -> Result<Vec<u8>, ChunkError> {
        let source = Arc::clone(&self.source);
        let (offset, length) = (span.offset, span.length as usize);
        let bytes = read_with_deadline(self.timeout, move || source.read_at(offset, length))
            .map_err(|e| match (e.kind(), self.timeout) {
                (io::ErrorKind::TimedOut, Some(waited)) => ChunkError::Timeout {
                    key: key.clone(),
                    waited,
                },
                (io::ErrorKind::UnexpectedEof, _) => ChunkError::Corrupt {
                    key: key.clone(),
                    detail: format!("short read of {length} bytes at offset {offset}"),
                },
                _ => ChunkError::io(key.clone(), &e),
            })?;
        if bytes.len() != length {
            return Err(ChunkError::Corrupt {
                key: key.clone(),
                detail: format!("read {} of {length} bytes", bytes.len()),
            });
        }
        Ok(bytes)
    }
}

impl ChunkLoader for StoreLoader {
    fn load(&self, key: &ChunkKey) -> Result<ArrayBuffer, ChunkError> {
        let span = self
            .index
            .get(key)
            .ok_or_else(|| ChunkError::Missing { key: key.clone() })?;
        let bytes = self.read(key, span)?;
        if self.verify {
            let actual = chunk_checksum(&bytes);
            if actual != span.checksum {
                return Err(ChunkError::Corrupt {
                    key: key.clone(),
                    detail: format!(
                        "checksum mismatch: expected {:#018x}, got {actual:#018x}",
                        span.checksum
                    ),
                });
            }
        }
        let buf = decode_scalars(&bytes, span.dtype, self.order).ok_or_else(|| ChunkError::Corrupt {
            key: key.clone(),
            detail: format!("{} bytes are not whole {} scalars", bytes.len(), span.dtype),
        })?;
        debug!(%key, scalars = span.count, "loaded chunk");
        Ok(buf)
    }
}

/// Parse and version-check a metadata document.
pub(crate) fn parse_document(meta: impl Read) -> Result<Document, StoreError> {
    let value: Value = serde_json::from_reader(meta).map_err(|e| {
        if e.is_io() {
            StoreError::Io(e.into())
        } else {
            StoreError::corrupt(format!("metadata is not valid JSON: {e}"))
        }
    })?;
    if value.get("format").and_then(Value::as_str) != Some(FORMAT_NAME) {
        return Err(StoreError::corrupt("metadata is not a resq document"));
    }
    let version = value
        .get("schema_version")
        .and_then(Value::as_u64)
        .ok_or_else(|| StoreError::corrupt("metadata has no schema version"))?;
    if version > u64::from(SCHEMA_VERSION) {
        return Err(StoreError::SchemaVersion {
            found: u32::try_from(version).unwrap_or(u32::MAX),
            supported: SCHEMA_VERSION,
        });
    }
    serde_json::from_value(value).map_err(|e| StoreError::corrupt(format!("malformed metadata: {e}")))
}

/// Rebuild the model described by `doc` over its chunk store.
///
/// Every chunk address is checked against the store before any entity is
/// restored; arrays stay deferred.
pub(crate) fn read_model(
    config: &StoreConfig,
    doc: &Document,
    source: Arc<dyn ChunkSource>,
) -> Result<Model, StoreError> {
    let timeout = config.io_timeout;
    let declared: ByteOrder = doc.byte_order.parse().map_err(StoreError::corrupt)?;

    let store_len = {
        let source = Arc::clone(&source);
        read_with_deadline(timeout, move || source.size()).map_err(|e| StoreError::from_io(e, timeout))?
    };
    let header = {
        let source = Arc::clone(&source);
        let len = store_len.min(HEADER_LEN) as usize;
        read_with_deadline(timeout, move || source.read_at(0, len)).map_err(|e| StoreError::from_io(e, timeout))?
    };
    let order = decode_header(&header)?;
    if order != declared {
        return Err(StoreError::corrupt(format!(
            "chunk store is {order}-endian but the metadata declares {declared}"
        )));
    }
    if order != ByteOrder::NATIVE {
        warn!(stored = %order, native = %ByteOrder::NATIVE, "chunk store byte order differs from native; converting on load");
    }

    let mut index = BTreeMap::new();
    for record in &doc.entities {
        for array in &record.arrays {
            let key = ChunkKey::new(EntityId(record.id), array.attribute.as_str());
            let span = ChunkSpan::resolve(&key, &array.chunk, store_len)?;
            if index.insert(key, span).is_some() {
                return Err(StoreError::corrupt_at(
                    EntityId(record.id),
                    array.attribute.clone(),
                    "array listed twice",
                ));
            }
        }
    }
    let chunks = index.len();
    let loader = Arc::new(StoreLoader {
        source,
        order,
        verify: config.verify_checksums,
        timeout,
        index,
    });
    let shared: Arc<dyn ChunkLoader> = loader.clone();

    let mut model = Model::new();
    for record in &doc.entities {
        let object = document::restore(record, &model, &loader.index, &shared)?;
        model
            .restore(object)
            .map_err(|e| StoreError::corrupt_at(EntityId(record.id), "id", e.to_string()))?;
        debug!(entity = record.id, kind = %record.kind, "restored entity");
    }
    info!(entities = model.len(), chunks, byte_order = %order, "model loaded");
    Ok(model)
}

/// Load every deferred array of `model`.
pub(crate) fn prefetch_all(model: &Model) -> Result<(), StoreError> {
    for (id, object) in model.iter() {
        for (_, slot) in document::describe(id, object)?.arrays {
            slot.prefetch()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_source_bounds() {
        let src = MemorySource::from(vec![1, 2, 3, 4]);
        assert_eq!(src.size().unwrap(), 4);
        assert_eq!(src.read_at(1, 2).unwrap(), vec![2, 3]);
        assert_eq!(
            src.read_at(3, 2).unwrap_err().kind(),
            io::ErrorKind::UnexpectedEof
        );
        assert_eq!(
            src.read_at(u64::MAX, 1).unwrap_err().kind(),
            io::ErrorKind::UnexpectedEof
        );
    }

    #[test]
    fn deadline_passes_fast_jobs_through() {
        let v = read_with_deadline(Some(Duration::from_secs(5)), || Ok(7)).unwrap();
        assert_eq!(v, 7);
        let v = read_with_deadline(None, || Ok(8)).unwrap();
        assert_eq!(v, 8);
    }

    #[test]
    fn deadline_times_out_slow_jobs() {
        let err = read_with_deadline(Some(Duration::from_millis(10)), || {
            thread::sleep(Duration::from_millis(500));
            Ok(())
        })
        .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
    }

    #[test]
    fn deadline_propagates_job_errors() {
        let err = read_with_deadline::<(), _>(Some(Duration::from_secs(5)), || {
            Err(io::Error::from(io::ErrorKind::NotFound))
        })
        .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn unknown_format_rejected() {
        let err = parse_document(&br#"{"format":"other","schema_version":1}"#[..]).unwrap_err();
        assert!(matches!(err, StoreError::CorruptContainer { .. }));
    }

    #[test]
    fn newer_schema_rejected() {
        let err = parse_document(&br#"{"format":"resq","schema_version":7}"#[..]).unwrap_err();
        assert!(matches!(
            err,
            StoreError::SchemaVersion {
                found: 7,
                supported: 1
            }
        ));
    }

    #[test]
    fn invalid_json_is_corruption() {
        let err = parse_document(&b"{not json"[..]).unwrap_err();
        assert!(matches!(err, StoreError::CorruptContainer { .. }));
    }
}
