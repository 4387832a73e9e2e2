//! Deferred arrays: nothing is read until first access, and read
//! failures surface at access time with the right classification.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use resq_core::ChunkError;
use resq_property::PropertyError;
use resq_store::{save, save_to, ChunkSource, MemorySource, Store, StoreConfig, StoreError};
use resq_test_utils::sample_model;

/// Counts reads past the header and optionally stalls them.
struct ProbeSource {
    inner: MemorySource,
    chunk_reads: AtomicUsize,
    stall: Option<Duration>,
}

impl ProbeSource {
    fn new(bytes: Vec<u8>, stall: Option<Duration>) -> Self {
        Self {
            inner: MemorySource::from(bytes),
            chunk_reads: AtomicUsize::new(0),
            stall,
        }
    }
}

impl ChunkSource for ProbeSource {
    fn size(&self) -> io::Result<u64> {
        self.inner.size()
    }

    fn read_at(&self, offset: u64, len: usize) -> io::Result<Vec<u8>> {
        if offset > 0 {
            self.chunk_reads.fetch_add(1, Ordering::SeqCst);
            if let Some(stall) = self.stall {
                thread::sleep(stall);
            }
        }
        self.inner.read_at(offset, len)
    }
}

fn saved_sample() -> (Vec<u8>, Vec<u8>, resq_test_utils::SampleIds) {
    let (model, ids) = sample_model();
    let (mut meta, mut chunks) = (Vec::new(), Vec::new());
    save_to(&model, &mut meta, &mut chunks).unwrap();
    (meta, chunks, ids)
}

#[test]
fn arrays_stay_unread_until_accessed() {
    let (meta, chunks, ids) = saved_sample();
    let source = Arc::new(ProbeSource::new(chunks, None));
    let model = Store::default().load_from(meta.as_slice(), source.clone()).unwrap();
    assert_eq!(source.chunk_reads.load(Ordering::SeqCst), 0);

    let porosity = model.property(ids.porosity).unwrap();
    assert!(!porosity.data().is_loaded());
    // Statistics and lengths come from the document.
    assert_eq!(porosity.statistics().defined, 3);
    assert_eq!(porosity.data().len(), 4);
    assert_eq!(model.grid(ids.grid).unwrap().defined_cell_count(), 4);
    assert_eq!(source.chunk_reads.load(Ordering::SeqCst), 0);

    let values = porosity.continuous_values().unwrap().unwrap();
    assert_eq!(values[0], 0.21);
    assert!(values[2].is_nan());
    assert!(porosity.data().is_loaded());
    assert_eq!(source.chunk_reads.load(Ordering::SeqCst), 1);

    // A second access is served from memory.
    porosity.continuous_values().unwrap();
    assert_eq!(source.chunk_reads.load(Ordering::SeqCst), 1);
}

#[test]
fn concurrent_first_access_reads_once() {
    let (meta, chunks, ids) = saved_sample();
    let source = Arc::new(ProbeSource::new(chunks, Some(Duration::from_millis(20))));
    let model = Store::default().load_from(meta.as_slice(), source.clone()).unwrap();
    let grid = model.grid(ids.grid).unwrap();
    thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                assert!((grid.cell_volume(1, 1, 0).unwrap() - 50_000.0).abs() < 1e-6);
            });
        }
    });
    assert_eq!(source.chunk_reads.load(Ordering::SeqCst), 1);
}

#[test]
fn stalled_read_times_out() {
    let (meta, chunks, ids) = saved_sample();
    let source = Arc::new(ProbeSource::new(chunks, Some(Duration::from_millis(500))));
    let store = Store::new(StoreConfig::new().with_io_timeout(Some(Duration::from_millis(20)))).unwrap();
    let model = store.load_from(meta.as_slice(), source).unwrap();

    let err = model
        .property(ids.pressure)
        .unwrap()
        .continuous_values()
        .unwrap_err();
    let PropertyError::Chunk(chunk_err) = err else {
        panic!("expected a chunk error, got {err:?}");
    };
    assert!(matches!(chunk_err, ChunkError::Timeout { .. }));
    assert!(matches!(
        StoreError::from(chunk_err),
        StoreError::IoTimeout { waited } if waited == Duration::from_millis(20)
    ));
}

#[test]
fn failed_load_is_retried_on_next_access() {
    let (meta, chunks, ids) = saved_sample();
    let source = Arc::new(ProbeSource::new(chunks, Some(Duration::from_millis(300))));
    let store = Store::new(StoreConfig::new().with_io_timeout(Some(Duration::from_millis(20)))).unwrap();
    let model = store.load_from(meta.as_slice(), source.clone()).unwrap();
    let facies = model.property(ids.facies).unwrap();
    assert!(facies.discrete_values().is_err());
    assert!(!facies.data().is_loaded());
    assert!(facies.discrete_values().is_err());
    assert_eq!(source.chunk_reads.load(Ordering::SeqCst), 2);
}

#[test]
fn vanished_chunk_store_is_an_io_error() {
    let (model, ids) = sample_model();
    let dir = std::env::temp_dir().join(format!("resq-store-{}-vanished", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let dest = dir.join("model");
    save(&model, &dest).unwrap();
    let loaded = resq_store::load(&dest).unwrap();
    std::fs::remove_file(dir.join("model.chunks")).unwrap();

    let err = loaded.property(ids.facies).unwrap().discrete_values().unwrap_err();
    assert!(matches!(
        err,
        PropertyError::Chunk(ChunkError::Io {
            kind: io::ErrorKind::NotFound,
            ..
        })
    ));
}
