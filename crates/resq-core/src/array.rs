//! Bulk arrays that may be held in memory or deferred to a chunk store.
//!
//! A [`LazyArray`] is either materialised at construction (arrays built
//! by the application) or *deferred*: it remembers a [`ChunkKey`] and a
//! shared [`ChunkLoader`] and reads its payload on first
//! [`get`](LazyArray::get). The first load is serialised by a per-array
//! mutex; once loaded, reads go through a lock-free `OnceLock`.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, OnceLock};

use crate::error::ChunkError;
use crate::id::EntityId;
use crate::point::Point3;

/// Address of one array in a chunk store: owning entity plus attribute name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkKey {
    /// Entity the array belongs to.
    pub entity: EntityId,
    /// Attribute name within the entity (`"corner_points"`, `"values"`).
    pub attribute: String,
}

impl ChunkKey {
    /// Construct a key.
    pub fn new(entity: EntityId, attribute: impl Into<String>) -> Self {
        Self {
            entity,
            attribute: attribute.into(),
        }
    }
}

impl fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.entity, self.attribute)
    }
}

/// Scalar element type of a stored chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dtype {
    /// 64-bit IEEE-754 float.
    F64,
    /// 64-bit signed integer.
    I64,
}

impl Dtype {
    /// Width of one scalar in bytes.
    pub const fn size(self) -> usize {
        8
    }

    /// Stable name used in the metadata document.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::F64 => "f64",
            Self::I64 => "i64",
        }
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dtype {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "f64" => Ok(Self::F64),
            "i64" => Ok(Self::I64),
            other => Err(format!("unknown dtype '{other}'")),
        }
    }
}

/// Decoded scalar payload of one chunk.
#[derive(Clone, Debug, PartialEq)]
pub enum ArrayBuffer {
    /// Float scalars.
    F64(Vec<f64>),
    /// Integer scalars.
    I64(Vec<i64>),
}

impl ArrayBuffer {
    /// Scalar type of the payload.
    pub fn dtype(&self) -> Dtype {
        match self {
            Self::F64(_) => Dtype::F64,
            Self::I64(_) => Dtype::I64,
        }
    }

    /// Number of scalars (not elements) in the payload.
    pub fn len(&self) -> usize {
        match self {
            Self::F64(v) => v.len(),
            Self::I64(v) => v.len(),
        }
    }

    /// `true` when the payload holds no scalars.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An element type that can live in a [`LazyArray`].
///
/// Each element is stored as `WIDTH` consecutive scalars of `DTYPE`.
pub trait ArrayElement: Copy + Send + Sync + 'static {
    /// Scalar type in the chunk store.
    const DTYPE: Dtype;
    /// Scalars per element.
    const WIDTH: usize;

    /// Rebuild elements from a scalar payload. `None` on dtype mismatch
    /// or a scalar count that is not a multiple of `WIDTH`.
    fn from_buffer(buf: ArrayBuffer) -> Option<Vec<Self>>;

    /// Flatten elements into a scalar payload.
    fn to_buffer(values: &[Self]) -> ArrayBuffer;

    /// Bitwise equality (NaN payloads compare equal to themselves).
    fn bits_eq(&self, other: &Self) -> bool;
}

impl ArrayElement for f64 {
    const DTYPE: Dtype = Dtype::F64;
    const WIDTH: usize = 1;

    fn from_buffer(buf: ArrayBuffer) -> Option<Vec<Self>> {
        match buf {
            ArrayBuffer::F64(v) => Some(v),
            ArrayBuffer::I64(_) => None,
        }
    }

    fn to_buffer(values: &[Self]) -> ArrayBuffer {
        ArrayBuffer::F64(values.to_vec())
    }

    fn bits_eq(&self, other: &Self) -> bool {
        self.to_bits() == other.to_bits()
    }
}

impl ArrayElement for i64 {
    const DTYPE: Dtype = Dtype::I64;
    const WIDTH: usize = 1;

    fn from_buffer(buf: ArrayBuffer) -> Option<Vec<Self>> {
        match buf {
            ArrayBuffer::I64(v) => Some(v),
            ArrayBuffer::F64(_) => None,
        }
    }

    fn to_buffer(values: &[Self]) -> ArrayBuffer {
        ArrayBuffer::I64(values.to_vec())
    }

    fn bits_eq(&self, other: &Self) -> bool {
        self == other
    }
}

impl ArrayElement for Point3 {
    const DTYPE: Dtype = Dtype::F64;
    const WIDTH: usize = 3;

    fn from_buffer(buf: ArrayBuffer) -> Option<Vec<Self>> {
        match buf {
            ArrayBuffer::F64(v) if v.len() % 3 == 0 => Some(
                v.chunks_exact(3)
                    .map(|c| Point3::new(c[0], c[1], c[2]))
                    .collect(),
            ),
            _ => None,
        }
    }

    fn to_buffer(values: &[Self]) -> ArrayBuffer {
        ArrayBuffer::F64(values.iter().flat_map(|p| p.to_array()).collect())
    }

    fn bits_eq(&self, other: &Self) -> bool {
        Point3::bits_eq(self, other)
    }
}

/// Source of deferred array payloads.
///
/// Implemented by the store's file-backed chunk source and by the mock
/// loaders in the test utilities. Loads may block on I/O.
pub trait ChunkLoader: Send + Sync {
    /// Read and decode the chunk for `key`.
    fn load(&self, key: &ChunkKey) -> Result<ArrayBuffer, ChunkError>;
}

struct Deferred {
    key: ChunkKey,
    loader: Arc<dyn ChunkLoader>,
    gate: Mutex<()>,
}

/// An immutable array, either resident or loaded on first access.
pub struct LazyArray<T: ArrayElement> {
    len: usize,
    cell: OnceLock<Arc<[T]>>,
    deferred: Option<Arc<Deferred>>,
}

impl<T: ArrayElement> LazyArray<T> {
    /// A resident array.
    pub fn from_vec(values: Vec<T>) -> Self {
        let cell = OnceLock::new();
        let len = values.len();
        let _ = cell.set(Arc::from(values));
        Self {
            len,
            cell,
            deferred: None,
        }
    }

    /// A deferred array of `len` elements stored under `key`.
    pub fn deferred(len: usize, key: ChunkKey, loader: Arc<dyn ChunkLoader>) -> Self {
        Self {
            len,
            cell: OnceLock::new(),
            deferred: Some(Arc::new(Deferred {
                key,
                loader,
                gate: Mutex::new(()),
            })),
        }
    }

    /// Declared element count. Known without loading.
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` when the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// `true` once the payload is resident.
    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Chunk address, for deferred arrays.
    pub fn chunk_key(&self) -> Option<&ChunkKey> {
        self.deferred.as_ref().map(|d| &d.key)
    }

    /// The elements, loading them first if necessary.
    ///
    /// Concurrent first calls perform a single load; later calls never
    /// block. A failed load leaves the array unloaded so a later call
    /// retries.
    pub fn get(&self) -> Result<&[T], ChunkError> {
        if let Some(values) = self.cell.get() {
            return Ok(&**values);
        }
        let Some(deferred) = self.deferred.as_ref() else {
            // Resident arrays always populate the cell at construction.
            return Ok(&[]);
        };
        let _guard = deferred.gate.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(values) = self.cell.get() {
            return Ok(&**values);
        }
        let values = self.decode(&deferred.key, deferred.loader.load(&deferred.key)?)?;
        Ok(&**self.cell.get_or_init(|| Arc::from(values)))
    }

    fn decode(&self, key: &ChunkKey, buf: ArrayBuffer) -> Result<Vec<T>, ChunkError> {
        if buf.dtype() != T::DTYPE {
            return Err(ChunkError::DtypeMismatch {
                key: key.clone(),
                expected: T::DTYPE,
                found: buf.dtype(),
            });
        }
        let scalars = buf.len();
        if scalars != self.len * T::WIDTH {
            return Err(ChunkError::LengthMismatch {
                key: key.clone(),
                expected: self.len,
                found: scalars / T::WIDTH,
            });
        }
        T::from_buffer(buf).ok_or_else(|| ChunkError::Corrupt {
            key: key.clone(),
            detail: format!("payload does not decode as {}", T::DTYPE),
        })
    }

    /// Force the load without borrowing the values.
    pub fn prefetch(&self) -> Result<(), ChunkError> {
        self.get().map(|_| ())
    }

    /// Copy the elements out.
    pub fn to_vec(&self) -> Result<Vec<T>, ChunkError> {
        self.get().map(<[T]>::to_vec)
    }

    /// Element-wise bitwise comparison, loading both sides.
    pub fn content_eq(&self, other: &Self) -> Result<bool, ChunkError> {
        if self.len != other.len {
            return Ok(false);
        }
        let a = self.get()?;
        let b = other.get()?;
        Ok(a.iter().zip(b).all(|(x, y)| x.bits_eq(y)))
    }
}

impl<T: ArrayElement> Clone for LazyArray<T> {
    fn clone(&self) -> Self {
        let cell = OnceLock::new();
        if let Some(values) = self.cell.get() {
            let _ = cell.set(Arc::clone(values));
        }
        Self {
            len: self.len,
            cell,
            deferred: self.deferred.clone(),
        }
    }
}

impl<T: ArrayElement> fmt::Debug for LazyArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyArray")
            .field("dtype", &T::DTYPE)
            .field("len", &self.len)
            .field("loaded", &self.is_loaded())
            .field("chunk", &self.chunk_key())
            .finish()
    }
}

impl<T: ArrayElement> From<Vec<T>> for LazyArray<T> {
    fn from(values: Vec<T>) -> Self {
        Self::from_vec(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        payload: ArrayBuffer,
        loads: AtomicUsize,
    }

    impl ChunkLoader for Counting {
        fn load(&self, _key: &ChunkKey) -> Result<ArrayBuffer, ChunkError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(self.payload.clone())
        }
    }

    fn key() -> ChunkKey {
        ChunkKey::new(EntityId(9), "values")
    }

    #[test]
    fn resident_array_is_loaded() {
        let arr = LazyArray::from_vec(vec![1.0, 2.0]);
        assert!(arr.is_loaded());
        assert_eq!(arr.get().unwrap(), &[1.0, 2.0]);
        assert_eq!(arr.chunk_key(), None);
    }

    #[test]
    fn deferred_array_loads_once() {
        let loader = Arc::new(Counting {
            payload: ArrayBuffer::I64(vec![3, 4, 5]),
            loads: AtomicUsize::new(0),
        });
        let arr: LazyArray<i64> = LazyArray::deferred(3, key(), loader.clone());
        assert!(!arr.is_loaded());
        assert_eq!(arr.len(), 3);
        assert_eq!(arr.get().unwrap(), &[3, 4, 5]);
        assert_eq!(arr.get().unwrap(), &[3, 4, 5]);
        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn concurrent_first_access_loads_once() {
        let loader = Arc::new(Counting {
            payload: ArrayBuffer::F64(vec![0.5; 64]),
            loads: AtomicUsize::new(0),
        });
        let arr: LazyArray<f64> = LazyArray::deferred(64, key(), loader.clone());
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| assert_eq!(arr.get().unwrap().len(), 64));
            }
        });
        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dtype_mismatch_reported() {
        let loader = Arc::new(Counting {
            payload: ArrayBuffer::I64(vec![1]),
            loads: AtomicUsize::new(0),
        });
        let arr: LazyArray<f64> = LazyArray::deferred(1, key(), loader);
        assert!(matches!(
            arr.get(),
            Err(ChunkError::DtypeMismatch {
                expected: Dtype::F64,
                found: Dtype::I64,
                ..
            })
        ));
        assert!(!arr.is_loaded());
    }

    #[test]
    fn point_length_mismatch_reported() {
        let loader = Arc::new(Counting {
            payload: ArrayBuffer::F64(vec![0.0; 6]),
            loads: AtomicUsize::new(0),
        });
        let arr: LazyArray<Point3> = LazyArray::deferred(3, key(), loader);
        assert!(matches!(
            arr.get(),
            Err(ChunkError::LengthMismatch {
                expected: 3,
                found: 2,
                ..
            })
        ));
    }

    #[test]
    fn points_flatten_and_rebuild() {
        let pts = vec![Point3::new(1.0, 2.0, 3.0), Point3::new(4.0, 5.0, 6.0)];
        let buf = Point3::to_buffer(&pts);
        assert_eq!(buf.len(), 6);
        assert_eq!(Point3::from_buffer(buf).unwrap(), pts);
    }

    #[test]
    fn content_eq_is_bitwise() {
        let a = LazyArray::from_vec(vec![f64::NAN, 1.0]);
        let b = LazyArray::from_vec(vec![f64::NAN, 1.0]);
        let c = LazyArray::from_vec(vec![f64::NAN, 1.5]);
        assert!(a.content_eq(&b).unwrap());
        assert!(!a.content_eq(&c).unwrap());
    }

    #[test]
    fn clone_shares_loaded_payload() {
        let arr = LazyArray::from_vec(vec![7_i64]);
        let copy = arr.clone();
        assert!(copy.is_loaded());
        assert_eq!(copy.get().unwrap(), &[7]);
    }
}
