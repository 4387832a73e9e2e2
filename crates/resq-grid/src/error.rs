//! Error types for grid construction and geometry queries.

use std::error::Error;
use std::fmt;

use resq_core::{ChunkError, EntityId};

/// Errors arising from grid construction, geometry supply, or queries.
#[derive(Debug, Clone, PartialEq)]
pub enum GridError {
    /// A zero dimension, or element counts that overflow `usize`.
    InvalidExtent {
        /// The requested cell counts.
        extent: (usize, usize, usize),
        /// What went wrong.
        reason: &'static str,
    },
    /// The corner-point array has the wrong number of points.
    GeometryShape {
        /// Points required by the extent.
        expected: usize,
        /// Points supplied.
        found: usize,
    },
    /// Depths along a pillar slot are not strictly monotonic in k, or run
    /// against the direction established elsewhere in the grid.
    GeometryOrdering {
        /// Pillar node `(i, j)`.
        pillar: (usize, usize),
        /// Corner slot on the pillar.
        slot: usize,
        /// Upper layer interface of the offending pair.
        k: usize,
    },
    /// The grid already has complete geometry.
    GeometryImmutable {
        /// The grid, if registered.
        grid: Option<EntityId>,
    },
    /// New geometry changes a coordinate that was already defined.
    GeometryConflict {
        /// The grid, if registered.
        grid: Option<EntityId>,
        /// Flat index into the corner-point array.
        index: usize,
    },
    /// A cell, node or face index outside the extent.
    IndexOutOfRange {
        /// The offending index, as supplied.
        index: (usize, usize, usize),
        /// The extent it was checked against.
        extent: (usize, usize, usize),
    },
    /// The grid has no geometry, or the requested cell has undefined corners.
    NoGeometry {
        /// The grid, if registered.
        grid: Option<EntityId>,
        /// The cell whose corners are undefined, if the grid has geometry.
        cell: Option<(usize, usize, usize)>,
    },
    /// The CRS passed in has not been registered.
    UnregisteredCrs,
    /// Loading the deferred corner-point array failed.
    Chunk(ChunkError),
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidExtent { extent, reason } => {
                write!(f, "invalid extent {extent:?}: {reason}")
            }
            Self::GeometryShape { expected, found } => {
                write!(f, "corner-point array has {found} points, extent requires {expected}")
            }
            Self::GeometryOrdering { pillar, slot, k } => write!(
                f,
                "depths on pillar {pillar:?} slot {slot} are not strictly monotonic at k={k}"
            ),
            Self::GeometryImmutable { grid } => match grid {
                Some(id) => write!(f, "grid {id} already has complete geometry"),
                None => write!(f, "grid already has complete geometry"),
            },
            Self::GeometryConflict { grid, index } => match grid {
                Some(id) => write!(f, "grid {id}: corner point {index} conflicts with defined value"),
                None => write!(f, "corner point {index} conflicts with defined value"),
            },
            Self::IndexOutOfRange { index, extent } => {
                write!(f, "index {index:?} outside extent {extent:?}")
            }
            Self::NoGeometry { grid, cell } => {
                match grid {
                    Some(id) => write!(f, "grid {id} has no geometry")?,
                    None => write!(f, "grid has no geometry")?,
                }
                if let Some(cell) = cell {
                    write!(f, " for cell {cell:?}")?;
                }
                Ok(())
            }
            Self::UnregisteredCrs => write!(f, "CRS must be registered before a grid can use it"),
            Self::Chunk(e) => write!(f, "corner points unavailable: {e}"),
        }
    }
}

impl Error for GridError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Chunk(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ChunkError> for GridError {
    fn from(e: ChunkError) -> Self {
        Self::Chunk(e)
    }
}
