//! Corner-point grid geometry for resq earth models.
//!
//! This crate defines the [`Extent`] index arithmetic, the split-pillar
//! corner-point layout, and the [`Grid`] entity with its geometry state
//! machine and per-cell measures.
//!
//! # Corner-point layout
//!
//! One [`Point3`](resq_core::Point3) per pillar node, layer interface and
//! corner slot, laid out `[k][j][i][slot]` with `k in 0..=nk`,
//! `j in 0..=nj`, `i in 0..=ni` and four slots per node. Slot
//! `2 * dj + di` holds the point used by the column `(i - 1 + di, j - 1 + dj)`,
//! so the four columns meeting at a pillar may disagree (a fault).
//!
//! # Geometry status
//!
//! ```text
//! Absent ──▶ Partial ──▶ Complete
//! ```
//!
//! A topology-only grid may also jump straight to `Complete`. No
//! transition moves backward.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod extent;
pub mod geometry;
pub mod grid;
pub mod hexahedron;

#[cfg(test)]
pub(crate) mod compliance;

pub use error::GridError;
pub use extent::{Extent, Neighbours};
pub use geometry::{GeometryStatus, GeometrySummary, KDirection};
pub use grid::Grid;
pub use hexahedron::CellCorners;
