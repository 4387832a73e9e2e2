//! Coordinate reference systems for resq earth models.
//!
//! A [`Crs`] fixes the units, z convention and placement of the raw
//! coordinates stored by grids. [`convert`] relates raw coordinates of two
//! frames; it is pure and never reprojects between map projections.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod convert;
pub mod crs;
pub mod error;

pub use config::GeometryTolerance;
pub use convert::{convert, convert_with, Conversion};
pub use crs::{Crs, CrsKind, CrsParams, UnitSymbols};
pub use error::CrsError;
