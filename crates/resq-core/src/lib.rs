//! Core types and traits for the resq earth-model workspace.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by every other crate: entity identifiers, the
//! [`Entity`] trait, units of measure, indexable element domains, 3D
//! points, and the [`LazyArray`] / [`ChunkLoader`] seam through which
//! the store defers binary payloads until first access.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod array;
pub mod element;
pub mod entity;
pub mod error;
pub mod id;
pub mod point;
pub mod units;

pub use array::{ArrayBuffer, ArrayElement, ChunkKey, ChunkLoader, Dtype, LazyArray};
pub use element::IndexableElement;
pub use entity::{Citation, Entity, EntityHeader, EntityKind, References};
pub use error::{ChunkError, UnitParseError};
pub use id::EntityId;
pub use point::Point3;
pub use units::{AngleUnit, LengthUnit, PropertyUnit};
