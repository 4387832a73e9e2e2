//! Grid-linked property arrays for resq earth models.
//!
//! A [`Property`] attaches one value per element of an indexable domain
//! (cells, faces or nodes) to a registered [`Grid`](resq_grid::Grid).
//! Every property carries a closed [`PropertyKind`] whose natural
//! [`DataType`] its values must use. Discrete properties also carry a
//! [`LookupTable`] labelling every non-null code.
//!
//! Values are held in [`LazyArray`](resq_core::LazyArray)s, so a property
//! restored from a container loads its values only on first access.
//! [`Statistics`] are computed at attach time and persisted, which keeps
//! them available without a load.
//!
//! [`Selection`] gives a restartable, insertion-ordered view of the
//! properties of one grid that match a [`PropertyFilter`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod kind;
pub mod lookup;
pub mod property;
pub mod select;

pub use error::PropertyError;
pub use kind::{DataType, Direction, Facet, Phase, PropertyKind};
pub use lookup::LookupTable;
pub use property::{Property, PropertyData, PropertySpec, Statistics, ValueRange};
pub use select::{PropertyFilter, Selection};
