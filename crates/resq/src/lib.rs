//! resq: RESQML-style earth models in Rust.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! resq sub-crates. For most users, adding `resq` as a single dependency is
//! sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use resq::prelude::*;
//!
//! let mut model = Model::new();
//! let crs = model
//!     .define_crs(Crs::local(LengthUnit::Metre, LengthUnit::Metre))
//!     .unwrap();
//!
//! // One 100 x 100 x 10 cell, depth increasing with k.
//! let extent = Extent::new(1, 1, 1).unwrap();
//! let mut points = vec![Point3::UNDEFINED; extent.corner_point_count()];
//! for k in 0..=1 {
//!     for j in 0..=1 {
//!         for i in 0..=1 {
//!             let p = Point3::new(i as f64 * 100.0, j as f64 * 100.0, 1000.0 + k as f64 * 10.0);
//!             for slot in 0..4 {
//!                 points[extent.corner_index(i, j, k, slot)] = p;
//!             }
//!         }
//!     }
//! }
//! let grid = model.build_grid(extent, points, crs).unwrap();
//! assert!((model.grid(grid).unwrap().cell_volume(0, 0, 0).unwrap() - 100_000.0).abs() < 1e-6);
//!
//! model
//!     .attach_property(
//!         grid,
//!         PropertySpec::new(PropertyKind::Porosity, IndexableElement::Cells),
//!         PropertyData::continuous(vec![0.2]),
//!     )
//!     .unwrap();
//!
//! let (mut meta, mut chunks) = (Vec::new(), Vec::new());
//! resq::store::save_to(&model, &mut meta, &mut chunks).unwrap();
//! let loaded = resq::store::load_from(
//!     meta.as_slice(),
//!     std::sync::Arc::new(resq::store::MemorySource::from(chunks)),
//! )
//! .unwrap();
//! assert_eq!(loaded.len(), 3);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `resq-core` | Ids, entity headers, units, points, lazy arrays |
//! | [`registry`] | `resq-registry` | Id allocation and the reference graph |
//! | [`crs`] | `resq-crs` | Coordinate reference systems and conversion |
//! | [`grid`] | `resq-grid` | Corner-point grids and cell geometry |
//! | [`property`] | `resq-property` | Typed property arrays, lookups, statistics |
//! | [`model`] | `resq-model` | The [`Model`](model::Model) tying entities together |
//! | [`store`] | `resq-store` | JSON metadata plus chunked binary storage |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types (`resq-core`).
///
/// Entity ids and headers, [`types::Point3`], unit enums and the deferred
/// [`types::LazyArray`] with its [`types::ChunkLoader`] seam.
pub use resq_core as types;

/// Identity registry (`resq-registry`).
pub use resq_registry as registry;

/// Coordinate reference systems (`resq-crs`).
///
/// Build a [`crs::Crs`] and move points between systems with
/// [`crs::convert`].
pub use resq_crs as crs;

/// Corner-point grid geometry (`resq-grid`).
pub use resq_grid as grid;

/// Property arrays (`resq-property`).
pub use resq_property as property;

/// The earth model (`resq-model`).
pub use resq_model as model;

/// Serialization (`resq-store`).
///
/// [`store::save`] writes `<dest>.json` and `<dest>.chunks`;
/// [`store::load`] reads them back with every array deferred.
pub use resq_store as store;

/// Common imports for typical resq usage.
///
/// ```rust
/// use resq::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use resq_core::{
        AngleUnit, EntityId, EntityKind, IndexableElement, LengthUnit, Point3, PropertyUnit,
    };

    // Entities
    pub use resq_crs::{Crs, CrsKind};
    pub use resq_grid::{Extent, GeometryStatus, Grid};
    pub use resq_property::{
        DataType, LookupTable, Property, PropertyData, PropertyKind, PropertySpec,
    };
    pub use resq_model::{Model, ModelError, ModelObject, RemoveMode};

    // Storage
    pub use resq_store::{Store, StoreConfig, StoreError};
}
