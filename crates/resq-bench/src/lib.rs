//! Benchmark profiles for the resq earth-model workspace.
//!
//! Provides pre-built models for benchmarking:
//!
//! - [`reference_profile`]: 40x40x10 jittered grid (16K cells) with
//!   porosity and facies
//! - [`stress_profile`]: 100x100x20 grid (200K cells), same properties

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use resq_core::{EntityId, IndexableElement, LengthUnit};
use resq_crs::Crs;
use resq_grid::Extent;
use resq_model::Model;
use resq_property::{LookupTable, PropertyData, PropertyKind, PropertySpec};
use resq_test_utils::jittered_corner_points;

/// Cell size of every profile grid, in metres.
pub const CELL_SIZE: (f64, f64, f64) = (50.0, 50.0, 2.0);

/// A built profile and the id of its grid.
pub struct Profile {
    /// The model.
    pub model: Model,
    /// The grid carrying the geometry and properties.
    pub grid: EntityId,
}

/// Build a model over an `ni x nj x nk` jittered grid with a porosity and
/// a facies property. Deterministic for a given `seed`.
pub fn build_profile(ni: usize, nj: usize, nk: usize, seed: u64) -> Profile {
    let mut model = Model::new();
    let crs = model
        .define_crs(Crs::local(LengthUnit::Metre, LengthUnit::Metre))
        .expect("fresh model accepts a crs");
    let extent = Extent::new(ni, nj, nk).expect("profile extents are non-zero");
    let points = jittered_corner_points(&extent, CELL_SIZE, 0.2, seed);
    let grid = model
        .build_grid(extent, points, crs)
        .expect("jittered geometry keeps k ordering");

    let n = extent.cell_count();
    let porosity = (0..n).map(|c| 0.05 + 0.3 * ((c * 7919) % 1000) as f64 / 1000.0).collect();
    model
        .attach_property(
            grid,
            PropertySpec::new(PropertyKind::Porosity, IndexableElement::Cells),
            PropertyData::continuous(porosity),
        )
        .expect("porosity has one value per cell");

    let lookup: LookupTable = [(0, "sand"), (1, "shale"), (2, "carbonate")].into_iter().collect();
    let facies = (0..n).map(|c| ((c / ni) % 3) as i64).collect();
    model
        .attach_property(
            grid,
            PropertySpec::new(PropertyKind::Facies, IndexableElement::Cells).with_lookup(lookup),
            PropertyData::discrete(facies),
        )
        .expect("facies codes are labelled");

    Profile { model, grid }
}

/// Reference profile: 40x40x10 (16K cells).
pub fn reference_profile(seed: u64) -> Profile {
    build_profile(40, 40, 10, seed)
}

/// Stress profile: 100x100x20 (200K cells).
pub fn stress_profile(seed: u64) -> Profile {
    build_profile(100, 100, 20, seed)
}
