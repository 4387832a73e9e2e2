//! Reusable geometry and model fixtures.
//!
//! - [`box_corner_points`]: regular depth-positive box geometry.
//! - [`jittered_corner_points`]: the same box with seeded, k-order
//!   preserving noise.
//! - [`sample_model`]: a small model exercising every entity kind.

use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use resq_core::{EntityId, IndexableElement, LengthUnit, Point3, PropertyUnit};
use resq_crs::Crs;
use resq_grid::Extent;
use resq_model::Model;
use resq_property::{Direction, Facet, LookupTable, PropertyData, PropertyKind, PropertySpec};

/// Depth of the top interface of every fixture grid.
pub const TOP_DEPTH: f64 = 1000.0;

fn fill(extent: &Extent, mut node: impl FnMut(usize, usize, usize) -> Point3) -> Vec<Point3> {
    let (ni, nj, nk) = extent.dims();
    let mut pts = vec![Point3::UNDEFINED; extent.corner_point_count()];
    for k in 0..=nk {
        for j in 0..=nj {
            for i in 0..=ni {
                let p = node(i, j, k);
                for slot in 0..4 {
                    pts[extent.corner_index(i, j, k, slot)] = p;
                }
            }
        }
    }
    pts
}

/// Box geometry with cells of `dx * dy * dz`, depth increasing with k from
/// [`TOP_DEPTH`]. Every slot is populated, so the grid is unfaulted.
pub fn box_corner_points(extent: &Extent, dx: f64, dy: f64, dz: f64) -> Vec<Point3> {
    fill(extent, |i, j, k| {
        Point3::new(i as f64 * dx, j as f64 * dy, TOP_DEPTH + k as f64 * dz)
    })
}

/// Uniform sample in `[-1, 1)`.
fn signed_unit(rng: &mut ChaCha8Rng) -> f64 {
    let u = (rng.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
    2.0 * u - 1.0
}

/// [`box_corner_points`] with every node moved by up to `amplitude` times
/// the cell size along each axis. `amplitude` is clamped to `[0, 0.45]`
/// so layers never cross.
pub fn jittered_corner_points(
    extent: &Extent,
    (dx, dy, dz): (f64, f64, f64),
    amplitude: f64,
    seed: u64,
) -> Vec<Point3> {
    let a = amplitude.clamp(0.0, 0.45);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    fill(extent, |i, j, k| {
        Point3::new(
            (i as f64 + a * signed_unit(&mut rng)) * dx,
            (j as f64 + a * signed_unit(&mut rng)) * dy,
            TOP_DEPTH + (k as f64 + a * signed_unit(&mut rng)) * dz,
        )
    })
}

/// Ids of the entities in [`sample_model`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SampleIds {
    pub crs: EntityId,
    pub grid: EntityId,
    pub topology_grid: EntityId,
    pub porosity: EntityId,
    pub facies: EntityId,
    pub pressure: EntityId,
    pub permeability_i: EntityId,
    pub displacement: EntityId,
}

/// A model with one CRS, a 2x2x1 box grid (100 x 50 x 10 cells), a
/// topology-only 3x1x2 grid, and properties covering every data type.
pub fn sample_model() -> (Model, SampleIds) {
    let mut model = Model::new();
    let crs = model
        .define_crs(
            Crs::local(LengthUnit::Metre, LengthUnit::Metre)
                .with_title("field frame")
                .with_vertical_datum("MSL"),
        )
        .unwrap();
    model.set_originator(crs, Some("fixtures".into())).unwrap();

    let extent = Extent::new(2, 2, 1).unwrap();
    let grid = model
        .build_grid(extent, box_corner_points(&extent, 100.0, 50.0, 10.0), crs)
        .unwrap();
    model.set_title(grid, "box grid").unwrap();
    model.set_extra_metadata(grid, "source", "fixture").unwrap();

    let topology_grid = model
        .add_topology_grid(Extent::new(3, 1, 2).unwrap(), crs)
        .unwrap();

    let porosity = model
        .attach_property(
            grid,
            PropertySpec::new(PropertyKind::Porosity, IndexableElement::Cells)
                .with_unit(PropertyUnit::Fraction)
                .with_realization(0),
            PropertyData::continuous(vec![0.21, 0.18, f64::NAN, 0.25]),
        )
        .unwrap();

    let lookup: LookupTable = [(0, "sand"), (1, "shale"), (2, "salt")].into_iter().collect();
    let facies = model
        .attach_property(
            grid,
            PropertySpec::new(PropertyKind::Facies, IndexableElement::Cells)
                .with_lookup(lookup)
                .with_null_value(-1),
            PropertyData::discrete(vec![0, 1, 2, -1]),
        )
        .unwrap();

    let pressure = model
        .attach_property(
            grid,
            PropertySpec::new(PropertyKind::Pressure, IndexableElement::Nodes)
                .with_unit(PropertyUnit::Bar)
                .with_time_index(3)
                .with_title("pressure t3"),
            PropertyData::continuous((0..18).map(|n| 200.0 + n as f64).collect()),
        )
        .unwrap();

    let permeability_i = model
        .attach_property(
            topology_grid,
            PropertySpec::new(PropertyKind::Permeability, IndexableElement::Cells)
                .with_facet(Facet::Direction(Direction::I))
                .with_unit(PropertyUnit::Millidarcy),
            PropertyData::continuous(vec![150.0, 120.5, 98.0, 300.0, -0.0, 42.0]),
        )
        .unwrap();

    let displacement = model
        .attach_property(
            grid,
            PropertySpec::new(PropertyKind::Displacement, IndexableElement::Cells),
            PropertyData::points(vec![
                Point3::new(0.0, 0.0, 0.1),
                Point3::new(0.0, 0.5, 0.2),
                Point3::new(1.0, 0.0, 0.0),
                Point3::UNDEFINED,
            ]),
        )
        .unwrap();

    let ids = SampleIds {
        crs,
        grid,
        topology_grid,
        porosity,
        facies,
        pressure,
        permeability_i,
        displacement,
    };
    (model, ids)
}
