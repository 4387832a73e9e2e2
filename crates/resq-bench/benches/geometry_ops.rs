//! Criterion micro-benchmarks for grid geometry and CRS conversion.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use resq_bench::{reference_profile, CELL_SIZE};
use resq_core::{AngleUnit, LengthUnit, Point3};
use resq_crs::{convert, Crs};
use resq_grid::{Extent, Grid};
use resq_test_utils::jittered_corner_points;

/// Benchmark: Validate and build a 40x40x10 grid from corner points.
fn bench_build_grid_16k(c: &mut Criterion) {
    let crs = Crs::local(LengthUnit::Metre, LengthUnit::Metre);
    let extent = Extent::new(40, 40, 10).unwrap();
    let points = jittered_corner_points(&extent, CELL_SIZE, 0.2, 42);

    c.bench_function("build_grid_16k", |b| {
        b.iter(|| {
            let grid = Grid::build(extent, points.clone(), &crs).unwrap();
            black_box(grid.defined_cell_count());
        });
    });
}

/// Benchmark: Compute the volume of every cell of the reference grid.
fn bench_cell_volume_16k(c: &mut Criterion) {
    let profile = reference_profile(42);
    let grid = profile.model.grid(profile.grid).unwrap();
    let (ni, nj, nk) = grid.extent().dims();

    c.bench_function("cell_volume_16k", |b| {
        b.iter(|| {
            let mut total = 0.0;
            for k in 0..nk {
                for j in 0..nj {
                    for i in 0..ni {
                        total += grid.cell_volume(i, j, k).unwrap();
                    }
                }
            }
            black_box(total);
        });
    });
}

/// Benchmark: Bounding box over all defined cells of the reference grid.
fn bench_bounding_box_16k(c: &mut Criterion) {
    let profile = reference_profile(42);
    let grid = profile.model.grid(profile.grid).unwrap();

    c.bench_function("bounding_box_16k", |b| {
        b.iter(|| {
            black_box(grid.bounding_box().unwrap());
        });
    });
}

/// Benchmark: Convert all reference corner points into a rotated,
/// feet-based CRS.
fn bench_crs_convert_corner_points(c: &mut Criterion) {
    let profile = reference_profile(42);
    let points = profile.model.grid(profile.grid).unwrap().corner_points().unwrap().to_vec();
    let from = Crs::local(LengthUnit::Metre, LengthUnit::Metre);
    let to = Crs::local(LengthUnit::Foot, LengthUnit::Foot)
        .with_origin(Point3::new(1500.0, -200.0, 0.0))
        .unwrap()
        .with_rotation(30.0, AngleUnit::Degree)
        .unwrap();

    c.bench_function("crs_convert_corner_points", |b| {
        b.iter(|| {
            black_box(convert(&points, &from, &to).unwrap());
        });
    });
}

criterion_group!(
    benches,
    bench_build_grid_16k,
    bench_cell_volume_16k,
    bench_bounding_box_16k,
    bench_crs_convert_corner_points,
);
criterion_main!(benches);
