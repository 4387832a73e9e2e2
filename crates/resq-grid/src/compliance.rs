//! Extent compliance test helpers.
//!
//! These functions verify the index arithmetic of an [`Extent`] against
//! its own contract. Reused by the extent and grid test modules.

use indexmap::IndexSet;
use resq_core::IndexableElement;

use crate::extent::Extent;

/// Assert that `b in neighbours(a)` implies `a in neighbours(b)`.
pub fn assert_neighbours_symmetric(extent: &Extent) {
    for (i, j, k) in extent.cells() {
        for nb in extent.neighbours(i, j, k).unwrap() {
            let back = extent.neighbours(nb.0, nb.1, nb.2).unwrap();
            assert!(
                back.contains(&(i, j, k)),
                "neighbour symmetry violated: {nb:?} in N({i},{j},{k}) but not the reverse"
            );
        }
    }
}

/// Assert that every neighbour shares exactly one face (unit L1 distance).
pub fn assert_neighbours_share_face(extent: &Extent) {
    for (i, j, k) in extent.cells() {
        for (a, b, c) in extent.neighbours(i, j, k).unwrap() {
            let d = a.abs_diff(i) + b.abs_diff(j) + c.abs_diff(k);
            assert_eq!(d, 1, "({a},{b},{c}) is not a face neighbour of ({i},{j},{k})");
        }
    }
}

/// Assert that `cells()` enumerates each cell once, in flat-index order.
pub fn assert_cells_in_index_order(extent: &Extent) {
    let cells: Vec<_> = extent.cells().collect();
    assert_eq!(cells.len(), extent.cell_count());
    let unique: IndexSet<_> = cells.iter().collect();
    assert_eq!(unique.len(), extent.cell_count(), "cells() has duplicates");
    for (n, &(i, j, k)) in cells.iter().enumerate() {
        assert_eq!(extent.cell_index(i, j, k).unwrap(), n);
    }
}

/// Assert that the element counts add up for every domain.
pub fn assert_element_counts(extent: &Extent) {
    let (ni, nj, nk) = extent.dims();
    assert_eq!(extent.element_count(IndexableElement::Cells), ni * nj * nk);
    assert_eq!(
        extent.element_count(IndexableElement::Nodes),
        (ni + 1) * (nj + 1) * (nk + 1)
    );
    assert_eq!(extent.corner_point_count(), 4 * extent.node_count());
}

/// Run all compliance checks on an extent.
pub fn run_full_compliance(extent: &Extent) {
    assert_neighbours_symmetric(extent);
    assert_neighbours_share_face(extent);
    assert_cells_in_index_order(extent);
    assert_element_counts(extent);
}
