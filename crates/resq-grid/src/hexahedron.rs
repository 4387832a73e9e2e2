//! Measures of a single hexahedral cell given its eight corners.
//!
//! Corners are indexed `[k][j][i]` with each index in `{0, 1}`. Faces need
//! not be planar.

use resq_core::Point3;

/// Eight corners of a cell, `[k][j][i]`.
pub type CellCorners = [[[Point3; 2]; 2]; 2];

/// The six faces as corner loops `(k, j, i)`, oriented so that for a
/// right-handed cell each normal points outward.
const FACES: [[(usize, usize, usize); 4]; 6] = [
    // -I
    [(0, 0, 0), (1, 0, 0), (1, 1, 0), (0, 1, 0)],
    // +I
    [(0, 0, 1), (0, 1, 1), (1, 1, 1), (1, 0, 1)],
    // -J
    [(0, 0, 0), (0, 0, 1), (1, 0, 1), (1, 0, 0)],
    // +J
    [(0, 1, 0), (1, 1, 0), (1, 1, 1), (0, 1, 1)],
    // -K
    [(0, 0, 0), (0, 1, 0), (0, 1, 1), (0, 0, 1)],
    // +K
    [(1, 0, 0), (1, 0, 1), (1, 1, 1), (1, 1, 0)],
];

fn corner(c: &CellCorners, (k, j, i): (usize, usize, usize)) -> Point3 {
    c[k][j][i]
}

/// Mean of the eight corners.
pub fn centre(c: &CellCorners) -> Point3 {
    let sum = c
        .iter()
        .flatten()
        .flatten()
        .fold(Point3::default(), |acc, p| acc + *p);
    sum * 0.125
}

/// Copy of the corners with z multiplied by `z_factor`.
pub fn rescale_z(c: &CellCorners, z_factor: f64) -> CellCorners {
    let mut out = *c;
    if z_factor != 1.0 {
        for p in out.iter_mut().flatten().flatten() {
            p.z *= z_factor;
        }
    }
    out
}

/// Volume by the divergence theorem.
///
/// Each face is split into four triangles about its centroid; each
/// triangle is coned to the cell centroid and the signed tetrahedron
/// volumes are summed. The absolute value is returned, so left-handed
/// cells (depth-positive z) measure the same as their mirror image.
pub fn volume(c: &CellCorners) -> f64 {
    let apex = centre(c);
    let mut six_v = 0.0;
    for face in FACES {
        let loop_pts = face.map(|idx| corner(c, idx));
        let face_centre = (loop_pts[0] + loop_pts[1] + loop_pts[2] + loop_pts[3]) * 0.25;
        let f = face_centre - apex;
        for m in 0..4 {
            let a = loop_pts[m] - apex;
            let b = loop_pts[(m + 1) % 4] - apex;
            six_v += a.dot(b.cross(f));
        }
    }
    (six_v / 6.0).abs()
}

/// Mean length of the four pillar edges running from the top face to the
/// bottom face.
pub fn thickness(c: &CellCorners) -> f64 {
    let mut total = 0.0;
    for j in 0..2 {
        for i in 0..2 {
            total += (c[1][j][i] - c[0][j][i]).norm();
        }
    }
    total * 0.25
}
