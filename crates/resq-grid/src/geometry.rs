//! Validation and summary of split-pillar corner-point arrays.
//!
//! Only slots whose column lies inside the extent are inspected; the
//! remaining slots are carried verbatim and never read.

use std::fmt;
use std::str::FromStr;

use resq_core::Point3;

use crate::error::GridError;
use crate::extent::Extent;

/// How much of a grid's geometry is known.
///
/// Transitions only move forward: `Absent -> Partial -> Complete`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GeometryStatus {
    /// Topology only; no corner points.
    Absent,
    /// Corner points present, some undefined.
    Partial,
    /// Every used corner point defined.
    Complete,
}

impl GeometryStatus {
    /// Stable symbolic name used in the metadata document.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Partial => "partial",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for GeometryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeometryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "absent" => Ok(Self::Absent),
            "partial" => Ok(Self::Partial),
            "complete" => Ok(Self::Complete),
            other => Err(format!("unknown geometry status '{other}'")),
        }
    }
}

/// Direction z moves as k increases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KDirection {
    /// z increases with k.
    Down,
    /// z decreases with k.
    Up,
}

impl KDirection {
    /// Stable symbolic name used in the metadata document.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Down => "down",
            Self::Up => "up",
        }
    }
}

impl fmt::Display for KDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "down" => Ok(Self::Down),
            "up" => Ok(Self::Up),
            other => Err(format!("unknown k direction '{other}'")),
        }
    }
}

/// Facts about a corner-point array that are computed once at build time
/// and persisted, so they are available without loading the array.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GeometrySummary {
    /// `Partial` or `Complete`.
    pub status: GeometryStatus,
    /// Established k direction; `None` when no pillar has two defined depths.
    pub k_direction: Option<KDirection>,
    /// Cells whose eight corners are all defined.
    pub defined_cells: usize,
}

/// Fail [`GridError::GeometryShape`] unless `len` matches the extent.
pub fn check_shape(extent: &Extent, len: usize) -> Result<(), GridError> {
    let expected = extent.corner_point_count();
    if len == expected {
        Ok(())
    } else {
        Err(GridError::GeometryShape {
            expected,
            found: len,
        })
    }
}

/// Validate shape and k-ordering and compute the summary.
pub fn summarize(extent: &Extent, points: &[Point3]) -> Result<GeometrySummary, GridError> {
    check_shape(extent, points.len())?;
    let (ni, nj, nk) = extent.dims();
    let mut direction = None;
    let mut complete = true;

    for j in 0..=nj {
        for i in 0..=ni {
            for slot in 0..4 {
                if !extent.slot_in_use(i, j, slot) {
                    continue;
                }
                let mut prev: Option<(usize, f64)> = None;
                for k in 0..=nk {
                    let p = points[extent.corner_index(i, j, k, slot)];
                    if !p.is_defined() {
                        complete = false;
                        continue;
                    }
                    if let Some((pk, pz)) = prev {
                        let step = if p.z > pz {
                            KDirection::Down
                        } else if p.z < pz {
                            KDirection::Up
                        } else {
                            return Err(GridError::GeometryOrdering {
                                pillar: (i, j),
                                slot,
                                k: pk,
                            });
                        };
                        match direction {
                            None => direction = Some(step),
                            Some(d) if d != step => {
                                return Err(GridError::GeometryOrdering {
                                    pillar: (i, j),
                                    slot,
                                    k: pk,
                                })
                            }
                            Some(_) => {}
                        }
                    }
                    prev = Some((k, p.z));
                }
            }
        }
    }

    let defined_cells = extent
        .cells()
        .filter(|&(i, j, k)| {
            extent
                .cell_corner_indices(i, j, k)
                .iter()
                .flatten()
                .flatten()
                .all(|&idx| points[idx].is_defined())
        })
        .count();

    Ok(GeometrySummary {
        status: if complete {
            GeometryStatus::Complete
        } else {
            GeometryStatus::Partial
        },
        k_direction: direction,
        defined_cells,
    })
}

/// First used index where `old` is defined and `new` differs bitwise.
pub fn first_conflict(extent: &Extent, old: &[Point3], new: &[Point3]) -> Option<usize> {
    let (ni, nj, nk) = extent.dims();
    for k in 0..=nk {
        for j in 0..=nj {
            for i in 0..=ni {
                for slot in 0..4 {
                    if !extent.slot_in_use(i, j, slot) {
                        continue;
                    }
                    let idx = extent.corner_index(i, j, k, slot);
                    if old[idx].is_defined() && !old[idx].bits_eq(&new[idx]) {
                        return Some(idx);
                    }
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Unit-cell box geometry with depth `k * dz` for every slot.
    fn layered(extent: &Extent, dz: f64) -> Vec<Point3> {
        let (ni, nj, nk) = extent.dims();
        let mut pts = vec![Point3::UNDEFINED; extent.corner_point_count()];
        for k in 0..=nk {
            for j in 0..=nj {
                for i in 0..=ni {
                    for slot in 0..4 {
                        pts[extent.corner_index(i, j, k, slot)] =
                            Point3::new(i as f64, j as f64, 100.0 + k as f64 * dz);
                    }
                }
            }
        }
        pts
    }

    #[test]
    fn complete_box_summary() {
        let e = Extent::new(2, 2, 3).unwrap();
        let s = summarize(&e, &layered(&e, 1.0)).unwrap();
        assert_eq!(s.status, GeometryStatus::Complete);
        assert_eq!(s.k_direction, Some(KDirection::Down));
        assert_eq!(s.defined_cells, 12);
    }

    #[test]
    fn upward_grid_detected() {
        let e = Extent::new(1, 1, 2).unwrap();
        let s = summarize(&e, &layered(&e, -2.0)).unwrap();
        assert_eq!(s.k_direction, Some(KDirection::Up));
    }

    #[test]
    fn wrong_length_rejected() {
        let e = Extent::new(2, 2, 1).unwrap();
        let mut pts = layered(&e, 1.0);
        pts.pop();
        assert_eq!(
            summarize(&e, &pts).unwrap_err(),
            GridError::GeometryShape {
                expected: 72,
                found: 71
            }
        );
    }

    #[test]
    fn flat_layer_rejected() {
        let e = Extent::new(1, 1, 1).unwrap();
        let pts = layered(&e, 0.0);
        assert!(matches!(
            summarize(&e, &pts),
            Err(GridError::GeometryOrdering { .. })
        ));
    }

    #[test]
    fn mixed_direction_rejected() {
        let e = Extent::new(1, 1, 1).unwrap();
        let mut pts = layered(&e, 1.0);
        let idx = e.corner_index(1, 1, 1, 0);
        pts[idx].z = 50.0;
        assert!(matches!(
            summarize(&e, &pts),
            Err(GridError::GeometryOrdering {
                pillar: (1, 1),
                slot: 0,
                k: 0
            })
        ));
    }

    #[test]
    fn unused_slots_are_ignored() {
        let e = Extent::new(1, 1, 1).unwrap();
        let mut pts = layered(&e, 1.0);
        pts[e.corner_index(0, 0, 0, 0)] = Point3::UNDEFINED;
        pts[e.corner_index(0, 0, 1, 0)] = Point3::new(0.0, 0.0, -1.0e9);
        let s = summarize(&e, &pts).unwrap();
        assert_eq!(s.status, GeometryStatus::Complete);
    }

    #[test]
    fn all_undefined_is_partial_with_no_cells() {
        let e = Extent::new(2, 1, 1).unwrap();
        let pts = vec![Point3::UNDEFINED; e.corner_point_count()];
        let s = summarize(&e, &pts).unwrap();
        assert_eq!(s.status, GeometryStatus::Partial);
        assert_eq!(s.defined_cells, 0);
        assert_eq!(s.k_direction, None);
    }

    #[test]
    fn conflict_only_on_defined_values() {
        let e = Extent::new(1, 1, 1).unwrap();
        let mut old = layered(&e, 1.0);
        let idx = e.corner_index(0, 0, 1, 3);
        old[idx] = Point3::UNDEFINED;
        let new = layered(&e, 1.0);
        assert_eq!(first_conflict(&e, &old, &new), None);
        let mut moved = new.clone();
        moved[e.corner_index(1, 0, 0, 2)].x += 0.5;
        assert_eq!(
            first_conflict(&e, &old, &moved),
            Some(e.corner_index(1, 0, 0, 2))
        );
    }
}
