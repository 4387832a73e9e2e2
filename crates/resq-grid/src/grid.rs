//! The corner-point grid entity.

use resq_core::{
    Entity, EntityHeader, EntityId, EntityKind, LazyArray, LengthUnit, Point3, References,
};
use resq_crs::Crs;

use crate::error::GridError;
use crate::extent::Extent;
use crate::geometry::{self, GeometryStatus, GeometrySummary, KDirection};
use crate::hexahedron::{self, CellCorners};

#[derive(Clone, Debug)]
struct Geometry {
    points: LazyArray<Point3>,
    summary: GeometrySummary,
}

/// A cellular corner-point grid.
///
/// The grid references one CRS and interprets its raw coordinates in that
/// CRS's units. Geometry is optional: a grid may be built with topology
/// only and receive corner points later through
/// [`supply_geometry`](Grid::supply_geometry), which only ever moves the
/// [`GeometryStatus`] forward.
#[derive(Clone, Debug)]
pub struct Grid {
    header: EntityHeader,
    extent: Extent,
    crs: EntityId,
    /// Snapshot of the CRS's horizontal unit, taken at construction.
    /// `Model::repoint` refreshes it through [`adopt_crs`](Grid::adopt_crs);
    /// any future CRS setter must do the same.
    xy_unit: LengthUnit,
    /// Snapshot of the CRS's vertical unit, refreshed with `xy_unit`.
    z_unit: LengthUnit,
    geometry: Option<Geometry>,
}

impl Grid {
    /// Build a grid with corner-point geometry.
    ///
    /// `crs` must already be registered.
    pub fn build(extent: Extent, corner_points: Vec<Point3>, crs: &Crs) -> Result<Self, GridError> {
        let summary = geometry::summarize(&extent, &corner_points)?;
        let mut grid = Self::topology_only(extent, crs)?;
        grid.geometry = Some(Geometry {
            points: LazyArray::from_vec(corner_points),
            summary,
        });
        Ok(grid)
    }

    /// A grid with no geometry.
    pub fn topology_only(extent: Extent, crs: &Crs) -> Result<Self, GridError> {
        let crs_id = crs.id().ok_or(GridError::UnregisteredCrs)?;
        Ok(Self {
            header: EntityHeader::new("grid"),
            extent,
            crs: crs_id,
            xy_unit: crs.xy_unit(),
            z_unit: crs.z_unit(),
            geometry: None,
        })
    }

    /// Attach a deferred corner-point array with a previously computed
    /// summary. Used when restoring from a container.
    pub fn with_deferred_geometry(
        mut self,
        points: LazyArray<Point3>,
        summary: GeometrySummary,
    ) -> Result<Self, GridError> {
        geometry::check_shape(&self.extent, points.len())?;
        self.geometry = Some(Geometry { points, summary });
        Ok(self)
    }

    /// Set the citation title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.header.citation.title = title.into();
        self
    }

    /// Cell counts.
    pub fn extent(&self) -> &Extent {
        &self.extent
    }

    /// The CRS this grid's coordinates are expressed in.
    pub fn crs(&self) -> EntityId {
        self.crs
    }

    /// Units of x and y, captured from the CRS.
    pub fn xy_unit(&self) -> LengthUnit {
        self.xy_unit
    }

    /// Unit of z, captured from the CRS.
    pub fn z_unit(&self) -> LengthUnit {
        self.z_unit
    }

    /// Refresh the captured units after the grid is re-pointed to `crs`.
    pub fn adopt_crs(&mut self, crs: &Crs) -> Result<(), GridError> {
        let id = crs.id().ok_or(GridError::UnregisteredCrs)?;
        self.crs = id;
        self.xy_unit = crs.xy_unit();
        self.z_unit = crs.z_unit();
        Ok(())
    }

    /// Current geometry status.
    pub fn geometry_status(&self) -> GeometryStatus {
        self.geometry
            .as_ref()
            .map_or(GeometryStatus::Absent, |g| g.summary.status)
    }

    /// Persisted geometry facts, or `None` for a topology-only grid.
    pub fn geometry_summary(&self) -> Option<&GeometrySummary> {
        self.geometry.as_ref().map(|g| &g.summary)
    }

    /// The lazily loaded corner-point array, or `None` for a
    /// topology-only grid.
    pub fn corner_point_array(&self) -> Option<&LazyArray<Point3>> {
        self.geometry.as_ref().map(|g| &g.points)
    }

    /// Whether z increases or decreases with k. `None` when the grid has
    /// no geometry or too few defined depths to tell.
    pub fn k_direction(&self) -> Option<KDirection> {
        self.geometry.as_ref().and_then(|g| g.summary.k_direction)
    }

    /// Cells whose eight corners are all defined.
    pub fn defined_cell_count(&self) -> usize {
        self.geometry.as_ref().map_or(0, |g| g.summary.defined_cells)
    }

    fn no_geometry(&self, cell: Option<(usize, usize, usize)>) -> GridError {
        GridError::NoGeometry {
            grid: self.id(),
            cell,
        }
    }

    /// Supply corner points, moving the status forward.
    ///
    /// A `Complete` grid rejects new geometry. A `Partial` grid accepts it
    /// only if every previously defined point is bitwise unchanged.
    pub fn supply_geometry(&mut self, corner_points: Vec<Point3>) -> Result<GeometryStatus, GridError> {
        if self.geometry_status() == GeometryStatus::Complete {
            return Err(GridError::GeometryImmutable { grid: self.id() });
        }
        let summary = geometry::summarize(&self.extent, &corner_points)?;
        if let Some(current) = &self.geometry {
            let old = current.points.get()?;
            if let Some(index) = geometry::first_conflict(&self.extent, old, &corner_points) {
                return Err(GridError::GeometryConflict {
                    grid: self.id(),
                    index,
                });
            }
        }
        tracing::debug!(
            grid = ?self.id(),
            status = %summary.status,
            defined_cells = summary.defined_cells,
            "geometry supplied"
        );
        self.geometry = Some(Geometry {
            points: LazyArray::from_vec(corner_points),
            summary,
        });
        Ok(summary.status)
    }

    /// The full corner-point array, loading it if deferred.
    pub fn corner_points(&self) -> Result<&[Point3], GridError> {
        let geometry = self.geometry.as_ref().ok_or_else(|| self.no_geometry(None))?;
        Ok(geometry.points.get()?)
    }

    /// The eight corners of cell `(i, j, k)` in `[k][j][i]` order, in
    /// CRS-native units.
    pub fn cell_geometry(&self, i: usize, j: usize, k: usize) -> Result<CellCorners, GridError> {
        self.extent.check_cell(i, j, k)?;
        let points = self.corner_points()?;
        let indices = self.extent.cell_corner_indices(i, j, k);
        let mut out = [[[Point3::UNDEFINED; 2]; 2]; 2];
        for (dk, plane) in indices.iter().enumerate() {
            for (dj, row) in plane.iter().enumerate() {
                for (di, &idx) in row.iter().enumerate() {
                    let p = points[idx];
                    if !p.is_defined() {
                        return Err(self.no_geometry(Some((i, j, k))));
                    }
                    out[dk][dj][di] = p;
                }
            }
        }
        Ok(out)
    }

    /// Cell volume in cubic xy units; z is rescaled into xy units first.
    pub fn cell_volume(&self, i: usize, j: usize, k: usize) -> Result<f64, GridError> {
        let corners = self.cell_geometry(i, j, k)?;
        let factor = self.z_unit.conversion_factor(self.xy_unit);
        Ok(hexahedron::volume(&hexahedron::rescale_z(&corners, factor)))
    }

    /// Mean of the eight corners, in CRS-native units.
    pub fn cell_center(&self, i: usize, j: usize, k: usize) -> Result<Point3, GridError> {
        Ok(hexahedron::centre(&self.cell_geometry(i, j, k)?))
    }

    /// Mean length of the four pillar edges of the cell, in z units.
    pub fn cell_thickness(&self, i: usize, j: usize, k: usize) -> Result<f64, GridError> {
        let corners = self.cell_geometry(i, j, k)?;
        let factor = self.xy_unit.conversion_factor(self.z_unit);
        let mut scaled = corners;
        for p in scaled.iter_mut().flatten().flatten() {
            p.x *= factor;
            p.y *= factor;
        }
        Ok(hexahedron::thickness(&scaled))
    }

    /// Component-wise minimum and maximum over every defined, used
    /// corner point. `None` when no point is defined.
    pub fn bounding_box(&self) -> Result<Option<(Point3, Point3)>, GridError> {
        let points = self.corner_points()?;
        let (ni, nj, nk) = self.extent.dims();
        let mut bounds: Option<(Point3, Point3)> = None;
        for k in 0..=nk {
            for j in 0..=nj {
                for i in 0..=ni {
                    for slot in 0..4 {
                        if !self.extent.slot_in_use(i, j, slot) {
                            continue;
                        }
                        let p = points[self.extent.corner_index(i, j, k, slot)];
                        if !p.is_defined() {
                            continue;
                        }
                        bounds = Some(match bounds {
                            None => (p, p),
                            Some((lo, hi)) => (
                                Point3::new(lo.x.min(p.x), lo.y.min(p.y), lo.z.min(p.z)),
                                Point3::new(hi.x.max(p.x), hi.y.max(p.y), hi.z.max(p.z)),
                            ),
                        });
                    }
                }
            }
        }
        Ok(bounds)
    }
}

impl Entity for Grid {
    fn header(&self) -> &EntityHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut EntityHeader {
        &mut self.header
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Grid
    }

    fn references(&self) -> References {
        References::from_slice(&[self.crs])
    }

    fn retarget(&mut self, old: EntityId, new: EntityId) -> bool {
        if self.crs == old {
            self.crs = new;
            true
        } else {
            false
        }
    }
}
