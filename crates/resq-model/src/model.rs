//! The in-memory earth model.
//!
//! [`Model`] owns the canonical entity table. Entities enter through the
//! typed `define_*`/`add_*`/`attach_*` operations, are read through typed
//! getters, and change only through the validated setters here. Grids
//! and properties hold [`EntityId`] references resolved through the
//! registry, never direct pointers.

use resq_core::{Entity, EntityId, EntityKind, Point3};
use resq_crs::{Crs, CrsKind, CrsParams, UnitSymbols};
use resq_grid::{Extent, GeometryStatus, Grid};
use resq_property::{
    Property, PropertyData, PropertyError, PropertyFilter, PropertySpec, Selection,
};
use resq_registry::{Registry, RegistryError, RemoveMode};

use crate::error::ModelError;
use crate::object::ModelObject;

// Compile-time assertion: a model can be shared across reader threads.
const _: () = {
    #[allow(dead_code)]
    fn assert_send_sync<T: Send + Sync>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send_sync::<Model>();
    }
};

/// A set of CRSs, grids and properties with consistent references.
#[derive(Clone, Debug, Default)]
pub struct Model {
    registry: Registry<ModelObject>,
}

impl Model {
    /// An empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// The underlying registry, for graph queries.
    pub fn registry(&self) -> &Registry<ModelObject> {
        &self.registry
    }

    // ── Registration ────────────────────────────────────────────

    /// Register a CRS.
    pub fn define_crs(&mut self, crs: Crs) -> Result<EntityId, ModelError> {
        let id = self.registry.register(crs.into())?;
        tracing::debug!(%id, "crs defined");
        Ok(id)
    }

    /// Validate unit symbols and parameters, then register the CRS.
    pub fn define_crs_from(
        &mut self,
        kind: CrsKind,
        units: UnitSymbols<'_>,
        params: CrsParams,
    ) -> Result<EntityId, ModelError> {
        self.define_crs(Crs::define(kind, units, params)?)
    }

    /// Register a grid built against a CRS of this model.
    pub fn add_grid(&mut self, grid: Grid) -> Result<EntityId, ModelError> {
        self.crs(grid.crs())?;
        let id = self.registry.register(grid.into())?;
        tracing::debug!(%id, "grid added");
        Ok(id)
    }

    /// Build a grid with geometry over the registered CRS `crs` and add it.
    pub fn build_grid(
        &mut self,
        extent: Extent,
        corner_points: Vec<Point3>,
        crs: EntityId,
    ) -> Result<EntityId, ModelError> {
        let grid = Grid::build(extent, corner_points, self.crs(crs)?)?;
        self.add_grid(grid)
    }

    /// Add a topology-only grid over the registered CRS `crs`.
    pub fn add_topology_grid(&mut self, extent: Extent, crs: EntityId) -> Result<EntityId, ModelError> {
        let grid = Grid::topology_only(extent, self.crs(crs)?)?;
        self.add_grid(grid)
    }

    /// Validate `data` against the grid `grid` and register the property.
    pub fn attach_property(
        &mut self,
        grid: EntityId,
        spec: PropertySpec,
        data: PropertyData,
    ) -> Result<EntityId, ModelError> {
        let property = Property::attach(self.grid(grid)?, spec, data)?;
        self.add_property(property)
    }

    /// Register a property already attached to a grid of this model.
    pub fn add_property(&mut self, property: Property) -> Result<EntityId, ModelError> {
        self.grid(property.grid())?;
        let id = self.registry.register(property.into())?;
        tracing::debug!(%id, "property attached");
        Ok(id)
    }

    /// Insert an entity that already carries an id. Used when loading a
    /// container; references must already be present.
    pub fn restore(&mut self, object: ModelObject) -> Result<EntityId, ModelError> {
        match &object {
            ModelObject::Crs(_) => {}
            ModelObject::Grid(g) => {
                self.crs(g.crs())?;
            }
            ModelObject::Property(p) => {
                self.grid(p.grid())?;
            }
        }
        Ok(self.registry.restore(object)?)
    }

    // ── Lookup ──────────────────────────────────────────────────

    /// The entity with `id`, of any kind.
    pub fn object(&self, id: EntityId) -> Result<&ModelObject, ModelError> {
        Ok(self.registry.resolve(id)?)
    }

    fn typed<'a, T>(
        &'a self,
        id: EntityId,
        expected: EntityKind,
        pick: impl FnOnce(&'a ModelObject) -> Option<&'a T>,
    ) -> Result<&'a T, ModelError> {
        let object = self.object(id)?;
        pick(object).ok_or(ModelError::WrongKind {
            id,
            expected,
            found: object.kind(),
        })
    }

    /// The CRS with `id`.
    pub fn crs(&self, id: EntityId) -> Result<&Crs, ModelError> {
        self.typed(id, EntityKind::Crs, ModelObject::as_crs)
    }

    /// The grid with `id`.
    pub fn grid(&self, id: EntityId) -> Result<&Grid, ModelError> {
        self.typed(id, EntityKind::Grid, ModelObject::as_grid)
    }

    /// The property with `id`.
    pub fn property(&self, id: EntityId) -> Result<&Property, ModelError> {
        self.typed(id, EntityKind::Property, ModelObject::as_property)
    }

    /// `true` if `id` is registered.
    pub fn contains(&self, id: EntityId) -> bool {
        self.registry.contains(id)
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// `true` when the model holds nothing.
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// All entities in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &ModelObject)> {
        self.registry.iter()
    }

    /// All CRSs in insertion order.
    pub fn crses(&self) -> impl Iterator<Item = (EntityId, &Crs)> {
        self.iter().filter_map(|(id, o)| o.as_crs().map(|c| (id, c)))
    }

    /// All grids in insertion order.
    pub fn grids(&self) -> impl Iterator<Item = (EntityId, &Grid)> {
        self.iter().filter_map(|(id, o)| o.as_grid().map(|g| (id, g)))
    }

    /// All properties in insertion order.
    pub fn properties(&self) -> impl Iterator<Item = (EntityId, &Property)> {
        self.iter()
            .filter_map(|(id, o)| o.as_property().map(|p| (id, p)))
    }

    /// Properties of `grid` matching `filter`, in insertion order.
    ///
    /// The returned selection re-walks the model on every iteration.
    pub fn select(
        &self,
        grid: EntityId,
        filter: PropertyFilter,
    ) -> Result<Selection<'_, impl Iterator<Item = &Property> + Clone + '_>, ModelError> {
        self.grid(grid)?;
        let source = self
            .registry
            .iter()
            .filter_map(|(_, o)| o.as_property());
        Ok(Selection::new(grid, filter, source))
    }

    // ── Validated setters ───────────────────────────────────────

    /// Supply corner points to a grid. See [`Grid::supply_geometry`].
    pub fn supply_grid_geometry(
        &mut self,
        grid: EntityId,
        corner_points: Vec<Point3>,
    ) -> Result<GeometryStatus, ModelError> {
        self.grid(grid)?;
        let status = self.registry.update(grid, |object| match object {
            ModelObject::Grid(g) => g.supply_geometry(corner_points).map_err(ModelError::from),
            other => Err(ModelError::WrongKind {
                id: grid,
                expected: EntityKind::Grid,
                found: other.kind(),
            }),
        })??;
        Ok(status)
    }

    /// Set the citation title of any entity.
    pub fn set_title(&mut self, id: EntityId, title: impl Into<String>) -> Result<(), ModelError> {
        let title = title.into();
        self.registry
            .update(id, |o| o.header_mut().citation.title = title)?;
        Ok(())
    }

    /// Set or clear the originator of any entity.
    pub fn set_originator(&mut self, id: EntityId, originator: Option<String>) -> Result<(), ModelError> {
        self.registry
            .update(id, |o| o.header_mut().citation.originator = originator)?;
        Ok(())
    }

    /// Set one extra-metadata entry. Returns the previous value.
    pub fn set_extra_metadata(
        &mut self,
        id: EntityId,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Option<String>, ModelError> {
        let (key, value) = (key.into(), value.into());
        Ok(self
            .registry
            .update(id, |o| o.header_mut().extra_metadata.insert(key, value))?)
    }

    // ── Graph maintenance ───────────────────────────────────────

    /// Entities directly referencing `id`.
    pub fn referrers(&self, id: EntityId) -> Result<Vec<EntityId>, ModelError> {
        Ok(self.registry.referrers(id)?)
    }

    /// Entities transitively depending on `id`.
    pub fn dependents(&self, id: EntityId) -> Result<Vec<EntityId>, ModelError> {
        Ok(self.registry.dependents(id)?)
    }

    /// Remove `id`. With [`RemoveMode::Cascade`] every dependent goes too;
    /// the removed entities are returned dependents first.
    pub fn remove(&mut self, id: EntityId, mode: RemoveMode) -> Result<Vec<ModelObject>, ModelError> {
        let removed = self.registry.remove(id, mode)?;
        tracing::debug!(%id, count = removed.len(), ?mode, "entities removed");
        Ok(removed)
    }

    /// Point `referrer`'s reference at `old` to `new` instead.
    ///
    /// A grid may be re-pointed to another CRS and adopts its units; its raw
    /// coordinates are reinterpreted, not converted. A property may be
    /// re-pointed to another grid whose domain has the same element count.
    pub fn repoint(&mut self, referrer: EntityId, old: EntityId, new: EntityId) -> Result<(), ModelError> {
        match self.object(referrer)? {
            ModelObject::Crs(_) => {
                return Err(RegistryError::MissingReference {
                    referrer,
                    target: old,
                }
                .into())
            }
            ModelObject::Grid(_) => {
                self.crs(new)?;
            }
            ModelObject::Property(p) => {
                let domain = p.domain();
                let found = p.data().len();
                let expected = self.grid(new)?.extent().element_count(domain);
                if expected != found {
                    return Err(PropertyError::ArrayShapeMismatch {
                        domain,
                        expected,
                        found,
                    }
                    .into());
                }
            }
        }
        self.registry.repoint(referrer, old, new)?;
        if let Some(crs) = self.object(new)?.as_crs().cloned() {
            self.registry.update(referrer, |o| match o {
                ModelObject::Grid(g) => g.adopt_crs(&crs).map_err(ModelError::from),
                _ => Ok(()),
            })??;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resq_core::{IndexableElement, LengthUnit};
    use resq_property::{LookupTable, PropertyKind};

    fn box_points(extent: &Extent, dz: f64) -> Vec<Point3> {
        let (ni, nj, nk) = extent.dims();
        let mut pts = vec![Point3::UNDEFINED; extent.corner_point_count()];
        for k in 0..=nk {
            for j in 0..=nj {
                for i in 0..=ni {
                    for slot in 0..4 {
                        pts[extent.corner_index(i, j, k, slot)] =
                            Point3::new(i as f64 * 10.0, j as f64 * 10.0, 1000.0 + k as f64 * dz);
                    }
                }
            }
        }
        pts
    }

    fn model_with_grid() -> (Model, EntityId, EntityId) {
        let mut m = Model::new();
        let crs = m
            .define_crs(Crs::local(LengthUnit::Metre, LengthUnit::Metre))
            .unwrap();
        let e = Extent::new(2, 2, 1).unwrap();
        let grid = m.build_grid(e, box_points(&e, 5.0), crs).unwrap();
        (m, crs, grid)
    }

    // ── Registration ────────────────────────────────────────────

    #[test]
    fn ids_are_assigned_in_order() {
        let (m, crs, grid) = model_with_grid();
        assert_eq!(crs, EntityId(1));
        assert_eq!(grid, EntityId(2));
        assert_eq!(m.len(), 2);
        assert_eq!(m.grid(grid).unwrap().crs(), crs);
    }

    #[test]
    fn wrong_kind_reported() {
        let (m, crs, grid) = model_with_grid();
        assert_eq!(
            m.grid(crs).unwrap_err(),
            ModelError::WrongKind {
                id: crs,
                expected: EntityKind::Grid,
                found: EntityKind::Crs
            }
        );
        assert!(matches!(
            m.crs(grid),
            Err(ModelError::WrongKind { .. })
        ));
    }

    #[test]
    fn property_on_crs_rejected() {
        let (mut m, crs, _) = model_with_grid();
        let err = m
            .attach_property(
                crs,
                PropertySpec::new(PropertyKind::Porosity, IndexableElement::Cells),
                PropertyData::continuous(vec![0.1; 4]),
            )
            .unwrap_err();
        assert!(matches!(err, ModelError::WrongKind { .. }));
    }

    #[test]
    fn discrete_property_with_table() {
        let (mut m, _, grid) = model_with_grid();
        let table: LookupTable = [(0, "sand"), (1, "shale"), (2, "salt")].into_iter().collect();
        let id = m
            .attach_property(
                grid,
                PropertySpec::new(PropertyKind::Facies, IndexableElement::Cells).with_lookup(table),
                PropertyData::discrete(vec![0, 1, 2, 1]),
            )
            .unwrap();
        assert_eq!(m.property(id).unwrap().label_at(2).unwrap(), Some("salt"));
        let err = m
            .attach_property(
                grid,
                PropertySpec::new(PropertyKind::Facies, IndexableElement::Cells),
                PropertyData::discrete(vec![0, 1, 2, 1]),
            )
            .unwrap_err();
        assert_eq!(err, ModelError::Property(PropertyError::MissingLookupTable));
    }

    // ── Setters ─────────────────────────────────────────────────

    #[test]
    fn geometry_supplied_through_model() {
        let mut m = Model::new();
        let crs = m
            .define_crs(Crs::local(LengthUnit::Metre, LengthUnit::Metre))
            .unwrap();
        let e = Extent::new(1, 1, 1).unwrap();
        let grid = m.add_topology_grid(e, crs).unwrap();
        assert_eq!(m.grid(grid).unwrap().geometry_status(), GeometryStatus::Absent);
        let status = m.supply_grid_geometry(grid, box_points(&e, 2.0)).unwrap();
        assert_eq!(status, GeometryStatus::Complete);
        let volume = m.grid(grid).unwrap().cell_volume(0, 0, 0).unwrap();
        assert!((volume - 200.0).abs() < 1e-9);
        assert!(matches!(
            m.supply_grid_geometry(grid, box_points(&e, 2.0)),
            Err(ModelError::Grid(resq_grid::GridError::GeometryImmutable { .. }))
        ));
    }

    #[test]
    fn citation_setters() {
        let (mut m, _, grid) = model_with_grid();
        m.set_title(grid, "main grid").unwrap();
        m.set_originator(grid, Some("geomodeller".into())).unwrap();
        assert_eq!(m.set_extra_metadata(grid, "field", "north").unwrap(), None);
        let header = m.grid(grid).unwrap().header();
        assert_eq!(header.title(), "main grid");
        assert_eq!(header.citation.originator.as_deref(), Some("geomodeller"));
        assert_eq!(header.extra_metadata.get("field").map(String::as_str), Some("north"));
        assert!(m.set_title(EntityId(99), "x").is_err());
    }

    // ── Graph maintenance ───────────────────────────────────────

    #[test]
    fn cascade_removes_properties_with_grid() {
        let (mut m, crs, grid) = model_with_grid();
        let p = m
            .attach_property(
                grid,
                PropertySpec::new(PropertyKind::Porosity, IndexableElement::Cells),
                PropertyData::continuous(vec![0.2; 4]),
            )
            .unwrap();
        assert!(matches!(
            m.remove(crs, RemoveMode::Restrict),
            Err(ModelError::Registry(RegistryError::DanglingReference { .. }))
        ));
        let removed = m.remove(crs, RemoveMode::Cascade).unwrap();
        let ids: Vec<_> = removed.iter().filter_map(|o| o.id()).collect();
        assert_eq!(ids, vec![p, grid, crs]);
        assert!(m.is_empty());
        assert!(matches!(
            m.object(p),
            Err(ModelError::Registry(RegistryError::UnknownEntity { .. }))
        ));
    }

    #[test]
    fn repoint_grid_adopts_new_units() {
        let (mut m, crs, grid) = model_with_grid();
        let feet = m
            .define_crs(Crs::local(LengthUnit::Foot, LengthUnit::UsSurveyFoot))
            .unwrap();
        m.repoint(grid, crs, feet).unwrap();
        let g = m.grid(grid).unwrap();
        assert_eq!(g.crs(), feet);
        assert_eq!(g.xy_unit(), LengthUnit::Foot);
        assert_eq!(g.z_unit(), LengthUnit::UsSurveyFoot);
        assert!(m.referrers(crs).unwrap().is_empty());
        m.remove(crs, RemoveMode::Restrict).unwrap();
    }

    #[test]
    fn repoint_property_requires_matching_shape() {
        let (mut m, crs, grid) = model_with_grid();
        let p = m
            .attach_property(
                grid,
                PropertySpec::new(PropertyKind::Porosity, IndexableElement::Cells),
                PropertyData::continuous(vec![0.2; 4]),
            )
            .unwrap();
        let same = m.add_topology_grid(Extent::new(4, 1, 1).unwrap(), crs).unwrap();
        let other = m.add_topology_grid(Extent::new(3, 1, 1).unwrap(), crs).unwrap();
        assert!(matches!(
            m.repoint(p, grid, other),
            Err(ModelError::Property(PropertyError::ArrayShapeMismatch { .. }))
        ));
        m.repoint(p, grid, same).unwrap();
        assert_eq!(m.property(p).unwrap().grid(), same);
        assert!(matches!(m.repoint(p, grid, crs), Err(ModelError::WrongKind { .. })));
    }

    #[test]
    fn select_is_grid_scoped() {
        let (mut m, crs, grid) = model_with_grid();
        let other = m.add_topology_grid(Extent::new(2, 2, 1).unwrap(), crs).unwrap();
        for g in [grid, other, grid] {
            m.attach_property(
                g,
                PropertySpec::new(PropertyKind::Porosity, IndexableElement::Cells),
                PropertyData::continuous(vec![0.2; 4]),
            )
            .unwrap();
        }
        let sel = m.select(grid, PropertyFilter::any()).unwrap();
        let ids: Vec<_> = sel.iter().filter_map(|p| p.id()).collect();
        assert_eq!(ids, vec![EntityId(4), EntityId(6)]);
        assert_eq!(sel.count(), 2);
        assert!(m.select(crs, PropertyFilter::any()).is_err());
    }
}
