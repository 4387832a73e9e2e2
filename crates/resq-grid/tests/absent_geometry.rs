use resq_core::{Entity, EntityId, LengthUnit, Point3};
use resq_crs::Crs;
use resq_grid::{Extent, GeometryStatus, Grid, GridError};

fn registered_crs() -> Crs {
    let mut crs = Crs::local(LengthUnit::Metre, LengthUnit::Metre);
    crs.header_mut().assign_id(EntityId(1)).unwrap();
    crs
}

#[test]
fn every_cell_query_fails_without_geometry() {
    let extent = Extent::new(3, 2, 2).unwrap();
    let grid = Grid::topology_only(extent, &registered_crs()).unwrap();
    for (i, j, k) in extent.cells() {
        assert!(matches!(
            grid.cell_geometry(i, j, k),
            Err(GridError::NoGeometry { cell: None, .. })
        ));
        assert!(grid.cell_volume(i, j, k).is_err());
    }
}

#[test]
fn fully_undefined_array_is_partial() {
    let extent = Extent::new(2, 2, 1).unwrap();
    let grid = Grid::build(
        extent,
        vec![Point3::UNDEFINED; extent.corner_point_count()],
        &registered_crs(),
    )
    .unwrap();
    assert_eq!(grid.geometry_status(), GeometryStatus::Partial);
    assert_eq!(grid.defined_cell_count(), 0);
    assert_eq!(grid.bounding_box().unwrap(), None);
}
