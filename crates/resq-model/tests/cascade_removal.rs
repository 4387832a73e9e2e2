//! Cascade removal over randomly shaped models.

use proptest::prelude::*;
use resq_core::{Entity, EntityId, IndexableElement, LengthUnit};
use resq_crs::Crs;
use resq_grid::Extent;
use resq_model::{Model, ModelError, RemoveMode};
use resq_property::{PropertyData, PropertyKind, PropertySpec};
use resq_registry::RegistryError;

/// `crs_count` CRSs; each grid picks a CRS, each property picks a grid.
fn build(crs_count: usize, grid_crs: &[usize], prop_grid: &[usize]) -> Model {
    let mut m = Model::new();
    let crs: Vec<EntityId> = (0..crs_count)
        .map(|_| {
            m.define_crs(Crs::local(LengthUnit::Metre, LengthUnit::Metre))
                .unwrap()
        })
        .collect();
    let grids: Vec<EntityId> = grid_crs
        .iter()
        .map(|&c| {
            m.add_topology_grid(Extent::new(2, 1, 1).unwrap(), crs[c % crs.len()])
                .unwrap()
        })
        .collect();
    for &g in prop_grid {
        if grids.is_empty() {
            break;
        }
        m.attach_property(
            grids[g % grids.len()],
            PropertySpec::new(PropertyKind::NetToGross, IndexableElement::Cells),
            PropertyData::continuous(vec![0.5, 0.7]),
        )
        .unwrap();
    }
    m
}

proptest! {
    #[test]
    fn cascade_leaves_no_dangling_references(
        crs_count in 1usize..4,
        grid_crs in prop::collection::vec(0usize..4, 0..6),
        prop_grid in prop::collection::vec(0usize..6, 0..10),
        victim in 0usize..20,
    ) {
        let mut m = build(crs_count, &grid_crs, &prop_grid);
        let ids: Vec<EntityId> = m.iter().map(|(id, _)| id).collect();
        let victim = ids[victim % ids.len()];
        let expected_gone = {
            let mut d = m.dependents(victim).unwrap();
            d.push(victim);
            d
        };
        let removed = m.remove(victim, RemoveMode::Cascade).unwrap();
        prop_assert_eq!(removed.len(), expected_gone.len());
        prop_assert_eq!(removed.last().and_then(|o| o.id()), Some(victim));
        for id in &expected_gone {
            let unknown = matches!(
                m.object(*id),
                Err(ModelError::Registry(RegistryError::UnknownEntity { .. }))
            );
            prop_assert!(unknown);
        }
        for (_, object) in m.iter() {
            for r in object.references() {
                prop_assert!(m.contains(r));
            }
        }
    }

    #[test]
    fn restrict_fails_exactly_when_referenced(
        grid_crs in prop::collection::vec(0usize..2, 0..4),
        victim in 0usize..8,
    ) {
        let mut m = build(2, &grid_crs, &[]);
        let ids: Vec<EntityId> = m.iter().map(|(id, _)| id).collect();
        let victim = ids[victim % ids.len()];
        let referenced = !m.referrers(victim).unwrap().is_empty();
        let before = m.len();
        match m.remove(victim, RemoveMode::Restrict) {
            Ok(removed) => {
                prop_assert!(!referenced);
                prop_assert_eq!(removed.len(), 1);
                prop_assert_eq!(m.len(), before - 1);
            }
            Err(ModelError::Registry(RegistryError::DanglingReference { id, referrers })) => {
                prop_assert!(referenced);
                prop_assert_eq!(id, victim);
                prop_assert!(!referrers.is_empty());
                prop_assert_eq!(m.len(), before);
            }
            Err(other) => prop_assert!(false, "unexpected error {other}"),
        }
    }
}
