//! Attach-time validation over arbitrary value arrays.

use proptest::prelude::*;
use resq_core::{Entity, EntityId, IndexableElement, LengthUnit};
use resq_crs::Crs;
use resq_grid::{Extent, Grid};
use resq_property::{
    LookupTable, Property, PropertyData, PropertyError, PropertyKind, PropertySpec,
};

fn grid(ni: usize, nj: usize, nk: usize) -> Grid {
    let mut crs = Crs::local(LengthUnit::Metre, LengthUnit::Metre);
    crs.header_mut().assign_id(EntityId(1)).unwrap();
    let mut g = Grid::topology_only(Extent::new(ni, nj, nk).unwrap(), &crs).unwrap();
    g.header_mut().assign_id(EntityId(2)).unwrap();
    g
}

fn zones() -> LookupTable {
    [(1, "upper"), (2, "middle"), (3, "lower")].into_iter().collect()
}

proptest! {
    #[test]
    fn labelled_codes_always_attach(
        dims in (1usize..4, 1usize..4, 1usize..4),
        seed in prop::collection::vec(1i64..=3, 64),
    ) {
        let g = grid(dims.0, dims.1, dims.2);
        let n = g.extent().cell_count();
        let codes: Vec<i64> = seed.iter().cycle().take(n).copied().collect();
        let p = Property::attach(
            &g,
            PropertySpec::new(PropertyKind::Zone, IndexableElement::Cells).with_lookup(zones()),
            PropertyData::discrete(codes.clone()),
        ).unwrap();
        prop_assert_eq!(p.discrete_values().unwrap(), Some(codes.as_slice()));
        prop_assert_eq!(p.statistics().defined, n);
    }

    #[test]
    fn first_unlabelled_code_is_reported(
        codes in prop::collection::vec(0i64..6, 8),
    ) {
        let g = grid(2, 2, 2);
        let result = Property::attach(
            &g,
            PropertySpec::new(PropertyKind::Zone, IndexableElement::Cells).with_lookup(zones()),
            PropertyData::discrete(codes.clone()),
        );
        match codes.iter().position(|c| !(1..=3).contains(c)) {
            Some(index) => prop_assert_eq!(
                result.unwrap_err(),
                PropertyError::CodeNotInLookup { code: codes[index], index }
            ),
            None => prop_assert!(result.is_ok()),
        }
    }

    #[test]
    fn length_must_equal_domain_count(extra in 1usize..5, shorter in any::<bool>()) {
        let g = grid(3, 2, 1);
        let expected = g.extent().cell_count();
        let found = if shorter { expected - extra.min(expected) } else { expected + extra };
        let err = Property::attach(
            &g,
            PropertySpec::new(PropertyKind::Porosity, IndexableElement::Cells),
            PropertyData::continuous(vec![0.25; found]),
        ).unwrap_err();
        prop_assert_eq!(
            err,
            PropertyError::ArrayShapeMismatch { domain: IndexableElement::Cells, expected, found }
        );
    }
}
