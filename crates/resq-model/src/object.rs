//! The closed set of entity kinds a model holds.

use resq_core::{Entity, EntityHeader, EntityId, EntityKind, References};
use resq_crs::Crs;
use resq_grid::Grid;
use resq_property::Property;

/// One registered model entity.
#[derive(Clone, Debug)]
pub enum ModelObject {
    /// A coordinate reference system.
    Crs(Crs),
    /// A corner-point grid.
    Grid(Grid),
    /// A grid-linked property.
    Property(Property),
}

impl ModelObject {
    /// The CRS, if this is one.
    pub fn as_crs(&self) -> Option<&Crs> {
        match self {
            Self::Crs(c) => Some(c),
            _ => None,
        }
    }

    /// The grid, if this is one.
    pub fn as_grid(&self) -> Option<&Grid> {
        match self {
            Self::Grid(g) => Some(g),
            _ => None,
        }
    }

    /// The property, if this is one.
    pub fn as_property(&self) -> Option<&Property> {
        match self {
            Self::Property(p) => Some(p),
            _ => None,
        }
    }

    fn inner(&self) -> &dyn Entity {
        match self {
            Self::Crs(c) => c,
            Self::Grid(g) => g,
            Self::Property(p) => p,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Entity {
        match self {
            Self::Crs(c) => c,
            Self::Grid(g) => g,
            Self::Property(p) => p,
        }
    }
}

impl Entity for ModelObject {
    fn header(&self) -> &EntityHeader {
        self.inner().header()
    }

    fn header_mut(&mut self) -> &mut EntityHeader {
        self.inner_mut().header_mut()
    }

    fn kind(&self) -> EntityKind {
        self.inner().kind()
    }

    fn references(&self) -> References {
        self.inner().references()
    }

    fn retarget(&mut self, old: EntityId, new: EntityId) -> bool {
        self.inner_mut().retarget(old, new)
    }
}

impl From<Crs> for ModelObject {
    fn from(c: Crs) -> Self {
        Self::Crs(c)
    }
}

impl From<Grid> for ModelObject {
    fn from(g: Grid) -> Self {
        Self::Grid(g)
    }
}

impl From<Property> for ModelObject {
    fn from(p: Property) -> Self {
        Self::Property(p)
    }
}
