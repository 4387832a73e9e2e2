//! The [`Entity`] trait and the header every model object carries.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;

use crate::id::EntityId;

/// Outgoing references of an entity, in declaration order.
///
/// Two inline slots cover every entity kind in the model (a property
/// references its grid, a grid references its CRS).
pub type References = SmallVec<[EntityId; 2]>;

/// Kind tag of an addressable model object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    /// A coordinate reference system.
    Crs,
    /// A corner-point grid.
    Grid,
    /// A grid-linked property array.
    Property,
}

impl EntityKind {
    /// Stable symbolic name used in the metadata document.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Crs => "crs",
            Self::Grid => "grid",
            Self::Property => "property",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "crs" => Ok(Self::Crs),
            "grid" => Ok(Self::Grid),
            "property" => Ok(Self::Property),
            other => Err(format!("unknown entity kind '{other}'")),
        }
    }
}

/// Human-readable citation of an entity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Citation {
    /// Title shown to users; not required to be unique.
    pub title: String,
    /// Person or process that created the entity.
    pub originator: Option<String>,
}

impl Citation {
    /// Citation with the given title and no originator.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            originator: None,
        }
    }
}

/// Identity and descriptive data shared by all entity kinds.
///
/// The id starts out unset and is assigned exactly once, by the
/// registry when the entity is registered (or restored from a
/// container). Once set it cannot be changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntityHeader {
    id: Option<EntityId>,
    /// Title and originator.
    pub citation: Citation,
    /// Free-form key/value annotations, kept in key order.
    pub extra_metadata: BTreeMap<String, String>,
}

impl EntityHeader {
    /// An unregistered header with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: None,
            citation: Citation::titled(title),
            extra_metadata: BTreeMap::new(),
        }
    }

    /// A header that already carries `id` (deserialization path).
    pub fn with_id(id: EntityId, citation: Citation) -> Self {
        Self {
            id: Some(id),
            citation,
            extra_metadata: BTreeMap::new(),
        }
    }

    /// The assigned id, if any.
    pub fn id(&self) -> Option<EntityId> {
        self.id
    }

    /// The title from the citation.
    pub fn title(&self) -> &str {
        &self.citation.title
    }

    /// Assign the id. Fails with the existing id if one is already set.
    pub fn assign_id(&mut self, id: EntityId) -> Result<(), EntityId> {
        match self.id {
            Some(existing) => Err(existing),
            None => {
                self.id = Some(id);
                Ok(())
            }
        }
    }
}

/// Behaviour common to every addressable model object.
///
/// The registry stores values of any `Entity` type and uses
/// [`references`](Entity::references) to maintain its reverse index.
pub trait Entity {
    /// Shared identity and citation data.
    fn header(&self) -> &EntityHeader;

    /// Mutable access to the header, for id assignment and citation edits.
    fn header_mut(&mut self) -> &mut EntityHeader;

    /// Kind tag.
    fn kind(&self) -> EntityKind;

    /// Entities this one depends on, in declaration order.
    fn references(&self) -> References;

    /// Replace every reference to `old` with `new`.
    ///
    /// Returns `true` if at least one reference was rewritten.
    fn retarget(&mut self, old: EntityId, new: EntityId) -> bool;

    /// Convenience accessor for the assigned id.
    fn id(&self) -> Option<EntityId> {
        self.header().id()
    }

    /// Convenience accessor for the title.
    fn title(&self) -> &str {
        self.header().title()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_assigned_once() {
        let mut header = EntityHeader::new("grid");
        assert_eq!(header.id(), None);
        header.assign_id(EntityId(3)).unwrap();
        assert_eq!(header.id(), Some(EntityId(3)));
        assert_eq!(header.assign_id(EntityId(4)), Err(EntityId(3)));
        assert_eq!(header.id(), Some(EntityId(3)));
    }

    #[test]
    fn kind_names_round_trip() {
        for kind in [EntityKind::Crs, EntityKind::Grid, EntityKind::Property] {
            assert_eq!(kind.as_str().parse::<EntityKind>().unwrap(), kind);
        }
        assert!("well".parse::<EntityKind>().is_err());
    }
}
