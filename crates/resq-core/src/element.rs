//! Indexable element domains a property can be attached to.

use std::fmt;
use std::str::FromStr;

/// The grid elements a property array is indexed by.
///
/// Element counts for a given extent are computed by the grid crate;
/// this enum only names the domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IndexableElement {
    /// One value per cell (`ni * nj * nk`).
    Cells,
    /// One value per cell face: I-faces, then J-faces, then K-faces.
    Faces,
    /// One value per pillar node per layer interface
    /// (`(ni + 1) * (nj + 1) * (nk + 1)`).
    Nodes,
}

impl IndexableElement {
    /// Stable symbolic name used in the metadata document.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cells => "cells",
            Self::Faces => "faces",
            Self::Nodes => "nodes",
        }
    }
}

impl fmt::Display for IndexableElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndexableElement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cells" => Ok(Self::Cells),
            "faces" => Ok(Self::Faces),
            "nodes" => Ok(Self::Nodes),
            other => Err(format!("unknown indexable element '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for e in [
            IndexableElement::Cells,
            IndexableElement::Faces,
            IndexableElement::Nodes,
        ] {
            assert_eq!(e.to_string().parse::<IndexableElement>().unwrap(), e);
        }
        assert!("columns".parse::<IndexableElement>().is_err());
    }
}
