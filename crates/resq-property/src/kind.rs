//! Property kinds, data types and facets.

use std::fmt;
use std::str::FromStr;

/// Storage class of a property's values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    /// One `f64` per element.
    Continuous,
    /// One `i64` code per element, labelled by a lookup table.
    Discrete,
    /// One point per element.
    Points,
}

impl DataType {
    /// Stable symbolic name used in the metadata document.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Continuous => "continuous",
            Self::Discrete => "discrete",
            Self::Points => "points",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "continuous" => Ok(Self::Continuous),
            "discrete" => Ok(Self::Discrete),
            "points" => Ok(Self::Points),
            other => Err(format!("unknown data type '{other}'")),
        }
    }
}

/// Semantic kind of a property.
///
/// Each kind has one natural [`DataType`]; a property's values must use it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyKind {
    /// Pore volume per cell.
    PoreVolume,
    /// Porosity fraction.
    Porosity,
    /// Rock permeability.
    Permeability,
    /// Fluid saturation.
    Saturation,
    /// Net-to-gross ratio.
    NetToGross,
    /// Bulk rock volume.
    RockVolume,
    /// Depth of the element.
    Depth,
    /// Cell thickness.
    Thickness,
    /// Fluid pressure.
    Pressure,
    /// Thermodynamic temperature.
    Temperature,
    /// Face transmissibility.
    Transmissibility,
    /// Facies code.
    Facies,
    /// Region code.
    Region,
    /// Zone code.
    Zone,
    /// Active-cell flag.
    Active,
    /// Point location.
    Location,
    /// Point displacement.
    Displacement,
}

impl PropertyKind {
    /// All kinds, in declaration order.
    pub const ALL: [Self; 17] = [
        Self::PoreVolume,
        Self::Porosity,
        Self::Permeability,
        Self::Saturation,
        Self::NetToGross,
        Self::RockVolume,
        Self::Depth,
        Self::Thickness,
        Self::Pressure,
        Self::Temperature,
        Self::Transmissibility,
        Self::Facies,
        Self::Region,
        Self::Zone,
        Self::Active,
        Self::Location,
        Self::Displacement,
    ];

    /// Symbolic name used in the metadata document.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PoreVolume => "pore volume",
            Self::Porosity => "porosity",
            Self::Permeability => "permeability rock",
            Self::Saturation => "saturation",
            Self::NetToGross => "net to gross ratio",
            Self::RockVolume => "rock volume",
            Self::Depth => "depth",
            Self::Thickness => "thickness",
            Self::Pressure => "pressure",
            Self::Temperature => "thermodynamic temperature",
            Self::Transmissibility => "transmissibility",
            Self::Facies => "facies",
            Self::Region => "region initialization",
            Self::Zone => "zone",
            Self::Active => "active",
            Self::Location => "location",
            Self::Displacement => "displacement",
        }
    }

    /// The data type values of this kind must use.
    pub fn natural_data_type(self) -> DataType {
        match self {
            Self::Facies | Self::Region | Self::Zone | Self::Active => DataType::Discrete,
            Self::Location | Self::Displacement => DataType::Points,
            _ => DataType::Continuous,
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown property kind '{s}'"))
    }
}

/// Grid axis a directional property refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Along I.
    I,
    /// Along J.
    J,
    /// Along K.
    K,
}

/// Fluid phase a phase-specific property refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Oil.
    Oil,
    /// Gas.
    Gas,
    /// Water.
    Water,
}

/// Qualifier narrowing a property kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Facet {
    /// A grid direction (e.g. permeability along K).
    Direction(Direction),
    /// A fluid phase (e.g. water saturation).
    Phase(Phase),
}

impl Facet {
    /// Stable symbolic name used in the metadata document.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Direction(Direction::I) => "I",
            Self::Direction(Direction::J) => "J",
            Self::Direction(Direction::K) => "K",
            Self::Phase(Phase::Oil) => "oil",
            Self::Phase(Phase::Gas) => "gas",
            Self::Phase(Phase::Water) => "water",
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Facet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "I" => Ok(Self::Direction(Direction::I)),
            "J" => Ok(Self::Direction(Direction::J)),
            "K" => Ok(Self::Direction(Direction::K)),
            "oil" => Ok(Self::Phase(Phase::Oil)),
            "gas" => Ok(Self::Phase(Phase::Gas)),
            "water" => Ok(Self::Phase(Phase::Water)),
            other => Err(format!("unknown facet '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_round_trip() {
        for kind in PropertyKind::ALL {
            assert_eq!(kind.as_str().parse::<PropertyKind>().unwrap(), kind);
        }
        assert!("viscosity".parse::<PropertyKind>().is_err());
    }

    #[test]
    fn discrete_kinds() {
        assert_eq!(PropertyKind::Facies.natural_data_type(), DataType::Discrete);
        assert_eq!(PropertyKind::Active.natural_data_type(), DataType::Discrete);
        assert_eq!(PropertyKind::Porosity.natural_data_type(), DataType::Continuous);
        assert_eq!(PropertyKind::Location.natural_data_type(), DataType::Points);
    }

    #[test]
    fn facet_names_round_trip() {
        for s in ["I", "J", "K", "oil", "gas", "water"] {
            assert_eq!(s.parse::<Facet>().unwrap().as_str(), s);
        }
    }
}
