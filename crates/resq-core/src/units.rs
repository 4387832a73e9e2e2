//! Closed enumerations of units of measure.
//!
//! Every unit has a canonical symbol (used in the metadata document)
//! and parses from that symbol plus a handful of common long names.
//! Anything else is rejected with [`UnitParseError`].

use std::fmt;
use std::str::FromStr;

use crate::error::UnitParseError;

/// Length units for CRS axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LengthUnit {
    /// SI metre (`m`).
    Metre,
    /// Centimetre (`cm`).
    Centimetre,
    /// Kilometre (`km`).
    Kilometre,
    /// International foot (`ft`), exactly 0.3048 m.
    Foot,
    /// US survey foot (`ftUS`), 1200/3937 m.
    UsSurveyFoot,
}

impl LengthUnit {
    /// All variants, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Metre,
        Self::Centimetre,
        Self::Kilometre,
        Self::Foot,
        Self::UsSurveyFoot,
    ];

    /// Canonical symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Metre => "m",
            Self::Centimetre => "cm",
            Self::Kilometre => "km",
            Self::Foot => "ft",
            Self::UsSurveyFoot => "ftUS",
        }
    }

    /// Size of one unit in metres.
    pub fn metres_per_unit(self) -> f64 {
        match self {
            Self::Metre => 1.0,
            Self::Centimetre => 0.01,
            Self::Kilometre => 1000.0,
            Self::Foot => 0.3048,
            Self::UsSurveyFoot => 1200.0 / 3937.0,
        }
    }

    /// Factor converting a value in `self` to a value in `to`.
    pub fn conversion_factor(self, to: Self) -> f64 {
        if self == to {
            1.0
        } else {
            self.metres_per_unit() / to.metres_per_unit()
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for LengthUnit {
    type Err = UnitParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "m" | "metre" | "metres" | "meter" | "meters" => Ok(Self::Metre),
            "cm" | "centimetre" | "centimeter" => Ok(Self::Centimetre),
            "km" | "kilometre" | "kilometer" => Ok(Self::Kilometre),
            "ft" | "foot" | "feet" => Ok(Self::Foot),
            "ftUS" | "us survey foot" | "US survey foot" => Ok(Self::UsSurveyFoot),
            other => Err(UnitParseError::new("length", other)),
        }
    }
}

/// Plane angle units for CRS rotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AngleUnit {
    /// Degrees (`dega`).
    Degree,
    /// Radians (`rad`).
    Radian,
}

impl AngleUnit {
    /// Canonical symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Degree => "dega",
            Self::Radian => "rad",
        }
    }

    /// Convert a value in this unit to degrees.
    pub fn to_degrees(self, value: f64) -> f64 {
        match self {
            Self::Degree => value,
            Self::Radian => value.to_degrees(),
        }
    }

    /// Convert a value in degrees to this unit.
    pub fn from_degrees(self, degrees: f64) -> f64 {
        match self {
            Self::Degree => degrees,
            Self::Radian => degrees.to_radians(),
        }
    }
}

impl fmt::Display for AngleUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for AngleUnit {
    type Err = UnitParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "dega" | "deg" | "degree" | "degrees" => Ok(Self::Degree),
            "rad" | "radian" | "radians" => Ok(Self::Radian),
            other => Err(UnitParseError::new("angle", other)),
        }
    }
}

/// Units of measure for property values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PropertyUnit {
    /// Dimensionless (`Euc`).
    Euc,
    /// Volume fraction (`m3/m3`).
    Fraction,
    /// Percent (`%`).
    Percent,
    /// Cubic metre (`m3`).
    CubicMetre,
    /// Cubic foot (`ft3`).
    CubicFoot,
    /// Oilfield barrel (`bbl`).
    Barrel,
    /// Millidarcy (`mD`).
    Millidarcy,
    /// Bar (`bar`).
    Bar,
    /// Kilopascal (`kPa`).
    Kilopascal,
    /// Pound per square inch (`psi`).
    Psi,
    /// Degree Celsius (`degC`).
    DegreeCelsius,
    /// Degree Fahrenheit (`degF`).
    DegreeFahrenheit,
    /// Metre (`m`).
    Metre,
    /// Foot (`ft`).
    Foot,
}

impl PropertyUnit {
    /// Canonical symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Euc => "Euc",
            Self::Fraction => "m3/m3",
            Self::Percent => "%",
            Self::CubicMetre => "m3",
            Self::CubicFoot => "ft3",
            Self::Barrel => "bbl",
            Self::Millidarcy => "mD",
            Self::Bar => "bar",
            Self::Kilopascal => "kPa",
            Self::Psi => "psi",
            Self::DegreeCelsius => "degC",
            Self::DegreeFahrenheit => "degF",
            Self::Metre => "m",
            Self::Foot => "ft",
        }
    }
}

impl fmt::Display for PropertyUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for PropertyUnit {
    type Err = UnitParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Euc" | "euc" => Ok(Self::Euc),
            "m3/m3" | "v/v" | "fraction" => Ok(Self::Fraction),
            "%" | "percent" => Ok(Self::Percent),
            "m3" => Ok(Self::CubicMetre),
            "ft3" => Ok(Self::CubicFoot),
            "bbl" => Ok(Self::Barrel),
            "mD" | "md" => Ok(Self::Millidarcy),
            "bar" => Ok(Self::Bar),
            "kPa" => Ok(Self::Kilopascal),
            "psi" => Ok(Self::Psi),
            "degC" => Ok(Self::DegreeCelsius),
            "degF" => Ok(Self::DegreeFahrenheit),
            "m" => Ok(Self::Metre),
            "ft" => Ok(Self::Foot),
            other => Err(UnitParseError::new("property", other)),
        }
    }
}
