//! CRS error types.

use std::error::Error;
use std::fmt;

use resq_core::{EntityId, UnitParseError};

/// Errors raised when defining a CRS or converting between two.
#[derive(Clone, Debug, PartialEq)]
pub enum CrsError {
    /// A unit symbol outside the closed enumeration.
    InvalidUnit {
        /// Which axis or quantity the unit was for (`"xy"`, `"z"`, `"rotation"`).
        axis: &'static str,
        /// The parse failure.
        source: UnitParseError,
    },
    /// A numeric parameter outside its valid range.
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// The two frames cannot be related without a reprojection engine or
    /// a datum offset.
    IncompatibleCrs {
        /// Source CRS, if registered.
        from: Option<EntityId>,
        /// Target CRS, if registered.
        to: Option<EntityId>,
        /// What differs.
        reason: String,
    },
}

impl fmt::Display for CrsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUnit { axis, source } => write!(f, "invalid {axis} unit: {source}"),
            Self::InvalidParameter { name, value } => {
                write!(f, "invalid CRS parameter {name}: {value}")
            }
            Self::IncompatibleCrs { from, to, reason } => {
                let show = |id: &Option<EntityId>| match id {
                    Some(id) => id.to_string(),
                    None => "<unregistered>".to_string(),
                };
                write!(
                    f,
                    "cannot convert from CRS {} to CRS {}: {reason}",
                    show(from),
                    show(to)
                )
            }
        }
    }
}

impl Error for CrsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidUnit { source, .. } => Some(source),
            _ => None,
        }
    }
}
