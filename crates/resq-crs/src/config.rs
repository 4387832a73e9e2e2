//! Comparison tolerances for coordinate frames and geometry.

use crate::error::CrsError;

/// Tolerances used when deciding whether two frames coincide.
///
/// Validated at construction; all values are immutable after creation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeometryTolerance {
    /// Maximum distance, in metres, between two offsets considered equal.
    ///
    /// Default: 1e-6. Must be finite and non-negative.
    pub linear: f64,

    /// Maximum difference, in degrees, between two rotations considered equal.
    ///
    /// Default: 1e-9. Must be finite and non-negative.
    pub angular: f64,
}

impl GeometryTolerance {
    /// Default linear tolerance in metres.
    pub const DEFAULT_LINEAR: f64 = 1e-6;

    /// Default angular tolerance in degrees.
    pub const DEFAULT_ANGULAR: f64 = 1e-9;

    /// Create a tolerance, validating both values.
    pub fn new(linear: f64, angular: f64) -> Result<Self, CrsError> {
        let tol = Self { linear, angular };
        tol.validate()?;
        Ok(tol)
    }

    /// Check both values are finite and non-negative.
    pub fn validate(&self) -> Result<(), CrsError> {
        if !(self.linear.is_finite() && self.linear >= 0.0) {
            return Err(CrsError::InvalidParameter {
                name: "linear tolerance",
                value: self.linear,
            });
        }
        if !(self.angular.is_finite() && self.angular >= 0.0) {
            return Err(CrsError::InvalidParameter {
                name: "angular tolerance",
                value: self.angular,
            });
        }
        Ok(())
    }
}

impl Default for GeometryTolerance {
    fn default() -> Self {
        Self {
            linear: Self::DEFAULT_LINEAR,
            angular: Self::DEFAULT_ANGULAR,
        }
    }
}
