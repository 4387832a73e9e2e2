//! The coordinate reference system entity.

use std::fmt;
use std::str::FromStr;

use resq_core::{
    AngleUnit, Entity, EntityHeader, EntityId, EntityKind, LengthUnit, Point3, References,
};

use crate::config::GeometryTolerance;
use crate::error::CrsError;

/// What kind of frame a CRS describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CrsKind {
    /// A map projection identified by a projection code.
    Projected,
    /// A vertical-only frame (datum plus z convention).
    Vertical,
    /// A local engineering frame placed by origin and rotation.
    Local,
}

impl CrsKind {
    /// Stable symbolic name used in the metadata document.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Projected => "projected",
            Self::Vertical => "vertical",
            Self::Local => "local",
        }
    }
}

impl fmt::Display for CrsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CrsKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "projected" => Ok(Self::Projected),
            "vertical" => Ok(Self::Vertical),
            "local" => Ok(Self::Local),
            other => Err(format!("unknown CRS kind '{other}'")),
        }
    }
}

/// Unit symbols for the horizontal and vertical axes of a CRS.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnitSymbols<'a> {
    /// Symbol for x and y (`"m"`, `"ft"`, ...).
    pub xy: &'a str,
    /// Symbol for z.
    pub z: &'a str,
}

/// Frame placement parameters for [`Crs::define`].
#[derive(Clone, Debug, PartialEq)]
pub struct CrsParams {
    /// Offset of the local origin in the parent frame, in CRS units.
    pub origin: Point3,
    /// Rotation of the local xy axes, counter-clockwise.
    pub rotation: f64,
    /// Angle unit symbol for `rotation` (`"dega"` or `"rad"`).
    pub rotation_unit: String,
    /// `true` when z is a depth (increasing downward).
    pub z_increasing_downward: bool,
    /// Projected-system code, EPSG style.
    pub projection_code: Option<u32>,
    /// Vertical datum name.
    pub vertical_datum: Option<String>,
}

impl Default for CrsParams {
    fn default() -> Self {
        Self {
            origin: Point3::default(),
            rotation: 0.0,
            rotation_unit: AngleUnit::Degree.symbol().to_string(),
            z_increasing_downward: true,
            projection_code: None,
            vertical_datum: None,
        }
    }
}

/// A coordinate reference system.
///
/// Grids referencing a CRS store raw coordinates in the CRS's local frame
/// and units. The local frame maps to the parent frame by rotating xy
/// counter-clockwise by [`rotation_degrees`](Crs::rotation_degrees) and
/// then adding [`origin`](Crs::origin).
#[derive(Clone, Debug, PartialEq)]
pub struct Crs {
    header: EntityHeader,
    kind: CrsKind,
    xy_unit: LengthUnit,
    z_unit: LengthUnit,
    rotation_degrees: f64,
    rotation_unit: AngleUnit,
    origin: Point3,
    z_increasing_downward: bool,
    projection_code: Option<u32>,
    vertical_datum: Option<String>,
}

impl Crs {
    /// An unrotated frame at the origin with depth-positive z.
    pub fn new(kind: CrsKind, xy_unit: LengthUnit, z_unit: LengthUnit) -> Self {
        Self {
            header: EntityHeader::new(format!("{kind} crs")),
            kind,
            xy_unit,
            z_unit,
            rotation_degrees: 0.0,
            rotation_unit: AngleUnit::Degree,
            origin: Point3::default(),
            z_increasing_downward: true,
            projection_code: None,
            vertical_datum: None,
        }
    }

    /// Shorthand for a [`CrsKind::Local`] frame.
    pub fn local(xy_unit: LengthUnit, z_unit: LengthUnit) -> Self {
        Self::new(CrsKind::Local, xy_unit, z_unit)
    }

    /// Define a CRS from unit symbols and placement parameters.
    pub fn define(kind: CrsKind, units: UnitSymbols<'_>, params: CrsParams) -> Result<Self, CrsError> {
        let xy_unit = units
            .xy
            .parse::<LengthUnit>()
            .map_err(|source| CrsError::InvalidUnit { axis: "xy", source })?;
        let z_unit = units
            .z
            .parse::<LengthUnit>()
            .map_err(|source| CrsError::InvalidUnit { axis: "z", source })?;
        let angle = params
            .rotation_unit
            .parse::<AngleUnit>()
            .map_err(|source| CrsError::InvalidUnit {
                axis: "rotation",
                source,
            })?;
        let mut crs = Self::new(kind, xy_unit, z_unit)
            .with_origin(params.origin)?
            .with_rotation(params.rotation, angle)?
            .with_z_increasing_downward(params.z_increasing_downward);
        crs.projection_code = params.projection_code;
        crs.vertical_datum = params.vertical_datum;
        Ok(crs)
    }

    /// Set the citation title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.header.citation.title = title.into();
        self
    }

    /// Set the origin offset. Every component must be finite.
    pub fn with_origin(mut self, origin: Point3) -> Result<Self, CrsError> {
        for (name, value) in [
            ("x offset", origin.x),
            ("y offset", origin.y),
            ("z offset", origin.z),
        ] {
            if !value.is_finite() {
                return Err(CrsError::InvalidParameter { name, value });
            }
        }
        self.origin = origin;
        Ok(self)
    }

    /// Set the rotation. Stored in degrees, normalised to [0, 360); the
    /// unit is remembered for reporting.
    pub fn with_rotation(mut self, value: f64, unit: AngleUnit) -> Result<Self, CrsError> {
        if !value.is_finite() {
            return Err(CrsError::InvalidParameter {
                name: "rotation",
                value,
            });
        }
        let mut degrees = unit.to_degrees(value).rem_euclid(360.0);
        if degrees >= 360.0 {
            degrees = 0.0;
        }
        self.rotation_degrees = degrees;
        self.rotation_unit = unit;
        Ok(self)
    }

    /// Change the unit rotation is reported in, keeping the angle.
    pub fn with_rotation_unit(mut self, unit: AngleUnit) -> Self {
        self.rotation_unit = unit;
        self
    }

    /// Set the z direction convention.
    pub fn with_z_increasing_downward(mut self, down: bool) -> Self {
        self.z_increasing_downward = down;
        self
    }

    /// Set the projected-system code.
    pub fn with_projection_code(mut self, code: u32) -> Self {
        self.projection_code = Some(code);
        self
    }

    /// Set the vertical datum name.
    pub fn with_vertical_datum(mut self, datum: impl Into<String>) -> Self {
        self.vertical_datum = Some(datum.into());
        self
    }

    /// Frame kind.
    pub fn kind(&self) -> CrsKind {
        self.kind
    }

    /// Unit of x and y coordinates.
    pub fn xy_unit(&self) -> LengthUnit {
        self.xy_unit
    }

    /// Unit of z coordinates.
    pub fn z_unit(&self) -> LengthUnit {
        self.z_unit
    }

    /// Rotation in degrees, in [0, 360).
    pub fn rotation_degrees(&self) -> f64 {
        self.rotation_degrees
    }

    /// Rotation expressed in the unit it was supplied in.
    pub fn rotation(&self) -> f64 {
        self.rotation_unit.from_degrees(self.rotation_degrees)
    }

    /// The unit the rotation was supplied in.
    pub fn rotation_unit(&self) -> AngleUnit {
        self.rotation_unit
    }

    /// Origin offset in CRS units.
    pub fn origin(&self) -> Point3 {
        self.origin
    }

    /// `true` when z is a depth.
    pub fn z_increasing_downward(&self) -> bool {
        self.z_increasing_downward
    }

    /// Projected-system code, if any.
    pub fn projection_code(&self) -> Option<u32> {
        self.projection_code
    }

    /// Vertical datum name, if any.
    pub fn vertical_datum(&self) -> Option<&str> {
        self.vertical_datum.as_deref()
    }

    /// Factor that converts a z value into xy units.
    pub fn z_to_xy_factor(&self) -> f64 {
        self.z_unit.conversion_factor(self.xy_unit)
    }

    fn sin_cos(&self) -> (f64, f64) {
        if self.rotation_degrees == 0.0 {
            (0.0, 1.0)
        } else {
            self.rotation_degrees.to_radians().sin_cos()
        }
    }

    /// Map a raw local point into the parent frame (same units).
    pub fn local_to_global(&self, p: Point3) -> Point3 {
        let (s, c) = self.sin_cos();
        Point3::new(
            self.origin.x + c * p.x - s * p.y,
            self.origin.y + s * p.x + c * p.y,
            self.origin.z + p.z,
        )
    }

    /// Inverse of [`local_to_global`](Self::local_to_global).
    pub fn global_to_local(&self, p: Point3) -> Point3 {
        let (s, c) = self.sin_cos();
        let dx = p.x - self.origin.x;
        let dy = p.y - self.origin.y;
        Point3::new(c * dx + s * dy, -s * dx + c * dy, p.z - self.origin.z)
    }

    /// `true` when both describe the same frame in the same units.
    ///
    /// Offsets are compared in metres against `tolerance.linear`, rotations
    /// in degrees against `tolerance.angular` (modulo 360).
    pub fn is_equivalent(&self, other: &Crs, tolerance: &GeometryTolerance) -> bool {
        if self.xy_unit != other.xy_unit
            || self.z_unit != other.z_unit
            || self.z_increasing_downward != other.z_increasing_downward
            || self.projection_code != other.projection_code
            || self.vertical_datum != other.vertical_datum
        {
            return false;
        }
        let xy_m = self.xy_unit.metres_per_unit();
        let z_m = self.z_unit.metres_per_unit();
        let d = self.origin - other.origin;
        let offset = ((d.x * xy_m).powi(2) + (d.y * xy_m).powi(2) + (d.z * z_m).powi(2)).sqrt();
        let mut dr = (self.rotation_degrees - other.rotation_degrees).abs();
        if dr > 180.0 {
            dr = 360.0 - dr;
        }
        offset <= tolerance.linear && dr <= tolerance.angular
    }
}

impl Entity for Crs {
    fn header(&self) -> &EntityHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut EntityHeader {
        &mut self.header
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Crs
    }

    fn references(&self) -> References {
        References::new()
    }

    fn retarget(&mut self, _old: EntityId, _new: EntityId) -> bool {
        false
    }
}
