//! Three-component points and the small amount of vector algebra the
//! geometry engine needs.

use std::ops::{Add, Mul, Sub};

/// A point (or vector) in a CRS's raw coordinate space.
///
/// Undefined coordinates are represented as NaN; see
/// [`is_defined`](Point3::is_defined).
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point3 {
    /// Easting (or local x).
    pub x: f64,
    /// Northing (or local y).
    pub y: f64,
    /// Depth or elevation, per the CRS `z_increasing_downward` flag.
    pub z: f64,
}

impl Point3 {
    /// The undefined point (all components NaN).
    pub const UNDEFINED: Self = Self {
        x: f64::NAN,
        y: f64::NAN,
        z: f64::NAN,
    };

    /// Construct a point.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// `true` when no component is NaN.
    pub fn is_defined(&self) -> bool {
        !(self.x.is_nan() || self.y.is_nan() || self.z.is_nan())
    }

    /// `true` when every component is finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Dot product.
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product.
    pub fn cross(self, other: Self) -> Self {
        Self {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Euclidean length.
    pub fn norm(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Arithmetic mean of a set of points. Returns `None` for an empty set.
    pub fn mean<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Option<Self> {
        let mut sum = Self::default();
        let mut n = 0usize;
        for p in points {
            sum = sum + *p;
            n += 1;
        }
        (n > 0).then(|| sum * (1.0 / n as f64))
    }

    /// Bitwise equality on all three components (NaN equals NaN).
    pub fn bits_eq(&self, other: &Self) -> bool {
        self.x.to_bits() == other.x.to_bits()
            && self.y.to_bits() == other.y.to_bits()
            && self.z.to_bits() == other.z.to_bits()
    }

    /// Components as an array.
    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f64; 3]> for Point3 {
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl Add for Point3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Point3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Point3 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}
