//! Conversion of raw coordinates between two CRS frames.
//!
//! A point travels from the source frame to the target frame through a
//! canonical intermediate: parent-frame metres with elevation positive
//! upward. Vertical datum offsets are applied in that intermediate.

use resq_core::{Entity, Point3};

use crate::crs::Crs;
use crate::error::CrsError;

/// Extra information needed to relate frames that differ in datum.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Conversion {
    /// Metres added to elevation when moving from the source vertical
    /// datum to the target vertical datum.
    pub vertical_datum_offset: Option<f64>,
}

impl Conversion {
    /// A conversion carrying a vertical datum offset in metres.
    pub fn with_datum_offset(metres: f64) -> Self {
        Self {
            vertical_datum_offset: Some(metres),
        }
    }
}

/// Convert raw coordinates of `from` into raw coordinates of `to`.
///
/// Fails [`CrsError::IncompatibleCrs`] when the frames carry different
/// projection codes or different vertical datums.
pub fn convert(coords: &[Point3], from: &Crs, to: &Crs) -> Result<Vec<Point3>, CrsError> {
    convert_with(coords, from, to, &Conversion::default())
}

/// [`convert`] with a caller-supplied datum offset.
pub fn convert_with(
    coords: &[Point3],
    from: &Crs,
    to: &Crs,
    conversion: &Conversion,
) -> Result<Vec<Point3>, CrsError> {
    let datum_offset = check_compatible(from, to, conversion)?;
    let from_xy = from.xy_unit().metres_per_unit();
    let from_z = from.z_unit().metres_per_unit();
    let to_xy = to.xy_unit().metres_per_unit();
    let to_z = to.z_unit().metres_per_unit();
    let from_sign = if from.z_increasing_downward() { -1.0 } else { 1.0 };
    let to_sign = if to.z_increasing_downward() { -1.0 } else { 1.0 };

    Ok(coords
        .iter()
        .map(|&p| {
            let g = from.local_to_global(p);
            let elevation = from_sign * g.z * from_z + datum_offset;
            let target = Point3::new(
                g.x * from_xy / to_xy,
                g.y * from_xy / to_xy,
                to_sign * elevation / to_z,
            );
            to.global_to_local(target)
        })
        .collect())
}

fn check_compatible(from: &Crs, to: &Crs, conversion: &Conversion) -> Result<f64, CrsError> {
    let incompatible = |reason: String| CrsError::IncompatibleCrs {
        from: from.id(),
        to: to.id(),
        reason,
    };
    if let (Some(a), Some(b)) = (from.projection_code(), to.projection_code()) {
        if a != b {
            return Err(incompatible(format!(
                "projection codes {a} and {b} differ"
            )));
        }
    }
    let offset = match (from.vertical_datum(), to.vertical_datum()) {
        (Some(a), Some(b)) if a != b => conversion.vertical_datum_offset.ok_or_else(|| {
            incompatible(format!(
                "vertical datums '{a}' and '{b}' differ and no offset was supplied"
            ))
        })?,
        _ => conversion.vertical_datum_offset.unwrap_or(0.0),
    };
    if !offset.is_finite() {
        return Err(CrsError::InvalidParameter {
            name: "vertical datum offset",
            value: offset,
        });
    }
    Ok(offset)
}
