//! The property entity and its attach-time validation.

use resq_core::{
    Entity, EntityHeader, EntityId, EntityKind, IndexableElement, LazyArray, Point3,
    PropertyUnit, References,
};
use resq_grid::Grid;

use crate::error::PropertyError;
use crate::kind::{DataType, Facet, PropertyKind};
use crate::lookup::LookupTable;

/// Descriptive part of a property: everything but the values.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertySpec {
    /// Semantic kind.
    pub kind: PropertyKind,
    /// Optional direction or phase qualifier.
    pub facet: Option<Facet>,
    /// Grid elements the values are indexed by.
    pub domain: IndexableElement,
    /// Time step the values belong to, if time-dependent.
    pub time_index: Option<u32>,
    /// Realization number, for stochastic models.
    pub realization: Option<u32>,
    /// Unit of measure.
    pub unit: Option<PropertyUnit>,
    /// Code marking an undefined discrete value.
    pub null_value: Option<i64>,
    /// Code labels; required for discrete kinds.
    pub lookup: Option<LookupTable>,
    /// Citation title; defaults to the kind name. Moved into the entity
    /// header on attach.
    pub title: Option<String>,
}

impl PropertySpec {
    /// A spec with only kind and domain set.
    pub fn new(kind: PropertyKind, domain: IndexableElement) -> Self {
        Self {
            kind,
            facet: None,
            domain,
            time_index: None,
            realization: None,
            unit: None,
            null_value: None,
            lookup: None,
            title: None,
        }
    }

    /// Set the facet.
    pub fn with_facet(mut self, facet: Facet) -> Self {
        self.facet = Some(facet);
        self
    }

    /// Set the time index.
    pub fn with_time_index(mut self, time_index: u32) -> Self {
        self.time_index = Some(time_index);
        self
    }

    /// Set the realization.
    pub fn with_realization(mut self, realization: u32) -> Self {
        self.realization = Some(realization);
        self
    }

    /// Set the unit.
    pub fn with_unit(mut self, unit: PropertyUnit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Set the discrete null value.
    pub fn with_null_value(mut self, null_value: i64) -> Self {
        self.null_value = Some(null_value);
        self
    }

    /// Set the lookup table.
    pub fn with_lookup(mut self, lookup: LookupTable) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// Set the citation title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Values of a property, one per domain element.
#[derive(Clone, Debug)]
pub enum PropertyData {
    /// Floating-point values; NaN marks undefined.
    Continuous(LazyArray<f64>),
    /// Integer codes.
    Discrete(LazyArray<i64>),
    /// Points; [`Point3::UNDEFINED`] marks undefined.
    Points(LazyArray<Point3>),
}

impl PropertyData {
    /// Resident continuous data.
    pub fn continuous(values: Vec<f64>) -> Self {
        Self::Continuous(LazyArray::from_vec(values))
    }

    /// Resident discrete data.
    pub fn discrete(values: Vec<i64>) -> Self {
        Self::Discrete(LazyArray::from_vec(values))
    }

    /// Resident point data.
    pub fn points(values: Vec<Point3>) -> Self {
        Self::Points(LazyArray::from_vec(values))
    }

    /// Storage class.
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Continuous(_) => DataType::Continuous,
            Self::Discrete(_) => DataType::Discrete,
            Self::Points(_) => DataType::Points,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            Self::Continuous(a) => a.len(),
            Self::Discrete(a) => a.len(),
            Self::Points(a) => a.len(),
        }
    }

    /// `true` when there are no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` once values are resident.
    pub fn is_loaded(&self) -> bool {
        match self {
            Self::Continuous(a) => a.is_loaded(),
            Self::Discrete(a) => a.is_loaded(),
            Self::Points(a) => a.is_loaded(),
        }
    }
}

/// Value range of a property.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ValueRange {
    /// Finite continuous range.
    Continuous {
        /// Smallest finite value.
        min: f64,
        /// Largest finite value.
        max: f64,
    },
    /// Non-null code range.
    Discrete {
        /// Smallest code.
        min: i64,
        /// Largest code.
        max: i64,
    },
}

/// Summary statistics computed at attach time and persisted with the
/// metadata, so they are available without loading values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Statistics {
    /// Elements with a defined value.
    pub defined: usize,
    /// Range of defined values; `None` for points or when nothing is defined.
    pub range: Option<ValueRange>,
}

impl Statistics {
    fn of_continuous(values: &[f64]) -> Self {
        let mut defined = 0;
        let mut range: Option<(f64, f64)> = None;
        for &v in values.iter().filter(|v| v.is_finite()) {
            defined += 1;
            range = Some(match range {
                None => (v, v),
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
            });
        }
        Self {
            defined,
            range: range.map(|(min, max)| ValueRange::Continuous { min, max }),
        }
    }

    fn of_discrete(values: &[i64], null_value: Option<i64>) -> Self {
        let mut defined = 0;
        let mut range: Option<(i64, i64)> = None;
        for &v in values.iter().filter(|&&v| Some(v) != null_value) {
            defined += 1;
            range = Some(match range {
                None => (v, v),
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
            });
        }
        Self {
            defined,
            range: range.map(|(min, max)| ValueRange::Discrete { min, max }),
        }
    }

    fn of_points(values: &[Point3]) -> Self {
        Self {
            defined: values.iter().filter(|p| p.is_defined()).count(),
            range: None,
        }
    }
}

/// A value array attached to one grid over one indexable domain.
///
/// Immutable once attached; only the citation may change.
#[derive(Clone, Debug)]
pub struct Property {
    header: EntityHeader,
    grid: EntityId,
    spec: PropertySpec,
    data: PropertyData,
    statistics: Statistics,
}

impl Property {
    /// Validate resident `data` against `grid` and `spec` and build the
    /// property.
    ///
    /// Checks, in order: the grid is registered, the data type matches the
    /// kind, lookup and null value only accompany discrete data, one value
    /// per domain element, then (for discrete data) every non-null code has
    /// a label.
    pub fn attach(grid: &Grid, spec: PropertySpec, data: PropertyData) -> Result<Self, PropertyError> {
        let grid_id = check_structure(grid, &spec, &data)?;
        let statistics = match &data {
            PropertyData::Continuous(a) => Statistics::of_continuous(a.get()?),
            PropertyData::Discrete(a) => {
                let values = a.get()?;
                check_codes(&spec, values)?;
                Statistics::of_discrete(values, spec.null_value)
            }
            PropertyData::Points(a) => Statistics::of_points(a.get()?),
        };
        tracing::debug!(
            grid = grid_id.0,
            kind = %spec.kind,
            domain = %spec.domain,
            len = data.len(),
            "property attached"
        );
        Ok(Self::assemble(grid_id, spec, data, statistics))
    }

    /// Rebuild a property around possibly deferred `data` with persisted
    /// statistics. Structure is validated; individual codes are not, since
    /// that would force a load.
    pub fn restore(
        grid: &Grid,
        spec: PropertySpec,
        data: PropertyData,
        statistics: Statistics,
    ) -> Result<Self, PropertyError> {
        let grid_id = check_structure(grid, &spec, &data)?;
        Ok(Self::assemble(grid_id, spec, data, statistics))
    }

    fn assemble(
        grid: EntityId,
        mut spec: PropertySpec,
        data: PropertyData,
        statistics: Statistics,
    ) -> Self {
        // The title lives in the header from here on.
        let title = spec
            .title
            .take()
            .unwrap_or_else(|| spec.kind.as_str().to_string());
        Self {
            header: EntityHeader::new(title),
            grid,
            spec,
            data,
            statistics,
        }
    }

    /// The grid this property is attached to.
    pub fn grid(&self) -> EntityId {
        self.grid
    }

    /// Descriptive metadata.
    pub fn spec(&self) -> &PropertySpec {
        &self.spec
    }

    /// Semantic kind.
    pub fn property_kind(&self) -> PropertyKind {
        self.spec.kind
    }

    /// Indexable domain.
    pub fn domain(&self) -> IndexableElement {
        self.spec.domain
    }

    /// Lookup table, for discrete properties.
    pub fn lookup(&self) -> Option<&LookupTable> {
        self.spec.lookup.as_ref()
    }

    /// Storage class.
    pub fn data_type(&self) -> DataType {
        self.data.data_type()
    }

    /// The value array.
    pub fn data(&self) -> &PropertyData {
        &self.data
    }

    /// Statistics computed when the values were attached.
    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// Continuous values, loading them if deferred. `None` for other types.
    pub fn continuous_values(&self) -> Result<Option<&[f64]>, PropertyError> {
        match &self.data {
            PropertyData::Continuous(a) => Ok(Some(a.get()?)),
            _ => Ok(None),
        }
    }

    /// Discrete codes, loading them if deferred. `None` for other types.
    pub fn discrete_values(&self) -> Result<Option<&[i64]>, PropertyError> {
        match &self.data {
            PropertyData::Discrete(a) => Ok(Some(a.get()?)),
            _ => Ok(None),
        }
    }

    /// Point values, loading them if deferred. `None` for other types.
    pub fn point_values(&self) -> Result<Option<&[Point3]>, PropertyError> {
        match &self.data {
            PropertyData::Points(a) => Ok(Some(a.get()?)),
            _ => Ok(None),
        }
    }

    /// Label of the discrete value at `index`; `None` for null values.
    pub fn label_at(&self, index: usize) -> Result<Option<&str>, PropertyError> {
        let Some(values) = self.discrete_values()? else {
            return Ok(None);
        };
        let Some(&code) = values.get(index) else {
            return Ok(None);
        };
        if Some(code) == self.spec.null_value {
            return Ok(None);
        }
        Ok(self.lookup().and_then(|t| t.label(code)))
    }
}

impl Entity for Property {
    fn header(&self) -> &EntityHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut EntityHeader {
        &mut self.header
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Property
    }

    fn references(&self) -> References {
        References::from_slice(&[self.grid])
    }

    fn retarget(&mut self, old: EntityId, new: EntityId) -> bool {
        if self.grid == old {
            self.grid = new;
            true
        } else {
            false
        }
    }
}

fn check_structure(grid: &Grid, spec: &PropertySpec, data: &PropertyData) -> Result<EntityId, PropertyError> {
    let grid_id = grid.id().ok_or(PropertyError::UnregisteredGrid)?;
    let found = data.data_type();
    if found != spec.kind.natural_data_type() {
        return Err(PropertyError::KindMismatch {
            kind: spec.kind,
            found,
        });
    }
    if found == DataType::Discrete {
        if spec.lookup.as_ref().is_none_or(LookupTable::is_empty) {
            return Err(PropertyError::MissingLookupTable);
        }
    } else if spec.lookup.is_some() {
        return Err(PropertyError::InvalidSpec {
            reason: "lookup table on non-discrete data",
        });
    } else if spec.null_value.is_some() {
        return Err(PropertyError::InvalidSpec {
            reason: "null value on non-discrete data",
        });
    }
    let expected = grid.extent().element_count(spec.domain);
    if data.len() != expected {
        return Err(PropertyError::ArrayShapeMismatch {
            domain: spec.domain,
            expected,
            found: data.len(),
        });
    }
    Ok(grid_id)
}

fn check_codes(spec: &PropertySpec, values: &[i64]) -> Result<(), PropertyError> {
    let Some(lookup) = &spec.lookup else {
        return Err(PropertyError::MissingLookupTable);
    };
    match values
        .iter()
        .enumerate()
        .find(|&(_, &v)| Some(v) != spec.null_value && !lookup.contains(v))
    {
        Some((index, &code)) => Err(PropertyError::CodeNotInLookup { code, index }),
        None => Ok(()),
    }
}
