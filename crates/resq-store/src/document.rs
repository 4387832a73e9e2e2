//! The JSON metadata document.
//!
//! One [`EntityRecord`] per entity, in dependency order, each carrying its
//! citation, references, kind-specific attributes and the chunk addresses
//! of its arrays. Enum values are written by their symbolic names and
//! parsed back strictly; an unknown name is container corruption.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use resq_core::{
    AngleUnit, ArrayBuffer, ArrayElement, ChunkError, ChunkKey, ChunkLoader, Citation, Dtype,
    Entity, EntityHeader, EntityId, EntityKind, IndexableElement, LazyArray, LengthUnit, Point3,
    PropertyUnit,
};
use resq_crs::{Crs, CrsKind};
use resq_grid::{Extent, GeometryStatus, GeometrySummary, Grid, KDirection};
use resq_model::{Model, ModelObject};
use resq_property::{
    DataType, Facet, LookupTable, Property, PropertyData, PropertyKind, PropertySpec, Statistics,
    ValueRange,
};

use crate::error::StoreError;

/// Value of the document's `format` field.
pub const FORMAT_NAME: &str = "resq";

/// Current metadata schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Array attribute holding a grid's corner points.
pub const CORNER_POINTS: &str = "corner_points";

/// Array attribute holding a property's values.
pub const VALUES: &str = "values";

/// Top-level metadata document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Always [`FORMAT_NAME`].
    pub format: String,
    /// Schema version the document was written with.
    pub schema_version: u32,
    /// Byte order of the chunk store.
    pub byte_order: String,
    /// File name of the chunk store, relative to the document. Absent when
    /// the store was written to an anonymous stream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_store: Option<String>,
    /// Entities in dependency order.
    pub entities: Vec<EntityRecord>,
}

/// One entity in the document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Entity id.
    pub id: u64,
    /// Entity kind name.
    pub kind: String,
    /// Citation title.
    pub title: String,
    /// Citation originator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub originator: Option<String>,
    /// Free-form annotations.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_metadata: BTreeMap<String, String>,
    /// Ids of referenced entities.
    #[serde(default)]
    pub references: Vec<u64>,
    /// Kind-specific attributes.
    pub attributes: serde_json::Value,
    /// Chunk addresses of the entity's arrays.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arrays: Vec<ArrayRecord>,
}

/// Address of one array of an entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArrayRecord {
    /// Attribute name.
    pub attribute: String,
    /// Where the bytes are.
    pub chunk: ChunkRef,
}

/// Location and fingerprint of a chunk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRef {
    /// Byte offset from the start of the chunk store.
    pub offset: u64,
    /// Byte length.
    pub length: u64,
    /// Scalar type name (`"f64"`, `"i64"`).
    pub dtype: String,
    /// Scalar count.
    pub count: u64,
    /// FNV-1a 64 of the bytes.
    pub checksum: u64,
}

// ── Attribute blocks ────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct CrsAttributes {
    crs_kind: String,
    xy_unit: String,
    z_unit: String,
    origin: [f64; 3],
    rotation_degrees: f64,
    rotation_unit: String,
    z_increasing_downward: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    projection_code: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    vertical_datum: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GridAttributes {
    ni: usize,
    nj: usize,
    nk: usize,
    xy_unit: String,
    z_unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    geometry: Option<GeometryAttributes>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeometryAttributes {
    status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    k_direction: Option<String>,
    defined_cells: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct PropertyAttributes {
    property_kind: String,
    data_type: String,
    domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    facet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    time_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    realization: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    null_value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lookup: Option<Vec<LookupEntry>>,
    statistics: StatisticsAttributes,
}

#[derive(Debug, Serialize, Deserialize)]
struct LookupEntry {
    code: i64,
    label: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct StatisticsAttributes {
    defined: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    range: Option<RangeAttributes>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum RangeAttributes {
    Continuous { min: f64, max: f64 },
    Discrete { min: i64, max: i64 },
}

// ── Model to document ───────────────────────────────────────────

/// Borrowed view of one entity array.
#[derive(Clone, Copy)]
pub(crate) enum ArraySlot<'a> {
    F64(&'a LazyArray<f64>),
    I64(&'a LazyArray<i64>),
    Points(&'a LazyArray<Point3>),
}

impl ArraySlot<'_> {
    /// Scalar payload, loading deferred values.
    pub(crate) fn buffer(&self) -> Result<ArrayBuffer, ChunkError> {
        Ok(match self {
            Self::F64(a) => f64::to_buffer(a.get()?),
            Self::I64(a) => i64::to_buffer(a.get()?),
            Self::Points(a) => Point3::to_buffer(a.get()?),
        })
    }

    pub(crate) fn prefetch(&self) -> Result<(), ChunkError> {
        match self {
            Self::F64(a) => a.prefetch(),
            Self::I64(a) => a.prefetch(),
            Self::Points(a) => a.prefetch(),
        }
    }
}

/// An entity record without chunk addresses, plus its arrays.
pub(crate) struct Described<'a> {
    pub record: EntityRecord,
    pub arrays: Vec<(&'static str, ArraySlot<'a>)>,
}

fn encode_attributes<T: Serialize>(id: EntityId, value: &T) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(value).map_err(|e| StoreError::Encode {
        detail: format!("entity {id}: {e}"),
    })
}

/// Describe `object` for the document.
pub(crate) fn describe(id: EntityId, object: &ModelObject) -> Result<Described<'_>, StoreError> {
    let header = object.header();
    let mut arrays = Vec::new();
    let attributes = match object {
        ModelObject::Crs(crs) => encode_attributes(id, &crs_attributes(crs))?,
        ModelObject::Grid(grid) => {
            if let Some(points) = grid.corner_point_array() {
                arrays.push((CORNER_POINTS, ArraySlot::Points(points)));
            }
            encode_attributes(id, &grid_attributes(grid))?
        }
        ModelObject::Property(property) => {
            arrays.push((
                VALUES,
                match property.data() {
                    PropertyData::Continuous(a) => ArraySlot::F64(a),
                    PropertyData::Discrete(a) => ArraySlot::I64(a),
                    PropertyData::Points(a) => ArraySlot::Points(a),
                },
            ));
            encode_attributes(id, &property_attributes(property))?
        }
    };
    Ok(Described {
        record: EntityRecord {
            id: id.get(),
            kind: object.kind().as_str().to_string(),
            title: header.citation.title.clone(),
            originator: header.citation.originator.clone(),
            extra_metadata: header.extra_metadata.clone(),
            references: object.references().iter().map(|r| r.get()).collect(),
            attributes,
            arrays: Vec::new(),
        },
        arrays,
    })
}

fn crs_attributes(crs: &Crs) -> CrsAttributes {
    CrsAttributes {
        crs_kind: crs.kind().as_str().to_string(),
        xy_unit: crs.xy_unit().symbol().to_string(),
        z_unit: crs.z_unit().symbol().to_string(),
        origin: crs.origin().to_array(),
        rotation_degrees: crs.rotation_degrees(),
        rotation_unit: crs.rotation_unit().symbol().to_string(),
        z_increasing_downward: crs.z_increasing_downward(),
        projection_code: crs.projection_code(),
        vertical_datum: crs.vertical_datum().map(str::to_string),
    }
}

fn grid_attributes(grid: &Grid) -> GridAttributes {
    let (ni, nj, nk) = grid.extent().dims();
    GridAttributes {
        ni,
        nj,
        nk,
        xy_unit: grid.xy_unit().symbol().to_string(),
        z_unit: grid.z_unit().symbol().to_string(),
        geometry: grid.geometry_summary().map(|s| GeometryAttributes {
            status: s.status.as_str().to_string(),
            k_direction: s.k_direction.map(|d| d.as_str().to_string()),
            defined_cells: s.defined_cells,
        }),
    }
}

fn property_attributes(property: &Property) -> PropertyAttributes {
    let spec = property.spec();
    let stats = property.statistics();
    PropertyAttributes {
        property_kind: spec.kind.as_str().to_string(),
        data_type: property.data_type().as_str().to_string(),
        domain: spec.domain.as_str().to_string(),
        facet: spec.facet.map(|f| f.as_str().to_string()),
        time_index: spec.time_index,
        realization: spec.realization,
        unit: spec.unit.map(|u| u.symbol().to_string()),
        null_value: spec.null_value,
        lookup: spec.lookup.as_ref().map(|t| {
            t.iter()
                .map(|(code, label)| LookupEntry {
                    code,
                    label: label.to_string(),
                })
                .collect()
        }),
        statistics: StatisticsAttributes {
            defined: stats.defined,
            range: stats.range.map(|r| match r {
                ValueRange::Continuous { min, max } => RangeAttributes::Continuous { min, max },
                ValueRange::Discrete { min, max } => RangeAttributes::Discrete { min, max },
            }),
        },
    }
}

// ── Document to model ───────────────────────────────────────────

/// Resolved address of a chunk, validated against the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ChunkSpan {
    pub offset: u64,
    pub length: u64,
    pub dtype: Dtype,
    pub count: u64,
    pub checksum: u64,
}

impl ChunkSpan {
    /// Validate `chunk` as an address inside a store of `store_len` bytes.
    pub(crate) fn resolve(key: &ChunkKey, chunk: &ChunkRef, store_len: u64) -> Result<Self, StoreError> {
        let corrupt = |detail: String| StoreError::corrupt_at(key.entity, key.attribute.clone(), detail);
        let dtype = chunk.dtype.parse::<Dtype>().map_err(corrupt)?;
        if chunk.count.checked_mul(dtype.size() as u64) != Some(chunk.length) {
            return Err(corrupt(format!(
                "{} bytes cannot hold {} {dtype} scalars",
                chunk.length, chunk.count
            )));
        }
        if chunk.offset < crate::codec::HEADER_LEN || chunk.offset % crate::codec::ALIGNMENT != 0 {
            return Err(corrupt(format!("misaligned chunk offset {}", chunk.offset)));
        }
        match chunk.offset.checked_add(chunk.length) {
            Some(end) if end <= store_len => {}
            _ => {
                return Err(corrupt(format!(
                    "chunk [{}, +{}) lies outside the {store_len}-byte store",
                    chunk.offset, chunk.length
                )))
            }
        }
        Ok(Self {
            offset: chunk.offset,
            length: chunk.length,
            dtype,
            count: chunk.count,
            checksum: chunk.checksum,
        })
    }
}

fn parse<T: FromStr>(id: EntityId, attribute: &str, value: &str) -> Result<T, StoreError>
where
    T::Err: std::fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|e| StoreError::corrupt_at(id, attribute, e.to_string()))
}

fn decode_attributes<T: DeserializeOwned>(record: &EntityRecord, id: EntityId) -> Result<T, StoreError> {
    serde_json::from_value(record.attributes.clone())
        .map_err(|e| StoreError::corrupt_at(id, "attributes", e.to_string()))
}

/// Rebuild the entity in `record`, with arrays deferred to `loader`.
///
/// The entities it references must already be in `model`.
pub(crate) fn restore(
    record: &EntityRecord,
    model: &Model,
    index: &BTreeMap<ChunkKey, ChunkSpan>,
    loader: &Arc<dyn ChunkLoader>,
) -> Result<ModelObject, StoreError> {
    let id = EntityId(record.id);
    let kind: EntityKind = parse(id, "kind", &record.kind)?;
    let references: Vec<EntityId> = record.references.iter().copied().map(EntityId).collect();
    let expected_refs = match kind {
        EntityKind::Crs => 0,
        EntityKind::Grid | EntityKind::Property => 1,
    };
    if references.len() != expected_refs {
        return Err(StoreError::corrupt_at(
            id,
            "references",
            format!("a {kind} has {expected_refs} references, found {}", references.len()),
        ));
    }
    for array in &record.arrays {
        let allowed = match kind {
            EntityKind::Crs => false,
            EntityKind::Grid => array.attribute == CORNER_POINTS,
            EntityKind::Property => array.attribute == VALUES,
        };
        if !allowed {
            return Err(StoreError::corrupt_at(
                id,
                array.attribute.clone(),
                format!("unexpected array on a {kind}"),
            ));
        }
    }

    let mut object = match kind {
        EntityKind::Crs => ModelObject::Crs(restore_crs(id, decode_attributes(record, id)?)?),
        EntityKind::Grid => {
            let crs = model
                .crs(references[0])
                .map_err(|e| StoreError::corrupt_at(id, "references", e.to_string()))?;
            let attrs: GridAttributes = decode_attributes(record, id)?;
            ModelObject::Grid(restore_grid(id, attrs, crs, index, loader)?)
        }
        EntityKind::Property => {
            let grid = model
                .grid(references[0])
                .map_err(|e| StoreError::corrupt_at(id, "references", e.to_string()))?;
            let attrs: PropertyAttributes = decode_attributes(record, id)?;
            ModelObject::Property(restore_property(id, attrs, grid, index, loader)?)
        }
    };

    let mut header = EntityHeader::with_id(
        id,
        Citation {
            title: record.title.clone(),
            originator: record.originator.clone(),
        },
    );
    header.extra_metadata = record.extra_metadata.clone();
    *object.header_mut() = header;
    Ok(object)
}

fn restore_crs(id: EntityId, attrs: CrsAttributes) -> Result<Crs, StoreError> {
    let kind: CrsKind = parse(id, "crs_kind", &attrs.crs_kind)?;
    let xy: LengthUnit = parse(id, "xy_unit", &attrs.xy_unit)?;
    let z: LengthUnit = parse(id, "z_unit", &attrs.z_unit)?;
    let rotation_unit: AngleUnit = parse(id, "rotation_unit", &attrs.rotation_unit)?;
    let invalid = |e: resq_crs::CrsError| StoreError::corrupt_at(id, "attributes", e.to_string());
    let mut crs = Crs::new(kind, xy, z)
        .with_origin(Point3::from(attrs.origin))
        .map_err(invalid)?
        .with_rotation(attrs.rotation_degrees, AngleUnit::Degree)
        .map_err(invalid)?
        .with_rotation_unit(rotation_unit)
        .with_z_increasing_downward(attrs.z_increasing_downward);
    if let Some(code) = attrs.projection_code {
        crs = crs.with_projection_code(code);
    }
    if let Some(datum) = attrs.vertical_datum {
        crs = crs.with_vertical_datum(datum);
    }
    Ok(crs)
}

fn deferred<T: ArrayElement>(
    id: EntityId,
    attribute: &str,
    len: usize,
    index: &BTreeMap<ChunkKey, ChunkSpan>,
    loader: &Arc<dyn ChunkLoader>,
) -> Result<LazyArray<T>, StoreError> {
    let key = ChunkKey::new(id, attribute);
    let span = index
        .get(&key)
        .ok_or_else(|| StoreError::corrupt_at(id, attribute, "array has no chunk"))?;
    if span.dtype != T::DTYPE {
        return Err(StoreError::corrupt_at(
            id,
            attribute,
            format!("chunk holds {}, expected {}", span.dtype, T::DTYPE),
        ));
    }
    if Some(span.count) != (len as u64).checked_mul(T::WIDTH as u64) {
        return Err(StoreError::corrupt_at(
            id,
            attribute,
            format!("chunk holds {} scalars, expected {len} elements", span.count),
        ));
    }
    Ok(LazyArray::deferred(len, key, Arc::clone(loader)))
}

fn restore_grid(
    id: EntityId,
    attrs: GridAttributes,
    crs: &Crs,
    index: &BTreeMap<ChunkKey, ChunkSpan>,
    loader: &Arc<dyn ChunkLoader>,
) -> Result<Grid, StoreError> {
    let invalid = |e: resq_grid::GridError| StoreError::corrupt_at(id, "attributes", e.to_string());
    let extent = Extent::new(attrs.ni, attrs.nj, attrs.nk).map_err(invalid)?;
    let xy: LengthUnit = parse(id, "xy_unit", &attrs.xy_unit)?;
    let z: LengthUnit = parse(id, "z_unit", &attrs.z_unit)?;
    if (xy, z) != (crs.xy_unit(), crs.z_unit()) {
        return Err(StoreError::corrupt_at(
            id,
            "xy_unit",
            format!(
                "grid units {xy}/{z} disagree with its crs ({}/{})",
                crs.xy_unit(),
                crs.z_unit()
            ),
        ));
    }
    let grid = Grid::topology_only(extent, crs).map_err(invalid)?;
    let Some(geometry) = attrs.geometry else {
        if index.contains_key(&ChunkKey::new(id, CORNER_POINTS)) {
            return Err(StoreError::corrupt_at(id, CORNER_POINTS, "corner points on a grid without geometry"));
        }
        return Ok(grid);
    };
    let status: GeometryStatus = parse(id, "status", &geometry.status)?;
    if status == GeometryStatus::Absent {
        return Err(StoreError::corrupt_at(id, "status", "geometry block with absent status"));
    }
    let k_direction = geometry
        .k_direction
        .as_deref()
        .map(|d| parse::<KDirection>(id, "k_direction", d))
        .transpose()?;
    let summary = GeometrySummary {
        status,
        k_direction,
        defined_cells: geometry.defined_cells,
    };
    let points = deferred(id, CORNER_POINTS, extent.corner_point_count(), index, loader)?;
    grid.with_deferred_geometry(points, summary).map_err(invalid)
}

fn restore_property(
    id: EntityId,
    attrs: PropertyAttributes,
    grid: &Grid,
    index: &BTreeMap<ChunkKey, ChunkSpan>,
    loader: &Arc<dyn ChunkLoader>,
) -> Result<Property, StoreError> {
    let kind: PropertyKind = parse(id, "property_kind", &attrs.property_kind)?;
    let data_type: DataType = parse(id, "data_type", &attrs.data_type)?;
    let domain: IndexableElement = parse(id, "domain", &attrs.domain)?;
    let mut spec = PropertySpec::new(kind, domain);
    spec.facet = attrs
        .facet
        .as_deref()
        .map(|f| parse::<Facet>(id, "facet", f))
        .transpose()?;
    spec.time_index = attrs.time_index;
    spec.realization = attrs.realization;
    spec.unit = attrs
        .unit
        .as_deref()
        .map(|u| parse::<PropertyUnit>(id, "unit", u))
        .transpose()?;
    spec.null_value = attrs.null_value;
    spec.lookup = attrs.lookup.map(|entries| {
        entries
            .into_iter()
            .map(|e| (e.code, e.label))
            .collect::<LookupTable>()
    });

    let len = grid.extent().element_count(domain);
    let data = match data_type {
        DataType::Continuous => PropertyData::Continuous(deferred(id, VALUES, len, index, loader)?),
        DataType::Discrete => PropertyData::Discrete(deferred(id, VALUES, len, index, loader)?),
        DataType::Points => PropertyData::Points(deferred(id, VALUES, len, index, loader)?),
    };
    let statistics = Statistics {
        defined: attrs.statistics.defined,
        range: attrs.statistics.range.map(|r| match r {
            RangeAttributes::Continuous { min, max } => ValueRange::Continuous { min, max },
            RangeAttributes::Discrete { min, max } => ValueRange::Discrete { min, max },
        }),
    };
    Property::restore(grid, spec, data, statistics)
        .map_err(|e| StoreError::corrupt_at(id, "attributes", e.to_string()))
}
