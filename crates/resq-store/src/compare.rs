//! Entity-by-entity model comparison.
//!
//! Used to verify round trips: two models are equivalent when
//! [`compare_models`] reports nothing. Arrays compare bitwise, so NaN
//! payloads and signed zeros must match exactly.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use resq_core::{ArrayBuffer, EntityId};
use resq_model::Model;

use crate::document::{describe, ArraySlot, EntityRecord};
use crate::error::StoreError;

/// A single difference between two models.
#[derive(Clone, Debug, PartialEq)]
pub struct Divergence {
    /// Entity the difference was found in.
    pub entity: EntityId,
    /// Field, attribute or array name.
    pub attribute: String,
    /// What differs.
    pub kind: DivergenceKind,
}

/// How two entities differ.
#[derive(Clone, Debug, PartialEq)]
pub enum DivergenceKind {
    /// The entity or attribute exists only in the right model.
    MissingLeft,
    /// The entity or attribute exists only in the left model.
    MissingRight,
    /// Metadata values differ, rendered as JSON.
    Metadata {
        /// Left value.
        left: String,
        /// Right value.
        right: String,
    },
    /// Arrays have different scalar types or counts.
    Length {
        /// Left scalar count.
        left: usize,
        /// Right scalar count.
        right: usize,
    },
    /// First scalar that differs.
    Value {
        /// Scalar index.
        index: usize,
        /// Left value.
        left: String,
        /// Right value.
        right: String,
    },
}

/// Compare `left` and `right` entity by entity, in id order.
///
/// Deferred arrays on either side are loaded. Each array contributes at
/// most one divergence.
pub fn compare_models(left: &Model, right: &Model) -> Result<Vec<Divergence>, StoreError> {
    let ids: BTreeSet<EntityId> = left
        .iter()
        .map(|(id, _)| id)
        .chain(right.iter().map(|(id, _)| id))
        .collect();
    let mut out = Vec::new();
    for id in ids {
        match (left.object(id).ok(), right.object(id).ok()) {
            (Some(a), Some(b)) => {
                let a = describe(id, a)?;
                let b = describe(id, b)?;
                compare_records(id, &a.record, &b.record, &mut out);
                compare_arrays(id, &a.arrays, &b.arrays, &mut out)?;
            }
            (Some(_), None) => out.push(Divergence {
                entity: id,
                attribute: "entity".to_string(),
                kind: DivergenceKind::MissingRight,
            }),
            (None, Some(_)) => out.push(Divergence {
                entity: id,
                attribute: "entity".to_string(),
                kind: DivergenceKind::MissingLeft,
            }),
            (None, None) => {}
        }
    }
    Ok(out)
}

fn metadata(id: EntityId, attribute: &str, left: Value, right: Value, out: &mut Vec<Divergence>) {
    if left != right {
        out.push(Divergence {
            entity: id,
            attribute: attribute.to_string(),
            kind: DivergenceKind::Metadata {
                left: left.to_string(),
                right: right.to_string(),
            },
        });
    }
}

fn compare_records(id: EntityId, a: &EntityRecord, b: &EntityRecord, out: &mut Vec<Divergence>) {
    metadata(id, "kind", a.kind.as_str().into(), b.kind.as_str().into(), out);
    metadata(id, "title", a.title.as_str().into(), b.title.as_str().into(), out);
    metadata(id, "originator", a.originator.clone().into(), b.originator.clone().into(), out);
    metadata(
        id,
        "extra_metadata",
        Value::from_iter(a.extra_metadata.clone()),
        Value::from_iter(b.extra_metadata.clone()),
        out,
    );
    metadata(id, "references", a.references.clone().into(), b.references.clone().into(), out);

    let empty = serde_json::Map::new();
    let left = a.attributes.as_object().unwrap_or(&empty);
    let right = b.attributes.as_object().unwrap_or(&empty);
    let keys: BTreeSet<&String> = left.keys().chain(right.keys()).collect();
    for key in keys {
        match (left.get(key), right.get(key)) {
            (Some(l), Some(r)) => metadata(id, key, l.clone(), r.clone(), out),
            (Some(_), None) => out.push(Divergence {
                entity: id,
                attribute: key.clone(),
                kind: DivergenceKind::MissingRight,
            }),
            (None, Some(_)) => out.push(Divergence {
                entity: id,
                attribute: key.clone(),
                kind: DivergenceKind::MissingLeft,
            }),
            (None, None) => {}
        }
    }
}

fn compare_arrays(
    id: EntityId,
    a: &[(&'static str, ArraySlot<'_>)],
    b: &[(&'static str, ArraySlot<'_>)],
    out: &mut Vec<Divergence>,
) -> Result<(), StoreError> {
    let left: BTreeMap<&str, &ArraySlot<'_>> = a.iter().map(|(k, v)| (*k, v)).collect();
    let right: BTreeMap<&str, &ArraySlot<'_>> = b.iter().map(|(k, v)| (*k, v)).collect();
    let names: BTreeSet<&str> = left.keys().chain(right.keys()).copied().collect();
    for name in names {
        let kind = match (left.get(name), right.get(name)) {
            (Some(l), Some(r)) => compare_buffers(&l.buffer()?, &r.buffer()?),
            (Some(_), None) => Some(DivergenceKind::MissingRight),
            (None, Some(_)) => Some(DivergenceKind::MissingLeft),
            (None, None) => None,
        };
        if let Some(kind) = kind {
            out.push(Divergence {
                entity: id,
                attribute: name.to_string(),
                kind,
            });
        }
    }
    Ok(())
}

fn first_difference<T: std::fmt::Debug>(
    a: &[T],
    b: &[T],
    same: impl Fn(&T, &T) -> bool,
) -> Option<DivergenceKind> {
    a.iter()
        .zip(b)
        .position(|(x, y)| !same(x, y))
        .map(|index| DivergenceKind::Value {
            index,
            left: format!("{:?}", a[index]),
            right: format!("{:?}", b[index]),
        })
}

fn compare_buffers(a: &ArrayBuffer, b: &ArrayBuffer) -> Option<DivergenceKind> {
    if a.dtype() != b.dtype() || a.len() != b.len() {
        return Some(DivergenceKind::Length {
            left: a.len(),
            right: b.len(),
        });
    }
    match (a, b) {
        (ArrayBuffer::F64(x), ArrayBuffer::F64(y)) => {
            first_difference(x, y, |l, r| l.to_bits() == r.to_bits())
        }
        (ArrayBuffer::I64(x), ArrayBuffer::I64(y)) => first_difference(x, y, |l, r| l == r),
        _ => None,
    }
}
