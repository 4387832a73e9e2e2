//! Save/load round trips through files and in-memory sinks.

use std::path::PathBuf;
use std::sync::Arc;

use proptest::prelude::*;

use resq_core::{Entity, EntityId, IndexableElement, LengthUnit};
use resq_crs::Crs;
use resq_grid::Extent;
use resq_model::Model;
use resq_property::{LookupTable, PropertyData, PropertyKind, PropertySpec};
use resq_store::{
    compare_models, load, load_eager, load_from, save, save_to, write_model, ByteOrder,
    ChunkWriter, Document, MemorySource,
};
use resq_test_utils::{init_tracing, sample_model};

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("resq-store-{}-{name}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir.join("model")
}

fn assert_equivalent(a: &Model, b: &Model) {
    let report = compare_models(a, b).unwrap();
    assert!(report.is_empty(), "models diverge: {report:#?}");
}

fn to_memory(model: &Model) -> (Vec<u8>, Vec<u8>) {
    let (mut meta, mut chunks) = (Vec::new(), Vec::new());
    save_to(model, &mut meta, &mut chunks).unwrap();
    (meta, chunks)
}

fn from_memory(meta: &[u8], chunks: Vec<u8>) -> Model {
    load_from(meta, Arc::new(MemorySource::from(chunks))).unwrap()
}

// ── File containers ─────────────────────────────────────────────

#[test]
fn file_round_trip_is_lossless() {
    init_tracing();
    let (model, ids) = sample_model();
    let dest = scratch("file-round-trip");
    let summary = save(&model, &dest).unwrap();
    assert_eq!(summary.entities, model.len());
    // Box grid corner points plus five property arrays.
    assert_eq!(summary.chunks, 6);

    let loaded = load(&dest).unwrap();
    assert_equivalent(&model, &loaded);

    let facies = loaded.property(ids.facies).unwrap();
    assert_eq!(facies.lookup().unwrap().label(1), Some("shale"));
    assert_eq!(facies.label_at(2).unwrap(), Some("salt"));
    assert_eq!(facies.label_at(3).unwrap(), None);
    assert_eq!(loaded.object(ids.crs).unwrap().header().citation.originator.as_deref(), Some("fixtures"));
}

#[test]
fn document_names_its_chunk_store() {
    let (model, _) = sample_model();
    let dest = scratch("chunk-name");
    save(&model, &dest).unwrap();
    let meta = std::fs::read(dest.with_file_name("model.json")).unwrap();
    let doc: Document = serde_json::from_slice(&meta).unwrap();
    assert_eq!(doc.chunk_store.as_deref(), Some("model.chunks"));
    assert_eq!(doc.byte_order, ByteOrder::NATIVE.as_str());
    assert!(meta.ends_with(b"\n"));
}

#[test]
fn eager_load_resolves_every_array() {
    let (model, ids) = sample_model();
    let dest = scratch("eager");
    save(&model, &dest).unwrap();
    let loaded = load_eager(&dest).unwrap();
    std::fs::remove_file(dest.with_file_name("model.chunks")).unwrap();
    // Everything is resident, so the missing chunk store goes unnoticed.
    assert!(loaded.property(ids.porosity).unwrap().data().is_loaded());
    assert!(loaded.grid(ids.grid).unwrap().corner_points().is_ok());
    assert_equivalent(&model, &loaded);
}

#[test]
fn lazy_model_saves_over_its_own_container() {
    let (model, ids) = sample_model();
    let dest = scratch("resave-in-place");
    save(&model, &dest).unwrap();

    let lazy = load(&dest).unwrap();
    assert!(!lazy.property(ids.porosity).unwrap().data().is_loaded());
    save(&lazy, &dest).unwrap();

    let reloaded = load(&dest).unwrap();
    assert_equivalent(&model, &reloaded);
    assert!(!dest.with_file_name("model.json.tmp").exists());
    assert!(!dest.with_file_name("model.chunks.tmp").exists());
}

#[test]
fn failed_save_keeps_existing_container() {
    let (model, _) = sample_model();
    let source = scratch("failed-save-source");
    save(&model, &source).unwrap();
    let lazy = load(&source).unwrap();
    std::fs::remove_file(source.with_file_name("model.chunks")).unwrap();

    let dest = scratch("failed-save-dest");
    save(&model, &dest).unwrap();
    let before = std::fs::read(dest.with_file_name("model.json")).unwrap();
    assert!(save(&lazy, &dest).is_err());

    assert_eq!(std::fs::read(dest.with_file_name("model.json")).unwrap(), before);
    assert_equivalent(&model, &load(&dest).unwrap());
    assert!(!dest.with_file_name("model.json.tmp").exists());
    assert!(!dest.with_file_name("model.chunks.tmp").exists());
}

// ── Determinism ─────────────────────────────────────────────────

#[test]
fn resaving_a_loaded_model_is_byte_identical() {
    let (model, _) = sample_model();
    let (meta, chunks) = to_memory(&model);
    let loaded = from_memory(&meta, chunks.clone());
    let (meta2, chunks2) = to_memory(&loaded);
    assert_eq!(String::from_utf8(meta).unwrap(), String::from_utf8(meta2).unwrap());
    assert_eq!(chunks, chunks2);
}

#[test]
fn entities_are_written_referents_first() {
    let (mut model, ids) = sample_model();
    // A CRS added last still precedes the grid re-pointed to it.
    let late = model
        .define_crs(Crs::local(LengthUnit::Foot, LengthUnit::Foot))
        .unwrap();
    model.repoint(ids.topology_grid, ids.crs, late).unwrap();

    let (meta, chunks) = to_memory(&model);
    let doc: Document = serde_json::from_slice(&meta).unwrap();
    let position = |id: EntityId| doc.entities.iter().position(|e| e.id == id.0).unwrap();
    assert!(position(late) < position(ids.topology_grid));
    assert!(position(ids.topology_grid) < position(ids.permeability_i));

    let loaded = from_memory(&meta, chunks);
    assert_equivalent(&model, &loaded);
    assert_eq!(loaded.grid(ids.topology_grid).unwrap().xy_unit(), LengthUnit::Foot);
}

#[test]
fn ids_continue_after_the_highest_loaded_id() {
    let (model, _) = sample_model();
    let (meta, chunks) = to_memory(&model);
    let mut loaded = from_memory(&meta, chunks);
    let next = loaded.define_crs(Crs::local(LengthUnit::Metre, LengthUnit::Metre)).unwrap();
    assert_eq!(next, EntityId(model.len() as u64 + 1));
}

// ── Byte order ──────────────────────────────────────────────────

#[test]
fn foreign_byte_order_is_converted_on_load() {
    let (model, _) = sample_model();
    let foreign = match ByteOrder::NATIVE {
        ByteOrder::Little => ByteOrder::Big,
        ByteOrder::Big => ByteOrder::Little,
    };
    let mut chunks = ChunkWriter::with_byte_order(Vec::new(), foreign).unwrap();
    let mut meta = Vec::new();
    write_model(&model, &mut chunks, &mut meta, None).unwrap();
    let chunks = chunks.into_inner();
    assert_eq!(chunks[5], foreign.tag());

    let loaded = from_memory(&meta, chunks);
    assert_equivalent(&model, &loaded);
}

// ── Properties ──────────────────────────────────────────────────

fn porosity_model(values: Vec<f64>) -> Model {
    let mut model = Model::new();
    let crs = model.define_crs(Crs::local(LengthUnit::Metre, LengthUnit::Metre)).unwrap();
    let grid = model.add_topology_grid(Extent::new(3, 2, 1).unwrap(), crs).unwrap();
    model
        .attach_property(
            grid,
            PropertySpec::new(PropertyKind::Porosity, IndexableElement::Cells),
            PropertyData::continuous(values),
        )
        .unwrap();
    model
}

fn zone_model(codes: Vec<i64>) -> Model {
    let mut model = Model::new();
    let crs = model.define_crs(Crs::local(LengthUnit::Metre, LengthUnit::Metre)).unwrap();
    let grid = model.add_topology_grid(Extent::new(3, 2, 1).unwrap(), crs).unwrap();
    let lookup: LookupTable = [(1, "upper"), (2, "middle"), (3, "lower")].into_iter().collect();
    model
        .attach_property(
            grid,
            PropertySpec::new(PropertyKind::Zone, IndexableElement::Cells)
                .with_lookup(lookup)
                .with_null_value(0),
            PropertyData::discrete(codes),
        )
        .unwrap();
    model
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn continuous_values_survive_bitwise(bits in prop::collection::vec(any::<u64>(), 6)) {
        let values: Vec<f64> = bits.into_iter().map(f64::from_bits).collect();
        let model = porosity_model(values);
        let (meta, chunks) = to_memory(&model);
        let loaded = from_memory(&meta, chunks);
        let report = compare_models(&model, &loaded).unwrap();
        prop_assert!(report.is_empty(), "models diverge: {:?}", report);
    }

    #[test]
    fn discrete_codes_survive(codes in prop::collection::vec(0i64..=3, 6)) {
        let model = zone_model(codes.clone());
        let (meta, chunks) = to_memory(&model);
        let loaded = from_memory(&meta, chunks);
        let report = compare_models(&model, &loaded).unwrap();
        prop_assert!(report.is_empty(), "models diverge: {:?}", report);
        let (_, property) = loaded.properties().next().unwrap();
        prop_assert_eq!(property.discrete_values().unwrap().unwrap(), codes.as_slice());
    }
}
