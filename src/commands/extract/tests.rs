use std::fs;
use std::path::{Path, PathBuf};

use super::*;
use crate::cli::{ExportFormat, ExtractArgs};
use crate::commands::inventory;
use crate::docx::fixtures::sample_ahb_docx;
use crate::model::ExtractRunManifest;

use super::run::{extract_document, render_extract_command, resolve_formats};

const SAMPLE_NAME: &str = "TESTAHB-informatorischeLesefassung1.0a_99991231_20240401.docx";

fn extract_args(cache_root: &Path) -> ExtractArgs {
    ExtractArgs {
        cache_root: cache_root.to_path_buf(),
        inventory_manifest_path: None,
        extract_manifest_path: None,
        db_path: None,
        output_dir: None,
        refresh_inventory: false,
        documents: Vec::new(),
        variants: Vec::new(),
        formats: Vec::new(),
    }
}

fn write_sample(dir: &Path) -> PathBuf {
    let path = dir.join(SAMPLE_NAME);
    fs::write(&path, sample_ahb_docx()).expect("write docx");
    path
}

fn sample_source(dir: &Path) -> SourceDocument {
    let path = write_sample(dir);
    SourceDocument {
        entry: inventory::describe_docx(&path).expect("describe"),
        path,
    }
}

fn read_run_manifest(manifest_dir: &Path) -> ExtractRunManifest {
    let path = fs::read_dir(manifest_dir)
        .expect("manifest dir")
        .map(|entry| entry.expect("entry").path())
        .find(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with("extract_run_"))
        })
        .expect("run manifest");
    serde_json::from_slice(&fs::read(path).expect("read")).expect("parse")
}

#[test]
fn formats_default_to_all_and_deduplicate() {
    assert_eq!(resolve_formats(&[]), ExportFormat::ALL.to_vec());
    assert_eq!(
        resolve_formats(&[ExportFormat::Sqlite, ExportFormat::Csv, ExportFormat::Sqlite]),
        vec![ExportFormat::Csv, ExportFormat::Sqlite]
    );
}

#[test]
fn render_extract_command_lists_repeated_flags() {
    let mut args = extract_args(Path::new(".cache/ahbgrid"));
    args.variants = vec!["11016".to_string(), "11017".to_string()];
    args.formats = vec![ExportFormat::Json];
    args.refresh_inventory = true;

    let command = render_extract_command(&args);
    assert!(command.starts_with("ahbgrid extract --cache-root .cache/ahbgrid"));
    assert!(command.contains("--refresh-inventory"));
    assert!(command.contains("--variant 11016 --variant 11017"));
    assert!(command.contains("--format json"));
}

#[test]
fn variant_filter_selects_requested_ids() {
    let dir = tempfile::tempdir().expect("tempdir");
    let extraction = extract_document(&sample_source(dir.path())).expect("extract");
    let group = &extraction.groups[0];

    let everything = VariantFilter::default();
    assert!(everything.is_empty());
    assert_eq!(everything.selected(group), ["55001", "55002"]);

    let only = VariantFilter::new([" 55002 ", ""]);
    assert_eq!(only.selected(group), ["55002"]);
    assert!(only.keeps_group(group));
    assert_eq!(only.key(), "55002");

    assert!(!VariantFilter::new(["99999"]).keeps_group(group));
}

#[test]
fn extract_run_writes_every_export_and_a_run_manifest() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_sample(dir.path());

    run(extract_args(dir.path())).expect("extract run");

    let exports = dir.path().join("exports");
    let variant_csv = fs::read_to_string(exports.join("csv").join("55001.csv")).expect("variant csv");
    let mut lines = variant_csv.lines();
    assert_eq!(
        lines.next(),
        Some("Segment Group,Segment,Data Element,Code/Qualifier,Description,55001,Condition")
    );
    assert!(variant_csv.lines().any(|line| line == "SG2,NAD,3035,MS,Absender,X,"));
    assert!(exports.join("csv").join("55002.csv").exists());

    let grid = fs::read_to_string(exports.join("csv").join("groups").join("TESTAHB_0.csv"))
        .expect("group csv");
    assert!(grid.lines().next().is_some_and(|header| header.ends_with("Condition,Segment ID")));
    assert!(grid.contains("R0001"));

    let json: serde_json::Value = serde_json::from_slice(
        &fs::read(exports.join("json").join("TESTAHB.json")).expect("json export"),
    )
    .expect("parse json");
    assert_eq!(json["topic"], "TESTAHB");
    assert_eq!(json["groups"][0]["variants"][1]["id"], "55002");
    assert_eq!(json["groups"][0]["rows"].as_array().map(Vec::len), Some(6));
    assert_eq!(json["groups"][0]["conditions"]["1"], "Wenn vorhanden");

    let connection = rusqlite::Connection::open(dir.path().join(DB_FILENAME)).expect("db");
    assert_eq!(
        count_rows(&connection, "SELECT COUNT(*) FROM variant_rows").expect("count"),
        12
    );

    let manifest = read_run_manifest(&dir.path().join("manifests"));
    assert_eq!(manifest.status, "completed");
    assert_eq!(manifest.counts.document_count, 1);
    assert_eq!(manifest.counts.group_count, 1);
    assert_eq!(manifest.counts.row_count, 6);
    assert_eq!(manifest.counts.variant_count, 2);
    assert_eq!(manifest.counts.csv_files_written, 3);
    assert_eq!(manifest.counts.json_files_written, 1);
    assert_eq!(manifest.counts.db_rows_inserted, 12);
    assert_eq!(manifest.source_hashes[0].topic, "TESTAHB");
    assert!(dir.path().join("manifests").join("docx_inventory.json").exists());
}

#[test]
fn explicit_documents_honour_the_variant_filter() {
    let dir = tempfile::tempdir().expect("tempdir");
    let source = write_sample(dir.path());
    let cache_root = dir.path().join("cache");

    let mut args = extract_args(&cache_root);
    args.documents = vec![source];
    args.variants = vec!["55002".to_string()];
    args.formats = vec![ExportFormat::Csv];
    run(args).expect("extract run");

    let csv_dir = cache_root.join("exports").join("csv");
    assert!(csv_dir.join("55002.csv").exists());
    assert!(!csv_dir.join("55001.csv").exists());
    assert!(!cache_root.join(DB_FILENAME).exists());
    assert!(!cache_root.join("manifests").join("docx_inventory.json").exists());

    let manifest = read_run_manifest(&cache_root.join("manifests"));
    assert_eq!(manifest.variant_filter, ["55002"]);
    assert_eq!(manifest.paths.inventory_manifest_path, None);
    assert_eq!(manifest.counts.csv_files_written, 2);
}

#[test]
fn repeated_variant_ids_get_numbered_csv_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let source = sample_source(dir.path());
    let extraction = extract_document(&source).expect("extract");
    let group = &extraction.groups[0];

    let output_dir = dir.path().join("out");
    let mut exporter = CsvExporter::new(&output_dir).expect("exporter");
    let filter = VariantFilter::default();
    exporter.write_group(&source, 0, group, &filter).expect("first");
    exporter.write_group(&source, 1, group, &filter).expect("second");

    assert_eq!(exporter.files_written(), 6);
    assert!(output_dir.join("csv").join("55001_2.csv").exists());
    assert!(output_dir.join("csv").join("groups").join("TESTAHB_1.csv").exists());
}

#[test]
fn store_skips_unchanged_documents() {
    let dir = tempfile::tempdir().expect("tempdir");
    let source = sample_source(dir.path());
    let groups = extract_document(&source).expect("extract").groups;
    let mut connection = open_store(&dir.path().join(DB_FILENAME)).expect("store");

    let everything = VariantFilter::default();
    assert_eq!(
        store_document(&mut connection, &source, &groups, &everything).expect("first"),
        StoreOutcome::Stored { rows_inserted: 12 }
    );
    assert_eq!(
        store_document(&mut connection, &source, &groups, &everything).expect("second"),
        StoreOutcome::Unchanged
    );

    let only = VariantFilter::new(["55001"]);
    assert_eq!(
        store_document(&mut connection, &source, &groups, &only).expect("filtered"),
        StoreOutcome::Stored { rows_inserted: 6 }
    );
    assert_eq!(
        count_rows(&connection, "SELECT COUNT(*) FROM variant_rows").expect("count"),
        6
    );
    assert_eq!(
        count_rows(&connection, "SELECT COUNT(*) FROM variants").expect("count"),
        1
    );
}
