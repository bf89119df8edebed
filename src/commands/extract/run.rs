use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use tracing::{debug, info, warn};

use super::*;
use crate::ahb::{Extraction, extract_groups};
use crate::cli::{ExportFormat, ExtractArgs};
use crate::commands::inventory::{self, INVENTORY_FILENAME};
use crate::docx::load_document;
use crate::model::{DocxInventoryManifest, ExtractCounts, ExtractPaths, ExtractRunManifest};
use crate::util::{ensure_directory, now_utc_string, utc_compact_string, write_json_pretty};

pub fn run(args: ExtractArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("run-{}", utc_compact_string(started_ts));

    let cache_root = args.cache_root.clone();
    let manifest_dir = cache_root.join("manifests");
    ensure_directory(&manifest_dir)?;

    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| cache_root.join("exports"));
    let extract_manifest_path = args.extract_manifest_path.clone().unwrap_or_else(|| {
        manifest_dir.join(format!(
            "extract_run_{}.json",
            utc_compact_string(started_ts)
        ))
    });
    let formats = resolve_formats(&args.formats);
    let db_path = formats.contains(&ExportFormat::Sqlite).then(|| {
        args.db_path
            .clone()
            .unwrap_or_else(|| cache_root.join(DB_FILENAME))
    });
    let filter = VariantFilter::new(&args.variants);

    info!(
        cache_root = %cache_root.display(),
        run_id = %run_id,
        formats = %render_formats(&formats),
        "starting extract"
    );

    let (sources, inventory_manifest_path) = if args.documents.is_empty() {
        let path = args
            .inventory_manifest_path
            .clone()
            .unwrap_or_else(|| manifest_dir.join(INVENTORY_FILENAME));
        let inventory = load_or_refresh_inventory(&cache_root, &path, args.refresh_inventory)?;
        (sources_from_inventory(&inventory), Some(path))
    } else {
        (explicit_sources(&args.documents)?, None)
    };

    if sources.is_empty() {
        bail!("no documents to extract");
    }

    let mut csv_exporter = if formats.contains(&ExportFormat::Csv) {
        Some(CsvExporter::new(&output_dir)?)
    } else {
        None
    };
    let mut connection = db_path.as_deref().map(open_store).transpose()?;

    let mut counts = ExtractCounts {
        document_count: sources.len(),
        ..ExtractCounts::default()
    };
    let mut warnings = Vec::new();
    let mut variant_ids = BTreeSet::new();

    for source in &sources {
        let extraction = extract_document(source)?;
        counts.tables_seen += extraction.tables_seen;
        counts.tables_skipped += extraction.tables_skipped;

        if !extraction.reached_change_history {
            debug!(document = %source.entry.filename, "no change history heading found");
        }
        if extraction.groups.is_empty() {
            warn!(document = %source.entry.filename, "no variant groups found");
            warnings.push(format!("{}: no variant groups found", source.entry.filename));
        }

        let groups = extraction.groups;
        for (index, group) in groups.iter().enumerate() {
            if !filter.keeps_group(group) {
                continue;
            }

            counts.group_count += 1;
            counts.row_count += group.table.len();
            counts.warning_count += group.warnings.len();
            variant_ids.extend(filter.selected(group).into_iter().map(str::to_string));
            warnings.extend(
                group
                    .warnings
                    .iter()
                    .map(|warning| format!("{}: {warning}", source.entry.filename)),
            );

            if let Some(exporter) = csv_exporter.as_mut() {
                exporter.write_group(source, index, group, &filter)?;
            }
        }

        if formats.contains(&ExportFormat::Json) {
            let export = document_export(source, &groups, &filter, &started_at);
            write_document_json(&output_dir, source, &export)?;
            counts.json_files_written += 1;
        }

        if let Some(connection) = connection.as_mut() {
            match store_document(connection, source, &groups, &filter)? {
                StoreOutcome::Unchanged => {
                    counts.documents_unchanged += 1;
                    info!(document = %source.entry.filename, "document unchanged in store");
                }
                StoreOutcome::Stored { rows_inserted } => {
                    counts.db_rows_inserted += rows_inserted;
                }
            }
        }
    }

    counts.variant_count = variant_ids.len();
    counts.csv_files_written = csv_exporter
        .as_ref()
        .map(CsvExporter::files_written)
        .unwrap_or(0);

    let mut notes = Vec::new();
    if !filter.is_empty() {
        notes.push(format!("variant filter: {}", filter.key()));
    }
    if let Some(connection) = &connection {
        let documents_total = count_rows(connection, "SELECT COUNT(*) FROM documents")?;
        let rows_total = count_rows(connection, "SELECT COUNT(*) FROM variant_rows")?;
        notes.push(format!(
            "store holds {documents_total} documents and {rows_total} variant rows"
        ));
    }

    let manifest = ExtractRunManifest {
        manifest_version: 1,
        run_id: run_id.clone(),
        db_schema_version: DB_SCHEMA_VERSION.to_string(),
        status: "completed".to_string(),
        started_at,
        updated_at: now_utc_string(),
        command: render_extract_command(&args),
        formats: formats.iter().map(|format| format.as_str().to_string()).collect(),
        variant_filter: filter.ids(),
        paths: ExtractPaths {
            cache_root: cache_root.display().to_string(),
            manifest_dir: manifest_dir.display().to_string(),
            inventory_manifest_path: inventory_manifest_path
                .map(|path| path.display().to_string()),
            output_dir: output_dir.display().to_string(),
            db_path: db_path.map(|path| path.display().to_string()),
        },
        counts,
        source_hashes: sources.into_iter().map(|source| source.entry).collect(),
        warnings,
        notes,
    };

    write_json_pretty(&extract_manifest_path, &manifest)?;
    info!(path = %extract_manifest_path.display(), "wrote extract run manifest");
    info!(
        run_id = %run_id,
        documents = manifest.counts.document_count,
        groups = manifest.counts.group_count,
        rows = manifest.counts.row_count,
        warnings = manifest.counts.warning_count,
        "extract completed"
    );

    Ok(())
}

pub(super) fn extract_document(source: &SourceDocument) -> Result<Extraction> {
    let document = load_document(&source.path)
        .with_context(|| format!("failed to load {}", source.path.display()))?;
    let extraction = extract_groups(&document)
        .with_context(|| format!("failed to extract tables from {}", source.path.display()))?;

    info!(
        document = %source.entry.filename,
        groups = extraction.groups.len(),
        tables = extraction.tables_seen,
        skipped = extraction.tables_skipped,
        "extracted document"
    );
    Ok(extraction)
}

fn load_or_refresh_inventory(
    cache_root: &Path,
    inventory_manifest_path: &Path,
    refresh_inventory: bool,
) -> Result<DocxInventoryManifest> {
    if refresh_inventory || !inventory_manifest_path.exists() {
        let manifest = inventory::build_manifest(cache_root)?;
        write_json_pretty(inventory_manifest_path, &manifest)?;
        info!(
            path = %inventory_manifest_path.display(),
            docx_count = manifest.docx_count,
            "refreshed inventory manifest"
        );
        return Ok(manifest);
    }

    let raw = fs::read(inventory_manifest_path)
        .with_context(|| format!("failed to read {}", inventory_manifest_path.display()))?;
    let manifest: DocxInventoryManifest = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse {}", inventory_manifest_path.display()))?;

    info!(
        path = %inventory_manifest_path.display(),
        docx_count = manifest.docx_count,
        "loaded existing inventory manifest"
    );

    Ok(manifest)
}

pub(super) fn sources_from_inventory(inventory: &DocxInventoryManifest) -> Vec<SourceDocument> {
    let source_dir = Path::new(&inventory.source_directory);
    inventory
        .docs
        .iter()
        .map(|entry| SourceDocument {
            path: source_dir.join(&entry.filename),
            entry: entry.clone(),
        })
        .collect()
}

fn explicit_sources(paths: &[PathBuf]) -> Result<Vec<SourceDocument>> {
    paths
        .iter()
        .map(|path| {
            Ok(SourceDocument {
                path: path.clone(),
                entry: inventory::describe_docx(path)?,
            })
        })
        .collect()
}

pub(super) fn resolve_formats(requested: &[ExportFormat]) -> Vec<ExportFormat> {
    if requested.is_empty() {
        return ExportFormat::ALL.to_vec();
    }
    let mut formats = requested.to_vec();
    formats.sort();
    formats.dedup();
    formats
}

fn render_formats(formats: &[ExportFormat]) -> String {
    formats
        .iter()
        .map(|format| format.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

pub(super) fn render_extract_command(args: &ExtractArgs) -> String {
    let mut command = vec![
        "ahbgrid".to_string(),
        "extract".to_string(),
        "--cache-root".to_string(),
        args.cache_root.display().to_string(),
    ];

    if let Some(path) = &args.inventory_manifest_path {
        command.push("--inventory-manifest-path".to_string());
        command.push(path.display().to_string());
    }
    if let Some(path) = &args.extract_manifest_path {
        command.push("--extract-manifest-path".to_string());
        command.push(path.display().to_string());
    }
    if let Some(path) = &args.db_path {
        command.push("--db-path".to_string());
        command.push(path.display().to_string());
    }
    if let Some(path) = &args.output_dir {
        command.push("--output-dir".to_string());
        command.push(path.display().to_string());
    }
    if args.refresh_inventory {
        command.push("--refresh-inventory".to_string());
    }
    for path in &args.documents {
        command.push("--document".to_string());
        command.push(path.display().to_string());
    }
    for variant in &args.variants {
        command.push("--variant".to_string());
        command.push(variant.clone());
    }
    for format in &args.formats {
        command.push("--format".to_string());
        command.push(format.as_str().to_string());
    }

    command.join(" ")
}
