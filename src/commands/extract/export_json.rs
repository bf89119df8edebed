use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use super::{SourceDocument, VariantFilter};
use crate::ahb::{ExtractWarning, OutputRow, VariantGroup, VariantMeta};
use crate::util::write_json_pretty;

#[derive(Debug, Serialize)]
pub(super) struct DocumentExport<'a> {
    pub document: &'a str,
    pub topic: &'a str,
    pub sha256: &'a str,
    pub extracted_at: &'a str,
    pub groups: Vec<GroupExport<'a>>,
}

#[derive(Debug, Serialize)]
pub(super) struct GroupExport<'a> {
    pub index: usize,
    pub variants: &'a [VariantMeta],
    pub columns: Vec<String>,
    pub source_tables: usize,
    pub rows: &'a [OutputRow],
    pub conditions: BTreeMap<u64, String>,
    pub warnings: &'a [ExtractWarning],
}

pub(super) fn document_export<'a>(
    source: &'a SourceDocument,
    groups: &'a [VariantGroup],
    filter: &VariantFilter,
    extracted_at: &'a str,
) -> DocumentExport<'a> {
    let groups = groups
        .iter()
        .enumerate()
        .filter(|(_, group)| filter.keeps_group(group))
        .map(|(index, group)| GroupExport {
            index,
            variants: &group.variants,
            columns: group.table.column_headers(),
            source_tables: group.source_tables,
            rows: group.table.rows(),
            conditions: group.conditions.clone(),
            warnings: &group.warnings,
        })
        .collect();

    DocumentExport {
        document: &source.entry.filename,
        topic: &source.entry.topic,
        sha256: &source.entry.sha256,
        extracted_at,
        groups,
    }
}

/// Writes `json/<doc>.json` and returns its path.
pub(super) fn write_document_json(
    output_dir: &Path,
    source: &SourceDocument,
    export: &DocumentExport<'_>,
) -> Result<PathBuf> {
    let path = output_dir.join("json").join(format!("{}.json", source.slug()));
    write_json_pretty(&path, export)?;
    info!(path = %path.display(), groups = export.groups.len(), "wrote json export");
    Ok(path)
}
