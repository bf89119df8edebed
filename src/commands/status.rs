use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::commands::extract::DB_FILENAME;
use crate::commands::inventory::INVENTORY_FILENAME;
use crate::model::{DocxInventoryManifest, ExtractRunManifest};

pub fn run(args: StatusArgs) -> Result<()> {
    let manifest_dir = args.cache_root.join("manifests");
    let inventory_path = manifest_dir.join(INVENTORY_FILENAME);
    let db_path = args.cache_root.join(DB_FILENAME);

    info!(cache_root = %args.cache_root.display(), "status requested");

    if inventory_path.exists() {
        let raw = fs::read(&inventory_path)
            .with_context(|| format!("failed to read {}", inventory_path.display()))?;
        let inventory: DocxInventoryManifest = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse {}", inventory_path.display()))?;

        info!(
            generated_at = %inventory.generated_at,
            docx_count = inventory.docx_count,
            superseded = inventory.superseded_count,
            warnings = inventory.warnings.len(),
            "loaded inventory manifest"
        );
    } else {
        warn!(path = %inventory_path.display(), "inventory manifest missing");
    }

    match latest_extract_manifest(&manifest_dir)? {
        Some(path) => {
            let raw = fs::read(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let manifest: ExtractRunManifest = serde_json::from_slice(&raw)
                .with_context(|| format!("failed to parse {}", path.display()))?;

            info!(
                run_id = %manifest.run_id,
                status = %manifest.status,
                updated_at = %manifest.updated_at,
                formats = %manifest.formats.join(","),
                documents = manifest.counts.document_count,
                groups = manifest.counts.group_count,
                rows = manifest.counts.row_count,
                warnings = manifest.counts.warning_count,
                "loaded latest extract run manifest"
            );
        }
        None => warn!(path = %manifest_dir.display(), "no extract run manifest found"),
    }

    if db_path.exists() {
        let conn = Connection::open(&db_path)
            .with_context(|| format!("failed to open {}", db_path.display()))?;
        let documents = query_count(&conn, "SELECT COUNT(*) FROM documents").unwrap_or(0);
        let variants = query_count(&conn, "SELECT COUNT(DISTINCT variant_id) FROM variants")
            .unwrap_or(0);
        let rows = query_count(&conn, "SELECT COUNT(*) FROM variant_rows").unwrap_or(0);

        info!(
            path = %db_path.display(),
            documents,
            variants,
            rows,
            "database status"
        );
    } else {
        warn!(path = %db_path.display(), "database file missing");
    }

    Ok(())
}

/// Run manifests carry a compact UTC timestamp, so the greatest name is the newest.
fn latest_extract_manifest(manifest_dir: &Path) -> Result<Option<PathBuf>> {
    if !manifest_dir.exists() {
        return Ok(None);
    }

    let entries = fs::read_dir(manifest_dir)
        .with_context(|| format!("failed to read {}", manifest_dir.display()))?;

    let mut latest: Option<PathBuf> = None;
    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", manifest_dir.display()))?;
        let path = entry.path();
        let is_run_manifest = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with("extract_run_") && name.ends_with(".json"));

        if is_run_manifest && latest.as_ref().is_none_or(|current| path > *current) {
            latest = Some(path);
        }
    }

    Ok(latest)
}

fn query_count(conn: &Connection, sql: &str) -> Result<i64> {
    let count = conn.query_row(sql, [], |row| row.get(0))?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::latest_extract_manifest;

    #[test]
    fn latest_extract_manifest_picks_the_newest_run() {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in [
            "extract_run_20240101T080000Z.json",
            "extract_run_20240305T120000Z.json",
            "docx_inventory.json",
        ] {
            fs::write(dir.path().join(name), b"{}").expect("write");
        }

        let latest = latest_extract_manifest(dir.path()).expect("scan");
        assert_eq!(
            latest.as_deref().and_then(|path| path.file_name()).and_then(|name| name.to_str()),
            Some("extract_run_20240305T120000Z.json")
        );

        let missing = dir.path().join("absent");
        assert_eq!(latest_extract_manifest(&missing).expect("scan"), None);
    }
}
