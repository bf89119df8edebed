use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};

use super::{SourceDocument, VariantFilter};
use crate::ahb::VariantGroup;
use crate::util::now_utc_string;

pub const DB_FILENAME: &str = "ahbgrid.sqlite";
pub(super) const DB_SCHEMA_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum StoreOutcome {
    Unchanged,
    Stored { rows_inserted: usize },
}

pub(super) fn open_store(db_path: &Path) -> Result<Connection> {
    let connection = Connection::open(db_path)
        .with_context(|| format!("failed to open {}", db_path.display()))?;
    configure_connection(&connection)?;
    ensure_schema(&connection)?;
    Ok(connection)
}

fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    connection
        .pragma_update(None, "foreign_keys", "ON")
        .context("failed to enable foreign keys")?;
    Ok(())
}

fn ensure_schema(connection: &Connection) -> Result<()> {
    connection.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS metadata (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS documents (
          doc_id TEXT PRIMARY KEY,
          filename TEXT NOT NULL,
          sha256 TEXT NOT NULL,
          version TEXT,
          valid_from TEXT,
          valid_until TEXT,
          variant_filter TEXT NOT NULL DEFAULT '',
          extracted_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS variants (
          doc_id TEXT NOT NULL,
          group_index INTEGER NOT NULL,
          variant_id TEXT NOT NULL,
          name TEXT,
          direction TEXT,
          PRIMARY KEY (doc_id, group_index, variant_id),
          FOREIGN KEY (doc_id) REFERENCES documents(doc_id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS variant_rows (
          doc_id TEXT NOT NULL,
          group_index INTEGER NOT NULL,
          row_index INTEGER NOT NULL,
          variant_id TEXT NOT NULL,
          kind TEXT NOT NULL,
          segment_group TEXT,
          segment TEXT,
          data_element TEXT,
          segment_id TEXT,
          value_code TEXT,
          description TEXT,
          expression TEXT,
          condition_text TEXT,
          PRIMARY KEY (doc_id, group_index, row_index, variant_id),
          FOREIGN KEY (doc_id) REFERENCES documents(doc_id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_rows_variant ON variant_rows(variant_id);
        CREATE INDEX IF NOT EXISTS idx_rows_segment ON variant_rows(doc_id, segment, data_element);
        ",
    )?;

    connection.execute(
        "INSERT INTO metadata(key, value) VALUES('db_schema_version', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        [DB_SCHEMA_VERSION],
    )?;

    Ok(())
}

/// Replaces everything stored for the document unless the same file content
/// was already stored with the same variant filter.
pub(super) fn store_document(
    connection: &mut Connection,
    source: &SourceDocument,
    groups: &[VariantGroup],
    filter: &VariantFilter,
) -> Result<StoreOutcome> {
    let doc_id = source.entry.topic.as_str();
    let filter_key = filter.key();

    let existing: Option<(String, String)> = connection
        .query_row(
            "SELECT sha256, variant_filter FROM documents WHERE doc_id = ?1",
            [doc_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;
    if existing.is_some_and(|(sha256, stored_filter)| {
        sha256 == source.entry.sha256 && stored_filter == filter_key
    }) {
        return Ok(StoreOutcome::Unchanged);
    }

    let now = now_utc_string();
    let tx = connection.transaction()?;
    tx.execute("DELETE FROM variant_rows WHERE doc_id = ?1", [doc_id])?;
    tx.execute("DELETE FROM variants WHERE doc_id = ?1", [doc_id])?;
    tx.execute(
        "
        INSERT INTO documents(doc_id, filename, sha256, version, valid_from, valid_until, variant_filter, extracted_at)
        VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        ON CONFLICT(doc_id) DO UPDATE SET
          filename=excluded.filename,
          sha256=excluded.sha256,
          version=excluded.version,
          valid_from=excluded.valid_from,
          valid_until=excluded.valid_until,
          variant_filter=excluded.variant_filter,
          extracted_at=excluded.extracted_at
        ",
        params![
            doc_id,
            &source.entry.filename,
            &source.entry.sha256,
            &source.entry.version,
            &source.entry.valid_from,
            &source.entry.valid_until,
            &filter_key,
            &now
        ],
    )?;

    let mut rows_inserted = 0;
    {
        let mut insert_variant = tx.prepare(
            "INSERT OR REPLACE INTO variants(doc_id, group_index, variant_id, name, direction)
             VALUES(?1, ?2, ?3, ?4, ?5)",
        )?;
        let mut insert_row = tx.prepare(
            "
            INSERT OR REPLACE INTO variant_rows(
              doc_id, group_index, row_index, variant_id, kind, segment_group, segment,
              data_element, segment_id, value_code, description, expression, condition_text
            )
            VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            ",
        )?;

        for (group_index, group) in groups.iter().enumerate() {
            for variant in group.variants.iter().filter(|variant| filter.selects(&variant.id)) {
                insert_variant.execute(params![
                    doc_id,
                    group_index as i64,
                    &variant.id,
                    &variant.name,
                    &variant.direction
                ])?;
            }

            let filled = group.table.filled_hierarchy();
            for (position, variant_id) in filled.variant_ids().iter().enumerate() {
                if !filter.selects(variant_id) {
                    continue;
                }
                for (row_index, row) in filled.rows().iter().enumerate() {
                    insert_row.execute(params![
                        doc_id,
                        group_index as i64,
                        row_index as i64,
                        variant_id,
                        row.kind.as_str(),
                        &row.group,
                        &row.segment,
                        &row.data_element,
                        &row.segment_id,
                        &row.value_code,
                        &row.description,
                        &row.expressions[position],
                        &row.condition
                    ])?;
                    rows_inserted += 1;
                }
            }
        }
    }

    tx.execute(
        "INSERT INTO metadata(key, value) VALUES('db_updated_at', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        [&now],
    )?;
    tx.commit()?;

    Ok(StoreOutcome::Stored { rows_inserted })
}

pub(super) fn count_rows(connection: &Connection, sql: &str) -> Result<i64> {
    let count = connection.query_row(sql, [], |row| row.get(0))?;
    Ok(count)
}
