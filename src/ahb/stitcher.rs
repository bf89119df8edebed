use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use super::condition::{append_condition, collect_conditions, parse_condition_cell};
use super::error::{ExtractError, ExtractWarning};
use super::hierarchy::parse_hierarchy_cell;
use super::memory::Dispatch;
use super::output::OutputTable;
use super::patterns::Patterns;
use super::row_kind::{HEADER_MARKER, LogicalRow, RowKind, classify, logical_row};
use super::seed::{TableMetadataSeed, VariantMeta};
use super::value::ValueCellParser;
use super::view::{CellView, ParagraphView, TableView};

/// One finished variant group: a header table and the continuation tables
/// that followed it.
#[derive(Debug, Clone, Serialize)]
pub struct VariantGroup {
    pub variants: Vec<VariantMeta>,
    pub table: OutputTable,
    /// Condition texts of the group keyed by their number.
    pub conditions: BTreeMap<u64, String>,
    pub warnings: Vec<ExtractWarning>,
    pub source_tables: usize,
}

impl VariantGroup {
    pub fn variant_ids(&self) -> &[String] {
        self.table.variant_ids()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableOutcome {
    Opened,
    Continued,
    Skipped,
}

#[derive(Debug)]
enum StitchState {
    Idle,
    InGroup(GroupBuilder),
}

/// Joins the tables of a document into variant groups. A table whose first
/// cell carries the header marker opens a group; a table without one extends
/// the open group and is ignored while no group is open.
#[derive(Debug)]
pub struct TableStitcher {
    state: StitchState,
    patterns: Patterns,
    finished: Vec<VariantGroup>,
    tables_seen: usize,
}

impl TableStitcher {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            state: StitchState::Idle,
            patterns: Patterns::compile()?,
            finished: Vec::new(),
            tables_seen: 0,
        })
    }

    pub fn push_table<T: TableView>(&mut self, table: &T) -> Result<TableOutcome, ExtractError> {
        let table_index = self.tables_seen;
        self.tables_seen += 1;

        if is_header_table(table) {
            self.close_group();
            let seed = TableMetadataSeed::from_header_table(table)?;
            debug!(
                table_index,
                variants = seed.variant_count(),
                "opening variant group"
            );
            let mut builder = GroupBuilder::new(seed, self.patterns.clone());
            builder.stitch(table, table_index, false)?;
            self.state = StitchState::InGroup(builder);
            return Ok(TableOutcome::Opened);
        }

        match &mut self.state {
            StitchState::Idle => {
                debug!(table_index, "skipping table outside a variant group");
                Ok(TableOutcome::Skipped)
            }
            StitchState::InGroup(builder) => {
                builder.stitch(table, table_index, true)?;
                Ok(TableOutcome::Continued)
            }
        }
    }

    /// Finalizes the open group, if any, and returns to idle.
    pub fn close_group(&mut self) {
        if let StitchState::InGroup(builder) = std::mem::replace(&mut self.state, StitchState::Idle)
        {
            self.finished.push(builder.finish());
        }
    }

    pub fn finish(mut self) -> Vec<VariantGroup> {
        self.close_group();
        self.finished
    }
}

pub(crate) fn is_header_table<T: TableView>(table: &T) -> bool {
    table
        .row_cells(0)
        .first()
        .is_some_and(|cell| cell.text().trim() == HEADER_MARKER)
}

#[derive(Debug)]
struct GroupBuilder {
    seed: TableMetadataSeed,
    patterns: Patterns,
    table: OutputTable,
    warnings: Vec<ExtractWarning>,
    source_tables: usize,
}

impl GroupBuilder {
    fn new(seed: TableMetadataSeed, patterns: Patterns) -> Self {
        let table = OutputTable::new(seed.variant_ids());
        Self {
            seed,
            patterns,
            table,
            warnings: Vec::new(),
            source_tables: 0,
        }
    }

    fn finish(self) -> VariantGroup {
        VariantGroup {
            variants: self.seed.variants().to_vec(),
            conditions: collect_conditions(&self.patterns, &self.table),
            table: self.table,
            warnings: self.warnings,
            source_tables: self.source_tables,
        }
    }

    fn stitch<T: TableView>(
        &mut self,
        table: &T,
        table_index: usize,
        continuation: bool,
    ) -> Result<(), ExtractError> {
        self.source_tables += 1;

        for row_index in 0..table.row_count() {
            let row = logical_row(table.row_cells(row_index), row_index)?;
            let kind = classify(
                row.hierarchy,
                self.seed.hierarchy_reference_indent(),
                row_index,
            )
            .map_err(|error| error.in_table(table_index))?;

            match self.seed.row_kinds().dispatch(kind) {
                Dispatch::Skip => {}
                Dispatch::Continuation(previous) => {
                    self.merge_into_last(&row, previous, table_index, row_index);
                }
                Dispatch::Regular(kind) => {
                    if continuation && row_index == 0 && self.is_broken_line(&row, kind) {
                        self.merge_into_last(&row, kind, table_index, row_index);
                    } else {
                        self.append(&row, kind, table_index, row_index);
                    }
                }
            }
            self.seed.row_kinds_mut().observe(kind);
        }
        Ok(())
    }

    /// The first row of a continuation table still belongs to the last row
    /// when it has no hierarchy of its own and its value text either is empty
    /// or does not start at the code indent.
    fn is_broken_line<C: CellView>(&self, row: &LogicalRow<'_, C>, kind: RowKind) -> bool {
        if kind != RowKind::Empty {
            return false;
        }
        let Some(last) = self.table.last_index() else {
            return false;
        };
        let Some(first) = row.value.and_then(|cell| cell.paragraphs().first()) else {
            return true;
        };

        let text = first.text().replace('\u{a0}', "");
        if text.trim().is_empty() {
            return true;
        }
        first.left_indent() != self.seed.value_reference_indent()
            && self.table.row(last).has_trailing_content()
    }

    fn append<C: CellView>(
        &mut self,
        row: &LogicalRow<'_, C>,
        kind: RowKind,
        table_index: usize,
        row_index: usize,
    ) {
        let cursor = self.table.push_row(kind);
        parse_hierarchy_cell(
            row.hierarchy,
            kind,
            &self.seed,
            &self.patterns,
            self.table.row_mut(cursor),
        );

        let cursor = match row.value {
            Some(cell) => ValueCellParser::new(&self.seed, table_index, row_index).parse(
                cell,
                &mut self.table,
                cursor,
                &mut self.warnings,
            ),
            None => cursor,
        };

        if let Some(cell) = row.condition {
            let text = parse_condition_cell(&self.patterns, cell);
            append_condition(&self.patterns, self.table.row_mut(cursor), &text);
        }
    }

    /// Writes a row split by a page break into the row before it instead of
    /// allocating a new one.
    fn merge_into_last<C: CellView>(
        &mut self,
        row: &LogicalRow<'_, C>,
        kind: RowKind,
        table_index: usize,
        row_index: usize,
    ) {
        let Some(last) = self.table.last_index() else {
            self.append(row, kind, table_index, row_index);
            return;
        };
        debug!(table_index, row_index, "merging page break continuation");

        if let Some(cell) = row.condition {
            let text = parse_condition_cell(&self.patterns, cell);
            append_condition(&self.patterns, self.table.row_mut(last), &text);
        }
        parse_hierarchy_cell(
            row.hierarchy,
            kind,
            &self.seed,
            &self.patterns,
            self.table.row_mut(last),
        );

        if let Some(cell) = row.value {
            ValueCellParser::new(&self.seed, table_index, row_index)
                .continuing()
                .parse(cell, &mut self.table, last, &mut self.warnings);
        }
    }
}
