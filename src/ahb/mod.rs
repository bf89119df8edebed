//! Row classification and cell reconstruction for AHB message tables.
//!
//! The tables of an Anwendungshandbuch carry no machine readable schema. Each
//! row has a hierarchy cell (segment group / segment / data element), a value
//! cell whose paragraphs use indentation and tab stops as an implicit column
//! grid, and a condition cell. This module turns a sequence of such tables into
//! fixed-schema [`OutputTable`]s, one per variant group.

mod condition;
mod document;
mod error;
mod hierarchy;
mod memory;
mod output;
mod patterns;
mod row_kind;
mod seed;
mod stitcher;
mod value;
mod view;

#[cfg(test)]
mod fakes;

pub use condition::{beautify_conditions, collect_conditions, parse_condition_cell};
pub use document::{CHANGE_HISTORY_HEADING, Extraction, extract_groups};
pub use error::{ExtractError, ExtractWarning};
pub use hierarchy::parse_hierarchy_cell;
pub use memory::{Dispatch, MemoryPhase, RowKindMemory};
pub use output::{
    BASE_COLUMNS, CONDITION_COLUMN, OutputRow, OutputTable, ProjectedRow, SEGMENT_ID_COLUMN,
    ValueColumn, VariantProjection, append_fragment,
};
pub use patterns::Patterns;
pub use row_kind::{HEADER_MARKER, LogicalRow, RowKind, SEPARATOR, classify, logical_row};
pub use seed::{TableMetadataSeed, VARIANT_MARKER, VariantMeta, parse_variant_ids};
pub use stitcher::{TableOutcome, TableStitcher, VariantGroup};
pub use value::{ParagraphLayout, ValueCellParser, layout_paragraph};
pub use view::{BlockRef, CellView, DocumentView, ParagraphView, Rgb, TableView, Twips};
