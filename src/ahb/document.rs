use tracing::{debug, info};

use super::error::ExtractError;
use super::stitcher::{TableOutcome, TableStitcher, VariantGroup};
use super::view::{BlockRef, CellView, DocumentView, ParagraphView, TableView};

pub const CHANGE_HISTORY_HEADING: &str = "Änderungshistorie";

/// The last data element of every message; a table ending with it closes
/// the variant group.
const MESSAGE_TRAILER: &str = "UNT\t0062";

#[derive(Debug, Default)]
pub struct Extraction {
    pub groups: Vec<VariantGroup>,
    pub tables_seen: usize,
    pub tables_skipped: usize,
    pub reached_change_history: bool,
}

/// Walks the body of a document in order and stitches its tables into
/// variant groups. The walk stops at the change history heading.
pub fn extract_groups<D: DocumentView>(document: &D) -> Result<Extraction, ExtractError> {
    let mut stitcher = TableStitcher::new()?;
    let mut extraction = Extraction::default();

    for block in document.blocks() {
        match block {
            BlockRef::Paragraph(paragraph) => {
                if is_change_history_heading(paragraph) {
                    info!("reached change history, stopping");
                    extraction.reached_change_history = true;
                    break;
                }
            }
            BlockRef::Table(table) => {
                extraction.tables_seen += 1;
                if stitcher.push_table(table)? == TableOutcome::Skipped {
                    extraction.tables_skipped += 1;
                    continue;
                }
                if ends_message(table) {
                    debug!("message trailer found, closing variant group");
                    stitcher.close_group();
                }
            }
        }
    }

    extraction.groups = stitcher.finish();
    Ok(extraction)
}

fn is_change_history_heading<P: ParagraphView>(paragraph: &P) -> bool {
    paragraph.text().contains(CHANGE_HISTORY_HEADING)
        && paragraph
            .style_name()
            .is_some_and(|style| style.to_lowercase().contains("heading"))
}

fn ends_message<T: TableView>(table: &T) -> bool {
    let Some(last) = table.row_count().checked_sub(1) else {
        return false;
    };
    table
        .row_cells(last)
        .first()
        .is_some_and(|cell| cell.text().contains(MESSAGE_TRAILER))
}
