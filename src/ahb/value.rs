use tracing::warn;

use super::error::ExtractWarning;
use super::output::{OutputTable, ValueColumn, append_fragment};
use super::row_kind::SEPARATOR;
use super::seed::TableMetadataSeed;
use super::view::{CellView, ParagraphView, Twips};

const NO_BREAK_SPACE: char = '\u{a0}';

/// Where the fields of one value cell paragraph belong.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParagraphLayout {
    pub code: Option<String>,
    pub placements: Vec<(ValueColumn, String)>,
    pub strays: Vec<(Option<Twips>, String)>,
}

/// Places the separator-delimited fields of a paragraph.
///
/// A paragraph at the reference indent with a non-empty leading field is a
/// code line. Any other non-empty leading field sits at the paragraph indent,
/// which selects its column when it equals a reference stop and the
/// description otherwise. The remaining fields pair up with the paragraph's
/// own tab stops, or with the reference stops when it has none.
pub fn layout_paragraph<P: ParagraphView>(
    paragraph: &P,
    text: &str,
    seed: &TableMetadataSeed,
) -> ParagraphLayout {
    let fields: Vec<&str> = text.split(SEPARATOR).collect();
    let indent = paragraph.left_indent();
    let lead = fields[0].trim();
    let stops = if paragraph.tab_stops().is_empty() {
        seed.value_tab_stops()
    } else {
        paragraph.tab_stops()
    };

    let mut layout = ParagraphLayout::default();
    let is_code = !lead.is_empty() && indent == seed.value_reference_indent();

    let reachable: Vec<Twips> = match indent {
        Some(indent) if !lead.is_empty() && !is_code => {
            stops.iter().copied().filter(|&stop| stop > indent).collect()
        }
        _ => stops.to_vec(),
    };

    if is_code {
        layout.code = Some(lead.to_string());
    } else if !lead.is_empty() {
        let column = indent
            .and_then(|indent| seed.value_column_at(indent))
            .unwrap_or(ValueColumn::Description);
        layout.placements.push((column, lead.to_string()));
    }

    for (position, field) in fields[1..].iter().enumerate() {
        let token = field.trim();
        if token.is_empty() {
            continue;
        }
        let stop = reachable.get(position).copied();
        match stop.and_then(|stop| seed.value_column_at(stop)) {
            Some(column) => layout.placements.push((column, token.to_string())),
            None => layout.strays.push((stop, token.to_string())),
        }
    }
    layout
}

/// Reconstructs the value cell of one physical row into output rows.
#[derive(Debug, Clone, Copy)]
pub struct ValueCellParser<'a> {
    seed: &'a TableMetadataSeed,
    table_index: usize,
    row_index: usize,
    continuation: bool,
}

impl<'a> ValueCellParser<'a> {
    pub fn new(seed: &'a TableMetadataSeed, table_index: usize, row_index: usize) -> Self {
        Self {
            seed,
            table_index,
            row_index,
            continuation: false,
        }
    }

    /// The cell continues a row split by a page break. A code line then opens
    /// a new row as soon as the current row already carries a code.
    pub fn continuing(mut self) -> Self {
        self.continuation = true;
        self
    }

    /// Fills the row at `cursor` and any rows opened by further code lines.
    /// Returns the index of the last row written.
    pub fn parse<C: CellView>(
        &self,
        cell: &C,
        table: &mut OutputTable,
        cursor: usize,
        warnings: &mut Vec<ExtractWarning>,
    ) -> usize {
        let mut cursor = cursor;
        let mut codes = 0usize;

        for paragraph in cell.paragraphs() {
            let text = paragraph.text().replace(NO_BREAK_SPACE, "");
            if text.trim().is_empty() {
                continue;
            }

            let layout = layout_paragraph(paragraph, &text, self.seed);

            if let Some(code) = layout.code {
                let occupied = self.continuation && !table.row(cursor).value_code.is_empty();
                if codes > 0 || occupied {
                    cursor = table.duplicate_hierarchy(cursor);
                }
                append_fragment(&mut table.row_mut(cursor).value_code, &code);
                codes += 1;
            }

            let row = table.row_mut(cursor);
            for (column, fragment) in layout.placements {
                if let Some(target) = row.value_cell_mut(column) {
                    append_fragment(target, &fragment);
                }
            }

            for (stop, field) in layout.strays {
                let warning = ExtractWarning::AlignmentMismatch {
                    table_index: self.table_index,
                    row_index: self.row_index,
                    paragraph: text.clone(),
                    field,
                    tab_stop: stop.map(|stop| stop.0),
                };
                warn!("{warning}");
                warnings.push(warning);
            }
        }
        cursor
    }
}
