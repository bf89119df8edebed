use super::output::{OutputRow, append_fragment};
use super::patterns::Patterns;
use super::row_kind::{RowKind, SEPARATOR};
use super::seed::{TableMetadataSeed, collapse_whitespace};
use super::view::{CellView, ParagraphView};

/// Writes the hierarchy fields of `row` from a hierarchy cell.
///
/// Tokens are routed by shape, wherever they sit in the cell: `SG<n>` to the
/// group, three capitals to the segment, four digits to the data element and
/// segment ids to their own field. Anything else continues the group label.
pub fn parse_hierarchy_cell<C: CellView>(
    cell: &C,
    kind: RowKind,
    seed: &TableMetadataSeed,
    patterns: &Patterns,
    row: &mut OutputRow,
) {
    let joined = cell
        .paragraphs()
        .iter()
        .map(ParagraphView::text)
        .collect::<Vec<&str>>()
        .join(" ");

    match kind {
        RowKind::Header | RowKind::Empty => return,
        RowKind::SegmentName => {
            let title = collapse_whitespace(&joined.replace(SEPARATOR, " "));
            append_fragment(&mut row.group, &title);
            return;
        }
        RowKind::SegmentGroup | RowKind::Segment | RowKind::DataElement => {}
    }

    let at_reference = cell.leading_indent() == seed.hierarchy_reference_indent();
    if !at_reference && !joined.contains(SEPARATOR) {
        let text = joined.trim();
        let bold = cell
            .paragraphs()
            .first()
            .is_some_and(ParagraphView::leading_run_bold);
        if bold || patterns.segment_group.is_match(text) {
            row.group = text.to_string();
        } else {
            append_fragment(&mut row.group, text);
        }
        return;
    }

    for token in joined.split(SEPARATOR).map(str::trim) {
        if token.is_empty() {
            continue;
        }
        if patterns.segment_group.is_match(token) {
            row.group = token.to_string();
        } else if patterns.segment.is_match(token) {
            row.segment = token.to_string();
        } else if patterns.data_element.is_match(token) {
            row.data_element = token.to_string();
        } else if patterns.segment_id.is_match(token) {
            row.segment_id = Some(token.to_string());
        } else {
            append_fragment(&mut row.group, token);
        }
    }
}
