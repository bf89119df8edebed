use serde::Serialize;

use super::error::ExtractError;
use super::view::{CellView, ParagraphView, Rgb, Twips};

pub const HEADER_MARKER: &str = "EDIFACT Struktur";
pub const SEPARATOR: char = '\t';

const SEGMENT_NAME_COLOR: Rgb = Rgb(0x80, 0x80, 0x80);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    Header,
    SegmentName,
    SegmentGroup,
    Segment,
    DataElement,
    Empty,
}

impl RowKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::SegmentName => "segment_name",
            Self::SegmentGroup => "segment_group",
            Self::Segment => "segment",
            Self::DataElement => "data_element",
            Self::Empty => "empty",
        }
    }
}

/// The three features a hierarchy cell is classified by.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RowFeatures<'a> {
    pub text: &'a str,
    pub at_reference_indent: bool,
    pub segment_name_colored: bool,
}

/// First match wins. Header and segment name checks run before any
/// indentation based check.
pub(crate) fn classify_features(features: RowFeatures<'_>) -> Option<RowKind> {
    let RowFeatures {
        text,
        at_reference_indent,
        segment_name_colored,
    } = features;

    if text == HEADER_MARKER {
        return Some(RowKind::Header);
    }
    if segment_name_colored {
        return Some(RowKind::SegmentName);
    }

    let separators = text.matches(SEPARATOR).count();
    let has_text = !text.is_empty();

    if !at_reference_indent && separators == 0 && has_text {
        return Some(RowKind::SegmentGroup);
    }
    if (at_reference_indent && separators == 0 && has_text)
        || (!at_reference_indent && separators == 1)
    {
        return Some(RowKind::Segment);
    }
    if (at_reference_indent && separators > 0) || (!at_reference_indent && separators == 2) {
        return Some(RowKind::DataElement);
    }
    if text.is_empty() {
        return Some(RowKind::Empty);
    }
    None
}

/// Classifies a row by its hierarchy cell.
pub fn classify<C: CellView>(
    cell: &C,
    reference_indent: Option<Twips>,
    row_index: usize,
) -> Result<RowKind, ExtractError> {
    let text = cell.text();
    let segment_name_colored = cell
        .paragraphs()
        .first()
        .and_then(ParagraphView::leading_run_color)
        == Some(SEGMENT_NAME_COLOR);

    classify_features(RowFeatures {
        text: &text,
        at_reference_indent: cell.leading_indent() == reference_indent,
        segment_name_colored,
    })
    .ok_or(ExtractError::UnclassifiableRow {
        table_index: 0,
        row_index,
        text,
    })
}

/// A physical row reduced to its three logical cells.
#[derive(Debug)]
pub struct LogicalRow<'a, C> {
    pub hierarchy: &'a C,
    pub value: Option<&'a C>,
    pub condition: Option<&'a C>,
}

/// Some tables repeat a merged cell once per grid column it spans, which
/// yields four cells where three are meant. Duplicates are detected by text.
pub fn logical_row<C: CellView>(
    cells: &[C],
    row_index: usize,
) -> Result<LogicalRow<'_, C>, ExtractError> {
    match cells {
        [hierarchy] => Ok(LogicalRow {
            hierarchy,
            value: None,
            condition: None,
        }),
        [hierarchy, value] => Ok(LogicalRow {
            hierarchy,
            value: Some(value),
            condition: None,
        }),
        [hierarchy, value, condition] => Ok(LogicalRow {
            hierarchy,
            value: Some(value),
            condition: Some(condition),
        }),
        [first, second, third, fourth] => {
            let texts = [first.text(), second.text(), third.text(), fourth.text()];
            if texts[0] == texts[1] && texts[2] == texts[3] {
                Ok(LogicalRow {
                    hierarchy: first,
                    value: Some(third),
                    condition: None,
                })
            } else if texts[1] == texts[2] || texts[0] == texts[1] {
                Ok(LogicalRow {
                    hierarchy: first,
                    value: Some(third),
                    condition: Some(fourth),
                })
            } else if texts[2] == texts[3] {
                Ok(LogicalRow {
                    hierarchy: first,
                    value: Some(second),
                    condition: Some(third),
                })
            } else {
                Err(ExtractError::UnexpectedColumnLayout {
                    row_index,
                    cells: texts.to_vec(),
                })
            }
        }
        _ => Err(ExtractError::UnexpectedColumnLayout {
            row_index,
            cells: cells.iter().map(CellView::text).collect(),
        }),
    }
}
