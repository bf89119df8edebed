use serde::Serialize;

use super::row_kind::RowKind;

pub const BASE_COLUMNS: [&str; 5] = [
    "Segment Group",
    "Segment",
    "Data Element",
    "Code/Qualifier",
    "Description",
];
pub const CONDITION_COLUMN: &str = "Condition";
pub const SEGMENT_ID_COLUMN: &str = "Segment ID";

/// Word endings that show up as the start of a line when a page break splits
/// a word. They are glued on without a space.
const CONTINUATION_FRAGMENTS: [&str; 9] = ["g", "ung", "gs-", "vall", "n", "m", "t", "rage", "sgrund"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueColumn {
    Description,
    Variant(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputRow {
    pub kind: RowKind,
    pub group: String,
    pub segment: String,
    pub data_element: String,
    pub segment_id: Option<String>,
    pub value_code: String,
    pub description: String,
    pub expressions: Vec<String>,
    pub condition: String,
}

impl OutputRow {
    fn blank(kind: RowKind, variant_count: usize) -> Self {
        Self {
            kind,
            group: String::new(),
            segment: String::new(),
            data_element: String::new(),
            segment_id: None,
            value_code: String::new(),
            description: String::new(),
            expressions: vec![String::new(); variant_count],
            condition: String::new(),
        }
    }

    /// Positional cells in column header order.
    pub fn cells(&self) -> Vec<&str> {
        let mut cells = vec![
            self.group.as_str(),
            self.segment.as_str(),
            self.data_element.as_str(),
            self.value_code.as_str(),
            self.description.as_str(),
        ];
        cells.extend(self.expressions.iter().map(String::as_str));
        cells.push(self.condition.as_str());
        cells
    }

    pub fn has_trailing_content(&self) -> bool {
        !self.description.is_empty() || self.expressions.iter().any(|cell| !cell.is_empty())
    }

    pub fn value_cell_mut(&mut self, column: ValueColumn) -> Option<&mut String> {
        match column {
            ValueColumn::Description => Some(&mut self.description),
            ValueColumn::Variant(index) => self.expressions.get_mut(index),
        }
    }
}

/// Appends a text fragment to a cell. A space separates the two parts unless
/// the cell is empty or the fragment is a known word ending.
pub fn append_fragment(target: &mut String, fragment: &str) {
    let fragment = fragment.trim();
    if fragment.is_empty() {
        return;
    }
    if !target.is_empty() && !starts_with_continuation_fragment(fragment) {
        target.push(' ');
    }
    target.push_str(fragment);
}

fn starts_with_continuation_fragment(fragment: &str) -> bool {
    let first_word = fragment.split_whitespace().next().unwrap_or_default();
    CONTINUATION_FRAGMENTS.contains(&first_word)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputTable {
    variant_ids: Vec<String>,
    rows: Vec<OutputRow>,
}

impl OutputTable {
    pub fn new(variant_ids: Vec<String>) -> Self {
        Self {
            variant_ids,
            rows: Vec::new(),
        }
    }

    pub fn variant_ids(&self) -> &[String] {
        &self.variant_ids
    }

    pub fn column_count(&self) -> usize {
        BASE_COLUMNS.len() + self.variant_ids.len() + 1
    }

    pub fn column_headers(&self) -> Vec<String> {
        BASE_COLUMNS
            .iter()
            .map(|column| column.to_string())
            .chain(self.variant_ids.iter().cloned())
            .chain(std::iter::once(CONDITION_COLUMN.to_string()))
            .collect()
    }

    pub fn rows(&self) -> &[OutputRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn last_index(&self) -> Option<usize> {
        self.rows.len().checked_sub(1)
    }

    pub fn push_row(&mut self, kind: RowKind) -> usize {
        self.rows.push(OutputRow::blank(kind, self.variant_ids.len()));
        self.rows.len() - 1
    }

    /// Appends a row carrying the hierarchy of the row at `index`.
    pub fn duplicate_hierarchy(&mut self, index: usize) -> usize {
        let source = &self.rows[index];
        let mut row = OutputRow::blank(source.kind, self.variant_ids.len());
        row.group = source.group.clone();
        row.segment = source.segment.clone();
        row.data_element = source.data_element.clone();
        row.segment_id = source.segment_id.clone();
        self.rows.push(row);
        self.rows.len() - 1
    }

    pub fn row(&self, index: usize) -> &OutputRow {
        &self.rows[index]
    }

    pub fn row_mut(&mut self, index: usize) -> &mut OutputRow {
        &mut self.rows[index]
    }

    /// A copy in which code rows and segment rows inherit the most recent
    /// non-empty group, segment and data element above them. A new group
    /// resets the segment and data element, a new segment resets the data
    /// element.
    pub fn filled_hierarchy(&self) -> OutputTable {
        let mut filled = self.clone();
        let mut group = String::new();
        let mut segment = String::new();
        let mut data_element = String::new();

        for row in &mut filled.rows {
            if !row.group.is_empty() {
                group = row.group.clone();
                segment.clear();
                data_element.clear();
            }
            if !row.segment.is_empty() {
                segment = row.segment.clone();
                data_element.clear();
            }
            if !row.data_element.is_empty() {
                data_element = row.data_element.clone();
            }

            let inherits = (row.group.is_empty() && !row.value_code.is_empty())
                || !row.segment.is_empty();
            if inherits {
                row.group = group.clone();
                row.segment = segment.clone();
                row.data_element = data_element.clone();
            }
        }
        filled
    }

    /// The rows restricted to one variant's expression column.
    pub fn project(&self, variant_id: &str) -> Option<VariantProjection> {
        let position = self.variant_ids.iter().position(|id| id == variant_id)?;
        let rows = self
            .rows
            .iter()
            .map(|row| ProjectedRow {
                group: row.group.clone(),
                segment: row.segment.clone(),
                data_element: row.data_element.clone(),
                segment_id: row.segment_id.clone(),
                value_code: row.value_code.clone(),
                description: row.description.clone(),
                expression: row.expressions[position].clone(),
                condition: row.condition.clone(),
            })
            .collect();

        Some(VariantProjection {
            variant_id: variant_id.to_string(),
            rows,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectedRow {
    pub group: String,
    pub segment: String,
    pub data_element: String,
    pub segment_id: Option<String>,
    pub value_code: String,
    pub description: String,
    pub expression: String,
    pub condition: String,
}

impl ProjectedRow {
    pub fn cells(&self) -> [&str; 7] {
        [
            self.group.as_str(),
            self.segment.as_str(),
            self.data_element.as_str(),
            self.value_code.as_str(),
            self.description.as_str(),
            self.expression.as_str(),
            self.condition.as_str(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantProjection {
    pub variant_id: String,
    pub rows: Vec<ProjectedRow>,
}

impl VariantProjection {
    pub fn column_headers(&self) -> Vec<String> {
        BASE_COLUMNS
            .iter()
            .map(|column| column.to_string())
            .chain([self.variant_id.clone(), CONDITION_COLUMN.to_string()])
            .collect()
    }
}
