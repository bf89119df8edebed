use std::collections::BTreeMap;

use super::output::{OutputRow, OutputTable};
use super::patterns::Patterns;
use super::seed::collapse_whitespace;
use super::view::CellView;

/// Flattens line breaks and puts every condition marker after the first on a
/// line of its own. Applying it twice changes nothing.
pub fn beautify_conditions(patterns: &Patterns, text: &str) -> String {
    let flat = text.replace("\r\n", " ").replace(['\n', '\r'], " ");
    let mut result = String::with_capacity(flat.len());
    let mut last = 0;

    for (index, marker) in patterns.condition_marker.find_iter(&flat).enumerate() {
        result.push_str(&flat[last..marker.start()]);
        if index > 0 {
            let trimmed = result.trim_end().len();
            result.truncate(trimmed);
            result.push('\n');
        }
        last = marker.start();
    }
    result.push_str(&flat[last..]);
    result.trim().to_string()
}

pub fn parse_condition_cell<C: CellView>(patterns: &Patterns, cell: &C) -> String {
    beautify_conditions(patterns, &cell.text())
}

pub(crate) fn append_condition(patterns: &Patterns, row: &mut OutputRow, text: &str) {
    if text.trim().is_empty() {
        return;
    }
    row.condition = if row.condition.is_empty() {
        beautify_conditions(patterns, text)
    } else {
        beautify_conditions(patterns, &format!("{} {}", row.condition, text))
    };
}

/// Condition texts keyed by their number. When a number is described more
/// than once the longest text is kept.
pub fn collect_conditions(patterns: &Patterns, table: &OutputTable) -> BTreeMap<u64, String> {
    let mut conditions = BTreeMap::new();

    for row in table.rows() {
        let markers: Vec<_> = patterns
            .condition_marker
            .captures_iter(&row.condition).collect();
        for (index, captures) in markers.iter().enumerate() {
            let (Some(whole), Some(number)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            let Ok(number) = number.as_str().parse::<u64>() else {
                continue;
            };
            let end = markers
                .get(index + 1)
                .and_then(|next| next.get(0))
                .map_or(row.condition.len(), |next| next.start());
            let text = collapse_whitespace(&row.condition[whole.end()..end]);
            if text.is_empty() {
                continue;
            }

            let entry = conditions.entry(number).or_insert_with(String::new);
            if text.len() > entry.len() {
                *entry = text;
            }
        }
    }
    conditions
}
