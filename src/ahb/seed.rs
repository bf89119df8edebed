use serde::Serialize;

use super::error::ExtractError;
use super::memory::RowKindMemory;
use super::output::ValueColumn;
use super::row_kind::{SEPARATOR, logical_row};
use super::view::{CellView, ParagraphView, TableView, Twips};

pub const VARIANT_MARKER: &str = "Prüfidentifikator";

const DESCRIPTION_LABEL: &str = "Beschreibung";
const DIRECTION_LABEL: &str = "Kommunikation von";

/// The first body row below the header; its cells fix the reference
/// indentation for the whole variant group.
const REFERENCE_ROW: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantMeta {
    pub id: String,
    pub name: String,
    pub direction: String,
}

/// Layout parameters derived once from the header table of a variant group
/// and reused for every continuation table.
#[derive(Debug, Clone)]
pub struct TableMetadataSeed {
    variants: Vec<VariantMeta>,
    hierarchy_reference_indent: Option<Twips>,
    value_reference_indent: Option<Twips>,
    value_tab_stops: Vec<Twips>,
    row_kinds: RowKindMemory,
}

impl TableMetadataSeed {
    pub fn new(
        variant_ids: Vec<String>,
        hierarchy_reference_indent: Option<Twips>,
        value_reference_indent: Option<Twips>,
        value_tab_stops: Vec<Twips>,
    ) -> Self {
        let variants = variant_ids
            .into_iter()
            .map(|id| VariantMeta {
                id,
                name: String::new(),
                direction: String::new(),
            })
            .collect();

        Self {
            variants,
            hierarchy_reference_indent,
            value_reference_indent,
            value_tab_stops,
            row_kinds: RowKindMemory::new(),
        }
    }

    pub fn from_header_table<T: TableView>(table: &T) -> Result<Self, ExtractError> {
        let header_cells = table.row_cells(0);
        let Some(header_cell) = header_cells.last() else {
            return Err(ExtractError::malformed_header("table has no rows"));
        };

        let variant_ids = header_cell
            .paragraphs()
            .iter()
            .find_map(|paragraph| parse_variant_ids(paragraph.text()))
            .ok_or_else(|| {
                ExtractError::malformed_header(format!(
                    "header cell lists no variant ids after {VARIANT_MARKER:?}"
                ))
            })?;

        if table.row_count() <= REFERENCE_ROW {
            return Err(ExtractError::malformed_header(format!(
                "table has {} rows, reference row {REFERENCE_ROW} is missing",
                table.row_count()
            )));
        }
        let reference = logical_row(table.row_cells(REFERENCE_ROW), REFERENCE_ROW)?;
        let Some(value_cell) = reference.value else {
            return Err(ExtractError::malformed_header(
                "reference row has no value cell",
            ));
        };
        let Some(value_paragraph) = value_cell.paragraphs().first() else {
            return Err(ExtractError::malformed_header(
                "reference value cell has no paragraphs",
            ));
        };

        let mut seed = Self::new(
            variant_ids,
            reference.hierarchy.leading_indent(),
            value_paragraph.left_indent(),
            value_paragraph.tab_stops().to_vec(),
        );
        seed.read_variant_labels(header_cell);
        Ok(seed)
    }

    pub fn variants(&self) -> &[VariantMeta] {
        &self.variants
    }

    pub fn variant_ids(&self) -> Vec<String> {
        self.variants.iter().map(|variant| variant.id.clone()).collect()
    }

    pub fn variant_count(&self) -> usize {
        self.variants.len()
    }

    pub fn hierarchy_reference_indent(&self) -> Option<Twips> {
        self.hierarchy_reference_indent
    }

    pub fn value_reference_indent(&self) -> Option<Twips> {
        self.value_reference_indent
    }

    pub fn value_tab_stops(&self) -> &[Twips] {
        &self.value_tab_stops
    }

    pub fn row_kinds(&self) -> &RowKindMemory {
        &self.row_kinds
    }

    pub fn row_kinds_mut(&mut self) -> &mut RowKindMemory {
        &mut self.row_kinds
    }

    /// Maps a reference tab stop to its output column.
    ///
    /// With exactly one stop per variant the reference paragraph carries no
    /// description stop. Otherwise the first stop is the description and the
    /// next ones are the variants in header order; surplus stops map nowhere.
    pub fn value_column_at(&self, stop: Twips) -> Option<ValueColumn> {
        let position = self.value_tab_stops.iter().position(|&known| known == stop)?;
        let variants = self.variants.len();

        if self.value_tab_stops.len() == variants {
            return Some(ValueColumn::Variant(position));
        }
        match position {
            0 => Some(ValueColumn::Description),
            index if index <= variants => Some(ValueColumn::Variant(index - 1)),
            _ => None,
        }
    }

    /// Names and communication directions listed in the header cell below the
    /// variant ids. Each label opens a section whose tab stops place the
    /// following continuation lines.
    fn read_variant_labels<C: CellView>(&mut self, cell: &C) {
        let count = self.variants.len();
        let mut names = vec![Vec::<String>::new(); count];
        let mut directions = vec![Vec::<String>::new(); count];
        let mut section: Option<(Label, Vec<Twips>)> = None;

        for paragraph in cell.paragraphs() {
            let fields: Vec<&str> = paragraph.text().split(SEPARATOR).collect();
            let label = fields[0].trim();

            if label == VARIANT_MARKER {
                section = None;
                continue;
            }

            let opened = match label {
                DESCRIPTION_LABEL => Some(Label::Name),
                DIRECTION_LABEL => Some(Label::Direction),
                _ => None,
            };
            if let Some(kind) = opened {
                let target = kind.select(&mut names, &mut directions);
                for (index, field) in fields[1..].iter().take(count).enumerate() {
                    target[index].push(field.to_string());
                }
                section = Some((kind, paragraph.tab_stops().to_vec()));
                continue;
            }

            let Some((kind, section_stops)) = &section else {
                continue;
            };
            let target = kind.select(&mut names, &mut directions);
            let own_stops = paragraph.tab_stops();

            if own_stops.is_empty() {
                let mut fields = fields.as_slice();
                if fields.len() > count && fields[0].is_empty() {
                    fields = &fields[1..];
                }
                for (index, field) in fields.iter().take(count).enumerate() {
                    target[index].push(field.to_string());
                }
                continue;
            }

            for (stop, field) in own_stops.iter().zip(&fields[1..]) {
                if let Some(index) = section_stops.iter().position(|known| known == stop) {
                    if index < count {
                        target[index].push(field.to_string());
                    }
                }
            }
        }

        for (variant, (name, direction)) in self
            .variants
            .iter_mut()
            .zip(names.into_iter().zip(directions))
        {
            variant.name = collapse_whitespace(&name.join(" "));
            variant.direction = collapse_whitespace(&direction.join(" "));
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Label {
    Name,
    Direction,
}

impl Label {
    fn select<'a>(
        self,
        names: &'a mut [Vec<String>],
        directions: &'a mut [Vec<String>],
    ) -> &'a mut [Vec<String>] {
        match self {
            Self::Name => names,
            Self::Direction => directions,
        }
    }
}

/// Variant ids are the separator-delimited tokens after the marker, which
/// need not open the paragraph.
pub fn parse_variant_ids(paragraph: &str) -> Option<Vec<String>> {
    let (_, rest) = paragraph.split_once(VARIANT_MARKER)?;
    let ids: Vec<String> = rest
        .split(SEPARATOR)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect();

    if ids.is_empty() { None } else { Some(ids) }
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<&str>>().join(" ")
}
