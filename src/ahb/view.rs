use serde::Serialize;

/// Horizontal offset in twentieths of a point, as stored in WordprocessingML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Twips(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn from_hex(value: &str) -> Option<Self> {
        if value.len() != 6 || !value.is_ascii() {
            return None;
        }

        let red = u8::from_str_radix(&value[0..2], 16).ok()?;
        let green = u8::from_str_radix(&value[2..4], 16).ok()?;
        let blue = u8::from_str_radix(&value[4..6], 16).ok()?;
        Some(Self(red, green, blue))
    }
}

/// The paragraph properties the engine relies on. Formatting is direct
/// formatting only; inherited style values are invisible here.
pub trait ParagraphView {
    fn text(&self) -> &str;

    /// Bold flag of the first run, `false` when the paragraph has no runs.
    fn leading_run_bold(&self) -> bool;

    fn leading_run_color(&self) -> Option<Rgb>;

    fn left_indent(&self) -> Option<Twips>;

    fn tab_stops(&self) -> &[Twips];

    fn style_name(&self) -> Option<&str> {
        None
    }
}

pub trait CellView {
    type Paragraph: ParagraphView;

    fn paragraphs(&self) -> &[Self::Paragraph];

    fn text(&self) -> String {
        self.paragraphs()
            .iter()
            .map(ParagraphView::text)
            .collect::<Vec<&str>>()
            .join("\n")
    }

    /// Indent of the first paragraph; cell level decisions look at nothing else.
    fn leading_indent(&self) -> Option<Twips> {
        self.paragraphs()
            .first()
            .and_then(ParagraphView::left_indent)
    }
}

/// Rows expose logical cells: one per visible cell, never one per grid column
/// of a merged span.
pub trait TableView {
    type Cell: CellView;

    fn row_count(&self) -> usize;

    /// Cells of the row at `index`, empty when the index is out of range.
    fn row_cells(&self, index: usize) -> &[Self::Cell];
}

pub enum BlockRef<'a, P, T> {
    Paragraph(&'a P),
    Table(&'a T),
}

pub trait DocumentView {
    type Paragraph: ParagraphView;
    type Table: TableView;

    fn blocks(&self) -> Vec<BlockRef<'_, Self::Paragraph, Self::Table>>;
}
