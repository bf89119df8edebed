//! A minimal WordprocessingML reader: body paragraphs and tables with the
//! direct formatting the AHB engine looks at.

mod reader;

#[cfg(test)]
pub(crate) mod fixtures;
#[cfg(test)]
mod tests;

use thiserror::Error;

use crate::ahb::{BlockRef, CellView, DocumentView, ParagraphView, Rgb, TableView, Twips};

pub use reader::{load_document, read_document};

#[derive(Error, Debug)]
pub enum DocxError {
    #[error("failed to read docx: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid docx archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("invalid docx xml: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("docx archive has no {0}")]
    MissingPart(&'static str),

    #[error("document.xml has no body")]
    MissingBody,
}

#[derive(Debug, Clone, Default)]
pub struct Document {
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
}

#[derive(Debug, Clone, Default)]
pub struct Paragraph {
    pub style_name: Option<String>,
    pub text: String,
    pub runs: Vec<Run>,
    pub left_indent: Option<Twips>,
    pub tab_stops: Vec<Twips>,
}

#[derive(Debug, Clone, Default)]
pub struct Run {
    pub text: String,
    pub bold: Option<bool>,
    pub color: Option<Rgb>,
}

#[derive(Debug, Clone, Default)]
pub struct Table {
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, Default)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, Default)]
pub struct TableCell {
    pub paragraphs: Vec<Paragraph>,
}

impl ParagraphView for Paragraph {
    fn text(&self) -> &str {
        &self.text
    }

    fn leading_run_bold(&self) -> bool {
        self.runs.first().and_then(|run| run.bold).unwrap_or(false)
    }

    fn leading_run_color(&self) -> Option<Rgb> {
        self.runs.first().and_then(|run| run.color)
    }

    fn left_indent(&self) -> Option<Twips> {
        self.left_indent
    }

    fn tab_stops(&self) -> &[Twips] {
        &self.tab_stops
    }

    fn style_name(&self) -> Option<&str> {
        self.style_name.as_deref()
    }
}

impl CellView for TableCell {
    type Paragraph = Paragraph;

    fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }
}

impl TableView for Table {
    type Cell = TableCell;

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn row_cells(&self, index: usize) -> &[TableCell] {
        self.rows
            .get(index)
            .map(|row| row.cells.as_slice())
            .unwrap_or_default()
    }
}

impl DocumentView for Document {
    type Paragraph = Paragraph;
    type Table = Table;

    fn blocks(&self) -> Vec<BlockRef<'_, Paragraph, Table>> {
        self.blocks
            .iter()
            .map(|block| match block {
                Block::Paragraph(paragraph) => BlockRef::Paragraph(paragraph),
                Block::Table(table) => BlockRef::Table(table),
            })
            .collect()
    }
}
