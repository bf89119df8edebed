use super::patterns::Patterns;
use super::view::{BlockRef, CellView, DocumentView, ParagraphView, Rgb, TableView, Twips};

#[derive(Debug, Clone, Default)]
pub struct FakeParagraph {
    pub text: String,
    pub bold: bool,
    pub color: Option<Rgb>,
    pub indent: Option<Twips>,
    pub stops: Vec<Twips>,
    pub style: Option<String>,
}

impl FakeParagraph {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Self::default()
        }
    }

    pub fn indent(mut self, twips: i64) -> Self {
        self.indent = Some(Twips(twips));
        self
    }

    pub fn stops(mut self, stops: &[i64]) -> Self {
        self.stops = stops.iter().copied().map(Twips).collect();
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn gray(mut self) -> Self {
        self.color = Some(Rgb(0x80, 0x80, 0x80));
        self
    }

    pub fn style(mut self, style: &str) -> Self {
        self.style = Some(style.to_string());
        self
    }
}

impl ParagraphView for FakeParagraph {
    fn text(&self) -> &str {
        &self.text
    }

    fn leading_run_bold(&self) -> bool {
        self.bold
    }

    fn leading_run_color(&self) -> Option<Rgb> {
        self.color
    }

    fn left_indent(&self) -> Option<Twips> {
        self.indent
    }

    fn tab_stops(&self) -> &[Twips] {
        &self.stops
    }

    fn style_name(&self) -> Option<&str> {
        self.style.as_deref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeCell {
    pub paragraphs: Vec<FakeParagraph>,
}

impl FakeCell {
    pub fn new(paragraphs: Vec<FakeParagraph>) -> Self {
        Self { paragraphs }
    }

    pub fn line(text: &str) -> Self {
        Self::new(vec![FakeParagraph::new(text)])
    }

    pub fn empty() -> Self {
        Self::line("")
    }
}

impl CellView for FakeCell {
    type Paragraph = FakeParagraph;

    fn paragraphs(&self) -> &[FakeParagraph] {
        &self.paragraphs
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeTable {
    pub rows: Vec<Vec<FakeCell>>,
}

impl FakeTable {
    pub fn new(rows: Vec<Vec<FakeCell>>) -> Self {
        Self { rows }
    }
}

impl TableView for FakeTable {
    type Cell = FakeCell;

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn row_cells(&self, index: usize) -> &[FakeCell] {
        self.rows.get(index).map(Vec::as_slice).unwrap_or_default()
    }
}

pub enum FakeBlock {
    Paragraph(FakeParagraph),
    Table(FakeTable),
}

#[derive(Default)]
pub struct FakeDocument {
    pub blocks: Vec<FakeBlock>,
}

impl DocumentView for FakeDocument {
    type Paragraph = FakeParagraph;
    type Table = FakeTable;

    fn blocks(&self) -> Vec<BlockRef<'_, FakeParagraph, FakeTable>> {
        self.blocks
            .iter()
            .map(|block| match block {
                FakeBlock::Paragraph(paragraph) => BlockRef::Paragraph(paragraph),
                FakeBlock::Table(table) => BlockRef::Table(table),
            })
            .collect()
    }
}

pub const HIERARCHY_INDENT: i64 = 64;
pub const NESTED_INDENT: i64 = 581;
pub const CODE_INDENT: i64 = 38;
pub const VALUE_STOPS: [i64; 4] = [693, 3088, 4064, 5026];

pub fn patterns() -> Patterns {
    Patterns::compile().expect("patterns")
}

pub fn hierarchy(text: &str) -> FakeCell {
    FakeCell::new(vec![FakeParagraph::new(text).indent(HIERARCHY_INDENT)])
}

pub fn nested_hierarchy(text: &str) -> FakeCell {
    FakeCell::new(vec![FakeParagraph::new(text).indent(NESTED_INDENT)])
}

pub fn code_line(text: &str) -> FakeParagraph {
    FakeParagraph::new(text)
        .indent(CODE_INDENT)
        .stops(&VALUE_STOPS)
}

/// A paragraph carrying the same mark in all three variant columns.
pub fn marks(mark: &str) -> FakeParagraph {
    FakeParagraph::new(&format!("\t{mark}\t{mark}\t{mark}"))
        .indent(CODE_INDENT)
        .stops(&VALUE_STOPS[1..])
}

/// A header table for variants 11016, 11017 and 11018 whose reference row is
/// the `UNH 0062` data element.
pub fn header_table(body: Vec<Vec<FakeCell>>) -> FakeTable {
    let header = FakeCell::new(vec![
        FakeParagraph::new("Beschreibung\tLieferbeginn\tLieferende\tKündigung").stops(&[3088, 4064, 5026]),
        FakeParagraph::new("Kommunikation von\tNB an LF\tLF an NB\tNB an LF").stops(&[3088, 4064, 5026]),
        FakeParagraph::new("Prüfidentifikator\t11016\t11017\t11018"),
    ]);
    let mut rows = vec![
        vec![FakeCell::line("EDIFACT Struktur"), header],
        vec![
            FakeCell::new(vec![FakeParagraph::new("Nachrichten-Kopfsegment").gray()]),
            FakeCell::empty(),
            FakeCell::empty(),
        ],
        vec![hierarchy("UNH"), FakeCell::new(vec![marks("Muss")]), FakeCell::empty()],
        vec![hierarchy("UNH\tR0003"), FakeCell::new(vec![marks("X")]), FakeCell::empty()],
        vec![
            hierarchy("UNH\t0062"),
            FakeCell::new(vec![code_line("\t\tX\tX\tX")]),
            FakeCell::empty(),
        ],
    ];
    rows.extend(body);
    FakeTable::new(rows)
}
