use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use roxmltree::Node;
use zip::ZipArchive;

use super::{Block, Document, DocxError, Paragraph, Run, Table, TableCell, TableRow};
use crate::ahb::{Rgb, Twips};

const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const DOCUMENT_PART: &str = "word/document.xml";
const STYLES_PART: &str = "word/styles.xml";

/// Inline containers whose runs belong to the enclosing paragraph.
const RUN_CONTAINERS: [&str; 7] = [
    "hyperlink",
    "ins",
    "smartTag",
    "sdt",
    "sdtContent",
    "fldSimple",
    "customXml",
];

pub fn load_document(path: &Path) -> Result<Document, DocxError> {
    let file = File::open(path)?;
    read_document(file)
}

pub fn read_document<R: Read + Seek>(reader: R) -> Result<Document, DocxError> {
    let mut archive = ZipArchive::new(reader)?;

    let styles = match read_part(&mut archive, STYLES_PART)? {
        Some(xml) => parse_style_names(&xml)?,
        None => HashMap::new(),
    };
    let xml = read_part(&mut archive, DOCUMENT_PART)?.ok_or(DocxError::MissingPart(DOCUMENT_PART))?;

    parse_document_xml(&xml, &styles)
}

fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<String>, DocxError> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(error) => return Err(error.into()),
    };
    let mut content = String::new();
    entry.read_to_string(&mut content)?;
    Ok(Some(content))
}

fn is_wml(node: &Node, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name && node.tag_name().namespace() == Some(WML_NS)
}

fn wml<'a>(node: Node<'a, 'a>, name: &str) -> Option<Node<'a, 'a>> {
    node.children().find(|child| is_wml(child, name))
}

fn wml_attr<'a>(node: Node<'a, 'a>, attribute: &str) -> Option<&'a str> {
    node.attribute((WML_NS, attribute))
}

/// A WML toggle: present without `w:val`, or with anything but an off value.
fn wml_toggle(parent: Node, name: &str) -> Option<bool> {
    wml(parent, name).map(|node| {
        wml_attr(node, "val").is_none_or(|value| !matches!(value, "0" | "false" | "off"))
    })
}

fn twips_attr(node: Node, attribute: &str) -> Option<Twips> {
    wml_attr(node, attribute)
        .and_then(|value| value.parse::<i64>().ok())
        .map(Twips)
}

pub(super) fn parse_style_names(xml: &str) -> Result<HashMap<String, String>, DocxError> {
    let document = roxmltree::Document::parse(xml)?;
    let names = document
        .root_element()
        .children()
        .filter(|node| is_wml(node, "style"))
        .filter_map(|style| {
            let id = wml_attr(style, "styleId")?;
            let name = wml(style, "name").and_then(|name| wml_attr(name, "val"))?;
            Some((id.to_string(), name.to_string()))
        })
        .collect();
    Ok(names)
}

pub(super) fn parse_document_xml(
    xml: &str,
    styles: &HashMap<String, String>,
) -> Result<Document, DocxError> {
    let document = roxmltree::Document::parse(xml)?;
    let body = wml(document.root_element(), "body").ok_or(DocxError::MissingBody)?;

    let mut blocks = Vec::new();
    collect_blocks(body, styles, &mut blocks);
    Ok(Document { blocks })
}

fn collect_blocks(parent: Node, styles: &HashMap<String, String>, blocks: &mut Vec<Block>) {
    for node in parent.children().filter(Node::is_element) {
        if is_wml(&node, "p") {
            blocks.push(Block::Paragraph(parse_paragraph(node, styles)));
        } else if is_wml(&node, "tbl") {
            blocks.push(Block::Table(parse_table(node, styles)));
        } else if is_wml(&node, "sdt") {
            if let Some(content) = wml(node, "sdtContent") {
                collect_blocks(content, styles, blocks);
            }
        }
    }
}

fn parse_table(node: Node, styles: &HashMap<String, String>) -> Table {
    let rows = node
        .children()
        .filter(|child| is_wml(child, "tr"))
        .map(|row| TableRow {
            cells: row
                .children()
                .filter(|child| is_wml(child, "tc"))
                .map(|cell| parse_cell(cell, styles))
                .collect(),
        })
        .collect();
    Table { rows }
}

fn parse_cell(node: Node, styles: &HashMap<String, String>) -> TableCell {
    let mut paragraphs = Vec::new();
    collect_cell_paragraphs(node, styles, &mut paragraphs);
    TableCell { paragraphs }
}

// Nested tables are not part of the grid and are skipped.
fn collect_cell_paragraphs(
    node: Node,
    styles: &HashMap<String, String>,
    paragraphs: &mut Vec<Paragraph>,
) {
    for child in node.children().filter(Node::is_element) {
        if is_wml(&child, "p") {
            paragraphs.push(parse_paragraph(child, styles));
        } else if is_wml(&child, "sdt") || is_wml(&child, "sdtContent") {
            collect_cell_paragraphs(child, styles, paragraphs);
        }
    }
}

fn parse_paragraph(node: Node, styles: &HashMap<String, String>) -> Paragraph {
    let properties = wml(node, "pPr");

    let style_name = properties
        .and_then(|ppr| wml(ppr, "pStyle"))
        .and_then(|style| wml_attr(style, "val"))
        .map(|id| styles.get(id).cloned().unwrap_or_else(|| id.to_string()));

    let left_indent = properties
        .and_then(|ppr| wml(ppr, "ind"))
        .and_then(|ind| twips_attr(ind, "left").or_else(|| twips_attr(ind, "start")));

    let tab_stops = properties
        .and_then(|ppr| wml(ppr, "tabs"))
        .map(|tabs| {
            tabs.children()
                .filter(|tab| is_wml(tab, "tab"))
                .filter(|tab| wml_attr(*tab, "val") != Some("clear"))
                .filter_map(|tab| twips_attr(tab, "pos"))
                .collect()
        })
        .unwrap_or_default();

    let mut runs = Vec::new();
    collect_runs(node, &mut runs);
    let text = runs.iter().map(|run| run.text.as_str()).collect();

    Paragraph {
        style_name,
        text,
        runs,
        left_indent,
        tab_stops,
    }
}

fn collect_runs(node: Node, runs: &mut Vec<Run>) {
    for child in node.children().filter(Node::is_element) {
        if is_wml(&child, "r") {
            runs.push(parse_run(child));
        } else if child.tag_name().namespace() == Some(WML_NS)
            && RUN_CONTAINERS.contains(&child.tag_name().name())
        {
            collect_runs(child, runs);
        }
    }
}

fn parse_run(node: Node) -> Run {
    let properties = wml(node, "rPr");
    let bold = properties.and_then(|rpr| wml_toggle(rpr, "b"));
    let color = properties
        .and_then(|rpr| wml(rpr, "color"))
        .and_then(|color| wml_attr(color, "val"))
        .and_then(Rgb::from_hex);

    let mut text = String::new();
    for child in node.children().filter(Node::is_element) {
        if child.tag_name().namespace() != Some(WML_NS) {
            continue;
        }
        match child.tag_name().name() {
            "t" => text.push_str(child.text().unwrap_or_default()),
            "tab" => text.push('\t'),
            "br" | "cr" => text.push('\n'),
            "noBreakHyphen" => text.push('-'),
            _ => {}
        }
    }

    Run { text, bold, color }
}
