use std::collections::HashMap;
use std::io::Cursor;

use super::fixtures::*;
use super::reader::{parse_document_xml, parse_style_names};
use super::*;
use crate::ahb::extract_groups;

#[test]
fn reads_direct_paragraph_formatting() {
    let xml = body(&format!(
        r#"<w:p><w:pPr><w:pStyle w:val="berschrift1"/><w:tabs><w:tab w:val="left" w:pos="693"/><w:tab w:val="clear" w:pos="900"/><w:tab w:val="left" w:pos="3088"/></w:tabs><w:ind w:start="38"/></w:pPr><w:r><w:rPr><w:b/><w:color w:val="808080"/></w:rPr><w:t>Nachrichten-</w:t><w:noBreakHyphen/><w:t>Kopf</w:t></w:r><w:hyperlink><w:r><w:rPr><w:b w:val="0"/></w:rPr><w:tab/><w:t xml:space="preserve">segment </w:t><w:br/></w:r></w:hyperlink><w:del><w:r><w:delText>alt</w:delText></w:r></w:del></w:p>{}"#,
        paragraph("plain", "")
    ));
    let styles = HashMap::from([("berschrift1".to_string(), "heading 1".to_string())]);

    let document = parse_document_xml(&xml, &styles).expect("document");
    assert_eq!(document.blocks.len(), 2);

    let Block::Paragraph(first) = &document.blocks[0] else {
        panic!("expected a paragraph");
    };
    assert_eq!(first.text, "Nachrichten--Kopf\tsegment \n");
    assert_eq!(first.style_name.as_deref(), Some("heading 1"));
    assert_eq!(first.left_indent, Some(Twips(38)));
    assert_eq!(first.tab_stops, vec![Twips(693), Twips(3088)]);
    assert_eq!(first.runs.len(), 2);
    assert!(first.leading_run_bold());
    assert_eq!(first.leading_run_color(), Some(Rgb(0x80, 0x80, 0x80)));
    assert_eq!(first.runs[1].bold, Some(false));

    let Block::Paragraph(second) = &document.blocks[1] else {
        panic!("expected a paragraph");
    };
    assert_eq!(second.left_indent, None);
    assert!(second.tab_stops.is_empty());
    assert!(!second.leading_run_bold());
    assert_eq!(second.style_name, None);
}

#[test]
fn reads_tables_cell_by_cell() {
    let xml = body(&format!(
        "<w:tbl><w:tblPr/>{}{}</w:tbl>",
        row(&[paragraph("EDIFACT Struktur", ""), format!("{}{}", paragraph("a", ""), paragraph("b", ""))]),
        row(&[String::new(), paragraph("c", "")]),
    ));

    let document = parse_document_xml(&xml, &HashMap::new()).expect("document");
    let Some(Block::Table(table)) = document.blocks.first() else {
        panic!("expected a table block");
    };

    assert_eq!(table.row_count(), 2);
    assert_eq!(table.row_cells(0)[0].text(), "EDIFACT Struktur");
    assert_eq!(table.row_cells(0)[1].text(), "a\nb");
    assert!(table.row_cells(1)[0].paragraphs.is_empty());
    assert!(table.row_cells(5).is_empty());
}

#[test]
fn reads_style_names() {
    let xml = format!(
        r#"<w:styles {W}><w:style w:type="paragraph" w:styleId="berschrift1"><w:name w:val="heading 1"/></w:style><w:style w:type="paragraph" w:styleId="Standard"/></w:styles>"#
    );
    let names = parse_style_names(&xml).expect("styles");

    assert_eq!(names.get("berschrift1").map(String::as_str), Some("heading 1"));
    assert_eq!(names.len(), 1);
}

#[test]
fn missing_document_part_is_an_error() {
    let bytes = build_docx(&[("word/settings.xml", "<settings/>")]);
    let error = read_document(Cursor::new(bytes)).expect_err("no document part");
    assert!(matches!(error, DocxError::MissingPart("word/document.xml")));

    let error = read_document(Cursor::new(b"not a zip".to_vec())).expect_err("not a zip");
    assert!(matches!(error, DocxError::Zip(_)));
}

#[test]
fn extracts_a_variant_group_from_a_docx_archive() {
    let document = read_document(Cursor::new(sample_ahb_docx())).expect("docx");
    let extraction = extract_groups(&document).expect("groups");

    assert!(extraction.reached_change_history);
    assert_eq!(extraction.groups.len(), 1);
    let group = &extraction.groups[0];
    assert_eq!(group.variants[0].name, "Anmeldung");
    assert_eq!(group.variants[1].id, "55002");

    let rows = group.table.rows();
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[0].group, "Nachrichten-Kopfsegment");
    assert_eq!(rows[2].segment_id.as_deref(), Some("R0001"));
    assert_eq!(rows[4].value_code, "MS");
    assert_eq!(rows[4].expressions, ["X", "X"]);
    assert_eq!(rows[5].value_code, "MR");
    assert_eq!(rows[5].group, "SG2");
    assert_eq!(rows[5].expressions, ["", "X [1]"]);
    assert_eq!(rows[5].condition, "[1] Wenn vorhanden");
}
