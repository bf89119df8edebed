//! In-memory `.docx` archives for tests.

use std::io::{Cursor, Write};

pub(crate) const W: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

pub(crate) fn body(content: &str) -> String {
    format!(r#"<?xml version="1.0" encoding="UTF-8"?><w:document {W}><w:body>{content}</w:body></w:document>"#)
}

pub(crate) fn build_docx(parts: &[(&str, &str)]) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut buffer);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        for (name, content) in parts {
            writer.start_file(*name, options).expect("zip entry");
            writer.write_all(content.as_bytes()).expect("zip write");
        }
        writer.finish().expect("zip finish");
    }
    buffer.into_inner()
}

pub(crate) fn paragraph(text: &str, ppr: &str) -> String {
    let runs: Vec<String> = text
        .split('\t')
        .map(|part| format!(r#"<w:t xml:space="preserve">{part}</w:t>"#))
        .collect();
    format!("<w:p><w:pPr>{ppr}</w:pPr><w:r>{}</w:r></w:p>", runs.join("<w:tab/>"))
}

pub(crate) fn indented(text: &str, left: i64, stops: &[i64]) -> String {
    let tabs: String = stops
        .iter()
        .map(|pos| format!(r#"<w:tab w:val="left" w:pos="{pos}"/>"#))
        .collect();
    let tabs = if tabs.is_empty() {
        String::new()
    } else {
        format!("<w:tabs>{tabs}</w:tabs>")
    };
    paragraph(text, &format!(r#"{tabs}<w:ind w:left="{left}"/>"#))
}

pub(crate) fn row(cells: &[String]) -> String {
    let cells: String = cells.iter().map(|cell| format!("<w:tc>{cell}</w:tc>")).collect();
    format!("<w:tr>{cells}</w:tr>")
}

/// One message table with two variants (55001, 55002), framed by an
/// introduction paragraph and the change history heading.
pub(crate) fn sample_ahb_docx() -> Vec<u8> {
    let header = [
        paragraph("EDIFACT Struktur", ""),
        format!(
            "{}{}",
            indented("Beschreibung\tAnmeldung\tAbmeldung", 0, &[3088, 4064]),
            paragraph("Prüfidentifikator\t55001\t55002", "")
        ),
    ];
    let segment_name =
        r#"<w:p><w:r><w:rPr><w:color w:val="808080"/></w:rPr><w:t>Nachrichten-Kopfsegment</w:t></w:r></w:p>"#
            .to_string();
    let rows = [
        row(&header),
        row(&[segment_name, paragraph("", ""), paragraph("", "")]),
        row(&[indented("UNH", 64, &[]), indented("\tMuss\tMuss", 38, &[3088, 4064]), paragraph("", "")]),
        row(&[indented("UNH\tR0001", 64, &[]), indented("\tX\tX", 38, &[3088, 4064]), paragraph("", "")]),
        row(&[
            indented("UNH\t0062", 64, &[]),
            indented("\t\tX\tX", 38, &[693, 3088, 4064]),
            paragraph("", ""),
        ]),
        row(&[
            indented("SG2\tNAD\t3035", 581, &[]),
            format!(
                "{}{}",
                indented("MS\tAbsender\tX\tX", 38, &[693, 3088, 4064]),
                indented("MR\tEmpfänger\t\tX [1]", 38, &[693, 3088, 4064])
            ),
            paragraph("[1] Wenn vorhanden", ""),
        ]),
    ];
    let xml = body(&format!(
        "{}<w:tbl>{}</w:tbl>{}",
        paragraph("Einleitung", ""),
        rows.concat(),
        paragraph("Änderungshistorie", r#"<w:pStyle w:val="berschrift1"/>"#)
    ));
    let styles = format!(
        r#"<w:styles {W}><w:style w:type="paragraph" w:styleId="berschrift1"><w:name w:val="heading 1"/></w:style></w:styles>"#
    );
    build_docx(&[("word/document.xml", &xml), ("word/styles.xml", &styles)])
}
