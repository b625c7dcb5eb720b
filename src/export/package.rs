//! Assemble the OPC package: every part of the XLSX ZIP archive.

use std::fmt::Write as _;
use std::io::{Cursor, Write};

use chrono::SecondsFormat;
use zip::write::FileOptions;
use zip::ZipWriter;

use crate::error::Result;
use crate::types::{DocProperties, Workbook};

use super::sheet_writer::write_sheet_xml;
use super::style_table::StyleTable;
use super::xml_text;

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const APPLICATION: &str = concat!("npn-metadata ", env!("CARGO_PKG_VERSION"));

/// Serialize `workbook` into XLSX bytes.
pub(crate) fn write_package(workbook: &Workbook) -> Result<Vec<u8>> {
    let styles = StyleTable::for_workbook(workbook);
    let sheet_count = workbook.sheets.len();

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let mut add = |name: &str, body: &str| -> Result<()> {
        writer.start_file(name, options)?;
        writer.write_all(body.as_bytes())?;
        Ok(())
    };

    add("[Content_Types].xml", &content_types_xml(sheet_count))?;
    add("_rels/.rels", ROOT_RELS_XML)?;
    add("docProps/core.xml", &core_xml(&workbook.properties))?;
    add("docProps/app.xml", &app_xml(workbook))?;
    add("xl/workbook.xml", &workbook_xml(workbook))?;
    add("xl/_rels/workbook.xml.rels", &workbook_rels_xml(sheet_count))?;
    add("xl/styles.xml", &styles.to_xml())?;
    for (idx, sheet) in workbook.sheets.iter().enumerate() {
        let xml = write_sheet_xml(sheet, &styles, idx == workbook.active_sheet);
        add(&format!("xl/worksheets/sheet{}.xml", idx + 1), &xml)?;
    }

    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/></Relationships>"#;

fn content_types_xml(sheet_count: usize) -> String {
    let mut out = String::with_capacity(1024 + sheet_count * 160);
    out.push_str(XML_DECL);
    out.push('\n');
    out.push_str(concat!(
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
        r#"<Default Extension="xml" ContentType="application/xml"/>"#,
        r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
        r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
        r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#,
        r#"<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>"#,
    ));
    for n in 1..=sheet_count {
        let _ = write!(
            out,
            r#"<Override PartName="/xl/worksheets/sheet{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        );
    }
    out.push_str("</Types>");
    out
}

fn workbook_xml(workbook: &Workbook) -> String {
    let mut out = String::with_capacity(512 + workbook.sheets.len() * 64);
    out.push_str(XML_DECL);
    out.push('\n');
    out.push_str(concat!(
        r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
        r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
    ));
    let _ = write!(
        out,
        r#"<bookViews><workbookView activeTab="{}"/></bookViews><sheets>"#,
        workbook.active_sheet
    );
    for (idx, sheet) in workbook.sheets.iter().enumerate() {
        let n = idx + 1;
        let _ = write!(
            out,
            r#"<sheet name="{}" sheetId="{n}" r:id="rId{n}"/>"#,
            xml_text(&sheet.name)
        );
    }
    out.push_str("</sheets></workbook>");
    out
}

fn workbook_rels_xml(sheet_count: usize) -> String {
    let mut out = String::with_capacity(512 + sheet_count * 160);
    out.push_str(XML_DECL);
    out.push('\n');
    out.push_str(r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#);
    for n in 1..=sheet_count {
        let _ = write!(
            out,
            r#"<Relationship Id="rId{n}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{n}.xml"/>"#
        );
    }
    let _ = write!(
        out,
        r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
        sheet_count + 1
    );
    out.push_str("</Relationships>");
    out
}

fn core_xml(props: &DocProperties) -> String {
    let stamp = props.created.to_rfc3339_opts(SecondsFormat::Secs, true);
    let mut out = String::with_capacity(1024);
    out.push_str(XML_DECL);
    out.push('\n');
    out.push_str(concat!(
        r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
        r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
        r#"xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
    ));
    let _ = write!(out, "<dc:creator>{}</dc:creator>", xml_text(&props.creator));
    let _ = write!(
        out,
        "<cp:lastModifiedBy>{}</cp:lastModifiedBy>",
        xml_text(&props.last_modified_by)
    );
    let _ = write!(
        out,
        r#"<dcterms:created xsi:type="dcterms:W3CDTF">{stamp}</dcterms:created>"#
    );
    let _ = write!(
        out,
        r#"<dcterms:modified xsi:type="dcterms:W3CDTF">{stamp}</dcterms:modified>"#
    );
    let _ = write!(out, "<dc:title>{}</dc:title>", xml_text(&props.title));
    let _ = write!(out, "<dc:subject>{}</dc:subject>", xml_text(&props.subject));
    let _ = write!(
        out,
        "<dc:description>{}</dc:description>",
        xml_text(&props.description)
    );
    out.push_str("</cp:coreProperties>");
    out
}

fn app_xml(workbook: &Workbook) -> String {
    let mut out = String::with_capacity(512 + workbook.sheets.len() * 48);
    out.push_str(XML_DECL);
    out.push('\n');
    out.push_str(concat!(
        r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" "#,
        r#"xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">"#,
    ));
    let _ = write!(out, "<Application>{APPLICATION}</Application>");
    let _ = write!(
        out,
        r#"<TitlesOfParts><vt:vector size="{}" baseType="lpstr">"#,
        workbook.sheets.len()
    );
    for sheet in &workbook.sheets {
        let _ = write!(out, "<vt:lpstr>{}</vt:lpstr>", xml_text(&sheet.name));
    }
    out.push_str("</vt:vector></TitlesOfParts></Properties>");
    out
}
