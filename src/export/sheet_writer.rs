//! Generates worksheet XML from a `Sheet` struct.
//!
//! Strings are written inline (`t="inlineStr"`) so no shared string table
//! has to be built.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use crate::cell_ref::{cell_ref, col_to_letter};
use crate::types::{Cell, CellValue, Sheet};

use super::style_table::StyleTable;
use super::xml_text;

/// Write a complete worksheet XML string from a `Sheet`.
pub(crate) fn write_sheet_xml(sheet: &Sheet, styles: &StyleTable, selected: bool) -> String {
    let mut out = String::with_capacity(4096 + sheet.cells.len() * 64);
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    out.push('\n');
    out.push_str(
        r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
    );
    out.push_str(
        r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
    );
    out.push('\n');

    // <dimension>
    let (rows, cols) = sheet.extent();
    if rows > 0 && cols > 0 {
        let _ = writeln!(
            out,
            r#"<dimension ref="A1:{}"/>"#,
            cell_ref(rows - 1, cols - 1)
        );
    } else {
        out.push_str("<dimension ref=\"A1\"/>\n");
    }

    write_sheet_views(&mut out, sheet, selected);

    out.push_str("<sheetFormatPr defaultRowHeight=\"15\"/>\n");

    // <cols>
    if !sheet.col_widths.is_empty() {
        out.push_str("<cols>");
        for cw in &sheet.col_widths {
            let col1 = u64::from(cw.col) + 1; // XLSX is 1-based
            let _ = write!(
                out,
                r#"<col min="{col1}" max="{col1}" width="{}" customWidth="1"/>"#,
                cw.width
            );
        }
        out.push_str("</cols>\n");
    }

    // <sheetData>
    out.push_str("<sheetData>");
    write_sheet_data(&mut out, sheet, styles);
    out.push_str("</sheetData>\n");

    out.push_str(
        r#"<pageMargins left="0.7" right="0.7" top="0.75" bottom="0.75" header="0.3" footer="0.3"/>"#,
    );
    out.push('\n');
    out.push_str("</worksheet>");
    out
}

/// `<sheetViews>` with the frozen pane, if any.
fn write_sheet_views(out: &mut String, sheet: &Sheet, selected: bool) {
    let tab_selected = if selected { r#" tabSelected="1""# } else { "" };
    let _ = write!(
        out,
        r#"<sheetViews><sheetView{tab_selected} workbookViewId="0">"#
    );

    if sheet.frozen_rows > 0 || sheet.frozen_cols > 0 {
        let top_left = format!(
            "{}{}",
            col_to_letter(sheet.frozen_cols),
            u64::from(sheet.frozen_rows) + 1
        );
        let active_pane = match (sheet.frozen_rows > 0, sheet.frozen_cols > 0) {
            (true, true) => "bottomRight",
            (true, false) => "bottomLeft",
            _ => "topRight",
        };
        out.push_str("<pane");
        if sheet.frozen_cols > 0 {
            let _ = write!(out, r#" xSplit="{}""#, sheet.frozen_cols);
        }
        if sheet.frozen_rows > 0 {
            let _ = write!(out, r#" ySplit="{}""#, sheet.frozen_rows);
        }
        let _ = write!(
            out,
            r#" topLeftCell="{top_left}" activePane="{active_pane}" state="frozen"/>"#
        );
        let _ = write!(
            out,
            r#"<selection pane="{active_pane}" activeCell="{top_left}" sqref="{top_left}"/>"#
        );
    }

    out.push_str("</sheetView></sheetViews>\n");
}

/// Write every row that has cells, a custom height or a row style.
fn write_sheet_data(out: &mut String, sheet: &Sheet, styles: &StyleTable) {
    let rows: BTreeSet<u32> = sheet
        .cells
        .iter()
        .map(|cd| cd.r)
        .chain(sheet.row_heights.iter().map(|rh| rh.row))
        .chain(sheet.row_styles.iter().map(|rs| rs.row))
        .collect();

    for row in rows {
        let row_style = sheet.row_style(row);
        let _ = write!(out, r#"<row r="{}""#, u64::from(row) + 1);
        if let Some(style) = row_style {
            let _ = write!(
                out,
                r#" s="{}" customFormat="1""#,
                styles.index_of(Some(style))
            );
        }
        if let Some(ht) = sheet.row_height(row) {
            let _ = write!(out, r#" ht="{ht}" customHeight="1""#);
        }
        out.push('>');

        for cd in sheet.cells.iter().filter(|cd| cd.r == row) {
            let style_idx = styles.index_of(sheet.effective_style(cd.r, cd.c));
            write_cell(out, cd.r, cd.c, &cd.cell, style_idx);
        }

        out.push_str("</row>");
    }
}

/// Write a single `<c>` element.
fn write_cell(out: &mut String, row: u32, col: u32, cell: &Cell, style_idx: usize) {
    let _ = write!(out, r#"<c r="{}""#, cell_ref(row, col));
    if style_idx != 0 {
        let _ = write!(out, r#" s="{style_idx}""#);
    }

    match &cell.value {
        CellValue::String(s) => {
            out.push_str(r#" t="inlineStr"><is><t"#);
            if s.starts_with(char::is_whitespace) || s.ends_with(char::is_whitespace) {
                out.push_str(r#" xml:space="preserve""#);
            }
            out.push('>');
            out.push_str(&xml_text(s));
            out.push_str("</t></is>");
        }
        CellValue::Integer(n) => {
            let _ = write!(out, "><v>{n}</v>");
        }
        CellValue::Number(n) if n.is_finite() => {
            let _ = write!(out, "><v>{n}</v>");
        }
        CellValue::Number(_) => out.push_str(r#" t="e"><v>#NUM!</v>"#),
    }

    out.push_str("</c>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{data_row_style, header_style};
    use crate::types::{DocProperties, Workbook};

    fn sample() -> Workbook {
        let mut wb = Workbook::new(DocProperties::authored_by("a"));
        if let Some(sheet) = wb.sheet_mut(0) {
            sheet.set_value(0, 0, "Sequence #");
            sheet.set_cell_style(0, 0, header_style());
            sheet.set_row_height(0, 31.5);
            sheet.set_value(1, 0, 1_i64);
            sheet.set_value(1, 1, "a < b & \"c\"");
            sheet.set_value(1, 2, " padded ");
            sheet.set_row_style(1, data_row_style());
            sheet.set_col_width(2, 64.38);
            sheet.freeze_panes(1, 0);
        }
        wb
    }

    fn xml_of(wb: &Workbook) -> String {
        let styles = StyleTable::for_workbook(wb);
        wb.sheet(0)
            .map(|s| write_sheet_xml(s, &styles, true))
            .unwrap_or_default()
    }

    #[test]
    fn writes_dimension_and_frozen_pane() {
        let xml = xml_of(&sample());
        assert!(xml.contains(r#"<dimension ref="A1:C2"/>"#));
        assert!(xml.contains(
            r#"<pane ySplit="1" topLeftCell="A2" activePane="bottomLeft" state="frozen"/>"#
        ));
        assert!(xml.contains(r#"tabSelected="1""#));
    }

    #[test]
    fn writes_cells_with_escaping_and_styles() {
        let xml = xml_of(&sample());
        assert!(xml.contains(r#"<c r="A1" s="1" t="inlineStr"><is><t>Sequence #</t></is></c>"#));
        assert!(xml.contains(r#"<c r="A2" s="2"><v>1</v></c>"#));
        assert!(xml.contains("a &lt; b &amp; &quot;c&quot;"));
        assert!(xml.contains(r#"<t xml:space="preserve"> padded </t>"#));
    }

    #[test]
    fn writes_row_and_column_dimensions() {
        let xml = xml_of(&sample());
        assert!(xml.contains(r#"<row r="1" ht="31.5" customHeight="1">"#));
        assert!(xml.contains(r#"<row r="2" s="2" customFormat="1">"#));
        assert!(xml.contains(r#"<col min="3" max="3" width="64.38" customWidth="1"/>"#));
    }

    #[test]
    fn empty_sheet_has_no_pane() {
        let wb = Workbook::new(DocProperties::authored_by("a"));
        let styles = StyleTable::for_workbook(&wb);
        let xml = wb
            .sheet(0)
            .map(|s| write_sheet_xml(s, &styles, false))
            .unwrap_or_default();
        assert!(xml.contains(r#"<dimension ref="A1"/>"#));
        assert!(xml.contains("<sheetData></sheetData>"));
        assert!(!xml.contains("<pane"));
        assert!(!xml.contains("tabSelected"));
    }
}
