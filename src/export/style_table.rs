//! Collects the distinct cell styles of a workbook into `cellXfs`.
//!
//! `cellXfs[0]` is the workbook default. Every other style is layered over
//! the default before interning, so the written index fully describes the
//! cell's look.

use std::fmt::Write as _;

use crate::types::{CellStyle, Workbook};

/// Fonts written to `styles.xml`: the body font and the header font.
const REGULAR_FONT: usize = 0;
const BOLD_FONT: usize = 1;

pub(crate) struct StyleTable {
    default: CellStyle,
    xfs: Vec<CellStyle>,
}

impl StyleTable {
    /// Intern every style used by `workbook`.
    pub(crate) fn for_workbook(workbook: &Workbook) -> Self {
        let mut table = Self {
            default: workbook.default_style,
            xfs: vec![workbook.default_style],
        };
        for sheet in &workbook.sheets {
            for cd in &sheet.cells {
                if let Some(style) = cd.cell.style {
                    table.intern(style);
                }
            }
            for rs in &sheet.row_styles {
                table.intern(rs.style);
            }
        }
        table
    }

    /// Index of `style` (layered over the default), adding it if new.
    pub(crate) fn intern(&mut self, style: CellStyle) -> usize {
        let resolved = style.over(self.default);
        if let Some(idx) = self.xfs.iter().position(|s| *s == resolved) {
            return idx;
        }
        self.xfs.push(resolved);
        self.xfs.len() - 1
    }

    /// Index of an already interned style; falls back to the default.
    pub(crate) fn index_of(&self, style: Option<CellStyle>) -> usize {
        style
            .map(|s| s.over(self.default))
            .and_then(|resolved| self.xfs.iter().position(|s| *s == resolved))
            .unwrap_or(0)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.xfs.len()
    }

    /// Render `xl/styles.xml`.
    pub(crate) fn to_xml(&self) -> String {
        let mut out = String::with_capacity(1024);
        out.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        out.push('\n');
        out.push_str(
            r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );
        out.push_str(concat!(
            r#"<fonts count="2">"#,
            r#"<font><sz val="11"/><color theme="1"/><name val="Calibri"/><family val="2"/><scheme val="minor"/></font>"#,
            r#"<font><b/><sz val="12"/><color rgb="FF000000"/><name val="Calibri"/><family val="2"/></font>"#,
            r#"</fonts>"#,
            r#"<fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>"#,
            r#"<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>"#,
            r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#,
        ));

        let _ = write!(out, r#"<cellXfs count="{}">"#, self.xfs.len());
        for style in &self.xfs {
            write_xf(&mut out, style);
        }
        out.push_str("</cellXfs>");

        out.push_str(concat!(
            r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#,
            r#"<dxfs count="0"/><tableStyles count="0" defaultTableStyle="TableStyleMedium2" defaultPivotStyle="PivotStyleLight16"/>"#,
            "</styleSheet>"
        ));
        out
    }
}

fn write_xf(out: &mut String, style: &CellStyle) {
    let font = if style.bold { BOLD_FONT } else { REGULAR_FONT };
    let _ = write!(
        out,
        r#"<xf numFmtId="0" fontId="{font}" fillId="0" borderId="0" xfId="0""#
    );
    if style.bold {
        out.push_str(r#" applyFont="1""#);
    }
    if !style.has_alignment() {
        out.push_str("/>");
        return;
    }

    out.push_str(r#" applyAlignment="1"><alignment"#);
    if let Some(h) = style.horizontal {
        let _ = write!(out, r#" horizontal="{}""#, h.as_xml());
    }
    if let Some(v) = style.vertical {
        let _ = write!(out, r#" vertical="{}""#, v.as_xml());
    }
    if style.wrap_text {
        out.push_str(r#" wrapText="1""#);
    }
    out.push_str("/></xf>");
}
