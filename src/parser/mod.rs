//! Read an XLSX package back into a [`Workbook`].
//!
//! Covers what the exporter writes: sheet order and names, the active tab,
//! inline-string and numeric cells, cell and row styles, column widths, row
//! heights, frozen panes and core document properties. Shared-string cells
//! from other producers are reported as a parse error.

mod package;
mod styles;
mod worksheet;

use quick_xml::events::BytesStart;
use std::io::Cursor;
use zip::ZipArchive;

use crate::error::Result;
use crate::types::{CellStyle, Workbook};

use package::{parse_core_properties, parse_workbook_part, parse_workbook_rels};
use styles::parse_styles;
use worksheet::parse_sheet;

/// Parse an XLSX file from bytes.
pub fn parse(data: &[u8]) -> Result<Workbook> {
    let mut archive = ZipArchive::new(Cursor::new(data))?;

    let rels = parse_workbook_rels(&mut archive)?;
    let book = parse_workbook_part(&mut archive, &rels)?;
    let xfs = parse_styles(&mut archive)?;
    let properties = parse_core_properties(&mut archive)?;

    let mut sheets = Vec::with_capacity(book.sheets.len());
    for entry in &book.sheets {
        sheets.push(parse_sheet(&mut archive, &entry.name, &entry.path, &xfs)?);
    }

    let default_style = xfs.first().copied().unwrap_or_default();
    let active_sheet = book.active_tab.min(sheets.len().saturating_sub(1));

    Ok(Workbook {
        properties,
        sheets,
        active_sheet,
        default_style,
    })
}

/// Unescaped value of the attribute whose local name is `key`.
fn attr(e: &BytesStart, key: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn attr_parsed<T: std::str::FromStr>(e: &BytesStart, key: &[u8]) -> Result<Option<T>> {
    Ok(attr(e, key)?.and_then(|v| v.trim().parse().ok()))
}

fn attr_flag(e: &BytesStart, key: &[u8]) -> Result<bool> {
    Ok(attr(e, key)?.is_some_and(|v| matches!(v.as_str(), "1" | "true")))
}

/// Style for a `s="N"` attribute; index 0 means "no explicit style".
fn style_at(xfs: &[CellStyle], idx: Option<usize>) -> Option<CellStyle> {
    match idx {
        Some(0) | None => None,
        Some(n) => xfs.get(n).copied(),
    }
}
