//! Worksheet parsing - reads one sheet part into a `Sheet`.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::{BufReader, Read, Seek};
use zip::ZipArchive;

use crate::cell_ref::parse_cell_ref;
use crate::error::{MetadataError, Result};
use crate::types::{Cell, CellData, CellStyle, CellValue, Sheet};

use super::{attr, attr_flag, attr_parsed, style_at};

/// Cell type tag from the `t` attribute of a `<c>` element.
#[derive(Copy, Clone, Debug, PartialEq)]
enum CellTypeTag {
    Shared,
    Inline,
    Str,
    Bool,
    Error,
    Number,
}

fn parse_cell_type_tag(value: Option<&str>) -> CellTypeTag {
    match value {
        Some("s") => CellTypeTag::Shared,
        Some("inlineStr") => CellTypeTag::Inline,
        Some("str") => CellTypeTag::Str,
        Some("b") => CellTypeTag::Bool,
        Some("e") => CellTypeTag::Error,
        _ => CellTypeTag::Number,
    }
}

struct PendingCell {
    row: u32,
    col: u32,
    tag: CellTypeTag,
    style: Option<CellStyle>,
    text: String,
}

impl PendingCell {
    fn start(e: &BytesStart, xfs: &[CellStyle]) -> Result<Self> {
        let reference = attr(e, b"r")?
            .ok_or_else(|| MetadataError::Parse("<c> without r attribute".into()))?;
        let (col, row) = parse_cell_ref(&reference)
            .ok_or_else(|| MetadataError::Parse(format!("bad cell reference {reference:?}")))?;
        Ok(Self {
            row,
            col,
            tag: parse_cell_type_tag(attr(e, b"t")?.as_deref()),
            style: style_at(xfs, attr_parsed(e, b"s")?),
            text: String::new(),
        })
    }

    fn finish(self) -> Result<CellData> {
        let value = match self.tag {
            CellTypeTag::Inline | CellTypeTag::Str | CellTypeTag::Error => {
                CellValue::String(self.text)
            }
            CellTypeTag::Bool => CellValue::Integer(i64::from(self.text.trim() == "1")),
            CellTypeTag::Number => parse_number(&self.text)?,
            CellTypeTag::Shared => {
                return Err(MetadataError::Parse(
                    "shared string cells are not supported".into(),
                ))
            }
        };
        Ok(CellData {
            r: self.row,
            c: self.col,
            cell: Cell {
                value,
                style: self.style,
            },
        })
    }
}

fn parse_number(text: &str) -> Result<CellValue> {
    let text = text.trim();
    if let Ok(n) = text.parse::<i64>() {
        return Ok(CellValue::Integer(n));
    }
    text.parse::<f64>()
        .map(CellValue::Number)
        .map_err(|_| MetadataError::Parse(format!("bad numeric cell value {text:?}")))
}

/// Parse a single worksheet
pub(super) fn parse_sheet<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
    path: &str,
    xfs: &[CellStyle],
) -> Result<Sheet> {
    let file = archive.by_name(path)?;
    let mut xml = Reader::from_reader(BufReader::new(file));
    // Keep whitespace: it is significant inside <t>.
    xml.trim_text(false);

    let mut sheet = Sheet::new(name);
    let mut pending: Option<PendingCell> = None;
    let mut in_value = false;

    let mut buf = Vec::new();
    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"c" => pending = Some(PendingCell::start(e, xfs)?),
                b"v" | b"t" if pending.is_some() => in_value = true,
                b"row" => read_row(&mut sheet, e, xfs)?,
                b"col" => read_col(&mut sheet, e)?,
                b"pane" => read_pane(&mut sheet, e)?,
                _ => {}
            },
            Event::Empty(ref e) => match e.local_name().as_ref() {
                b"row" => read_row(&mut sheet, e, xfs)?,
                b"col" => read_col(&mut sheet, e)?,
                b"pane" => read_pane(&mut sheet, e)?,
                _ => {}
            },
            Event::Text(ref t) if in_value => {
                if let Some(cell) = pending.as_mut() {
                    cell.text.push_str(&t.unescape()?);
                }
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"v" | b"t" => in_value = false,
                b"c" => {
                    if let Some(cell) = pending.take() {
                        let cd = cell.finish()?;
                        sheet.set_value(cd.r, cd.c, cd.cell.value);
                        if let Some(style) = cd.cell.style {
                            sheet.set_cell_style(cd.r, cd.c, style);
                        }
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(sheet)
}

fn read_row(sheet: &mut Sheet, e: &BytesStart, xfs: &[CellStyle]) -> Result<()> {
    let Some(r) = attr_parsed::<u32>(e, b"r")?.filter(|&r| r > 0) else {
        return Ok(());
    };
    let row = r - 1;
    if attr_flag(e, b"customHeight")? {
        if let Some(ht) = attr_parsed::<f64>(e, b"ht")? {
            sheet.set_row_height(row, ht);
        }
    }
    if attr_flag(e, b"customFormat")? {
        if let Some(style) = style_at(xfs, attr_parsed(e, b"s")?) {
            sheet.set_row_style(row, style);
        }
    }
    Ok(())
}

fn read_col(sheet: &mut Sheet, e: &BytesStart) -> Result<()> {
    let (Some(min), Some(max), Some(width)) = (
        attr_parsed::<u32>(e, b"min")?,
        attr_parsed::<u32>(e, b"max")?,
        attr_parsed::<f64>(e, b"width")?,
    ) else {
        return Ok(());
    };
    for col in min.max(1)..=max {
        sheet.set_col_width(col - 1, width);
    }
    Ok(())
}

fn read_pane(sheet: &mut Sheet, e: &BytesStart) -> Result<()> {
    let frozen = matches!(attr(e, b"state")?.as_deref(), Some("frozen" | "frozenSplit"));
    if frozen {
        let rows = attr_parsed::<f64>(e, b"ySplit")?.map_or(0, f64_to_u32);
        let cols = attr_parsed::<f64>(e, b"xSplit")?.map_or(0, f64_to_u32);
        sheet.freeze_panes(rows, cols);
    }
    Ok(())
}

/// Pane splits are written as numbers; frozen ones are whole rows/columns.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn f64_to_u32(v: f64) -> u32 {
    v.clamp(0.0, f64::from(u32::MAX)).floor() as u32
}
