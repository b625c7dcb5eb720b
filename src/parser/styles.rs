//! `xl/styles.xml` → one [`CellStyle`] per `cellXfs` entry.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{BufReader, Read, Seek};
use zip::ZipArchive;

use crate::error::Result;
use crate::types::{CellStyle, HAlign, VAlign};

use super::{attr, attr_flag, attr_parsed};

/// Parse `cellXfs`. A package without a stylesheet has no styles.
pub(super) fn parse_styles<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Vec<CellStyle>> {
    let file = match archive.by_name("xl/styles.xml") {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let mut xml = Reader::from_reader(BufReader::new(file));
    xml.trim_text(true);

    // Bold flag per font, by fontId.
    let mut fonts: Vec<bool> = Vec::new();
    let mut xfs: Vec<CellStyle> = Vec::new();
    let mut in_fonts = false;
    let mut in_cell_xfs = false;

    let mut buf = Vec::new();
    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) | Event::Empty(ref e) => match e.local_name().as_ref() {
                b"fonts" => in_fonts = true,
                b"cellXfs" => in_cell_xfs = true,
                b"font" if in_fonts => fonts.push(false),
                b"b" if in_fonts => {
                    let on = attr(e, b"val")?
                        .map_or(true, |v| !matches!(v.as_str(), "0" | "false"));
                    if let Some(bold) = fonts.last_mut() {
                        *bold = on;
                    }
                }
                b"xf" if in_cell_xfs => {
                    let font_id: usize = attr_parsed(e, b"fontId")?.unwrap_or(0);
                    xfs.push(CellStyle {
                        bold: fonts.get(font_id).copied().unwrap_or(false),
                        ..CellStyle::default()
                    });
                }
                b"alignment" if in_cell_xfs => {
                    if let Some(xf) = xfs.last_mut() {
                        xf.horizontal =
                            attr(e, b"horizontal")?.as_deref().and_then(HAlign::from_xml);
                        xf.vertical = attr(e, b"vertical")?.as_deref().and_then(VAlign::from_xml);
                        xf.wrap_text = attr_flag(e, b"wrapText")?;
                    }
                }
                _ => {}
            },
            Event::End(ref e) => match e.local_name().as_ref() {
                b"fonts" => in_fonts = false,
                b"cellXfs" => in_cell_xfs = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(xfs)
}
