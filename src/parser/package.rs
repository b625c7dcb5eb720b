//! Workbook-level parts: relationships, `workbook.xml` and `docProps/core.xml`.

use chrono::{DateTime, Utc};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{BufReader, Read, Seek};
use zip::ZipArchive;

use crate::error::{MetadataError, Result};
use crate::types::DocProperties;

use super::{attr, attr_parsed};

pub(super) struct SheetEntry {
    pub name: String,
    pub path: String,
}

pub(super) struct BookPart {
    pub sheets: Vec<SheetEntry>,
    pub active_tab: usize,
}

/// rId → full archive path for `xl/_rels/workbook.xml.rels`.
pub(super) fn parse_workbook_rels<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> Result<HashMap<String, String>> {
    let file = archive.by_name("xl/_rels/workbook.xml.rels")?;
    let mut xml = Reader::from_reader(BufReader::new(file));
    xml.trim_text(true);

    let mut rels = HashMap::new();
    let mut buf = Vec::new();
    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) | Event::Empty(ref e)
                if e.local_name().as_ref() == b"Relationship" =>
            {
                if let (Some(id), Some(target)) = (attr(e, b"Id")?, attr(e, b"Target")?) {
                    rels.insert(id, resolve_target(&target));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(rels)
}

fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{target}"),
    }
}

pub(super) fn parse_workbook_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    rels: &HashMap<String, String>,
) -> Result<BookPart> {
    let file = archive.by_name("xl/workbook.xml")?;
    let mut xml = Reader::from_reader(BufReader::new(file));
    xml.trim_text(true);

    let mut book = BookPart {
        sheets: Vec::new(),
        active_tab: 0,
    };
    let mut buf = Vec::new();
    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) | Event::Empty(ref e) => match e.local_name().as_ref() {
                b"workbookView" => {
                    book.active_tab = attr_parsed(e, b"activeTab")?.unwrap_or(0);
                }
                b"sheet" => {
                    let name = attr(e, b"name")?
                        .ok_or_else(|| MetadataError::Parse("<sheet> without name".into()))?;
                    let r_id = attr(e, b"id")?.unwrap_or_default();
                    let path = rels.get(&r_id).cloned().ok_or_else(|| {
                        MetadataError::Parse(format!("sheet {name:?} has no relationship {r_id:?}"))
                    })?;
                    book.sheets.push(SheetEntry { name, path });
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(book)
}

#[derive(Clone, Copy)]
enum CoreField {
    Title,
    Subject,
    Description,
    Creator,
    LastModifiedBy,
    Created,
}

/// Core properties; a package without `docProps/core.xml` yields empty ones.
pub(super) fn parse_core_properties<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> Result<DocProperties> {
    let mut props = DocProperties {
        title: String::new(),
        subject: String::new(),
        description: String::new(),
        creator: String::new(),
        last_modified_by: String::new(),
        created: DateTime::<Utc>::default(),
    };

    let file = match archive.by_name("docProps/core.xml") {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(props),
        Err(e) => return Err(e.into()),
    };
    let mut xml = Reader::from_reader(BufReader::new(file));
    xml.trim_text(true);

    let mut current = None;
    let mut buf = Vec::new();
    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                current = match e.local_name().as_ref() {
                    b"title" => Some(CoreField::Title),
                    b"subject" => Some(CoreField::Subject),
                    b"description" => Some(CoreField::Description),
                    b"creator" => Some(CoreField::Creator),
                    b"lastModifiedBy" => Some(CoreField::LastModifiedBy),
                    b"created" => Some(CoreField::Created),
                    _ => None,
                };
            }
            Event::Text(ref t) => {
                let text = t.unescape()?.into_owned();
                match current {
                    Some(CoreField::Title) => props.title = text,
                    Some(CoreField::Subject) => props.subject = text,
                    Some(CoreField::Description) => props.description = text,
                    Some(CoreField::Creator) => props.creator = text,
                    Some(CoreField::LastModifiedBy) => props.last_modified_by = text,
                    Some(CoreField::Created) => {
                        props.created = DateTime::parse_from_rfc3339(text.trim())
                            .map_err(|e| MetadataError::Parse(format!("created {text:?}: {e}")))?
                            .with_timezone(&Utc);
                    }
                    None => {}
                }
            }
            Event::End(_) => current = None,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(props)
}
