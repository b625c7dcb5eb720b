//! XLSX export pipeline.
//!
//! Builds a complete package from a [`Workbook`]: content types,
//! relationships, document properties, one stylesheet and one worksheet part
//! per sheet. Files on disk are replaced atomically.

pub(crate) mod package;
pub(crate) mod sheet_writer;
pub(crate) mod style_table;

use std::borrow::Cow;
use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::error::{MetadataError, Result};
use crate::types::Workbook;

/// Save a workbook to XLSX bytes.
pub fn save_xlsx(workbook: &Workbook) -> Result<Vec<u8>> {
    workbook.check_unique_titles()?;
    package::write_package(workbook)
}

/// Write a workbook to `path`.
///
/// The bytes go to a temporary file in the same directory which is renamed
/// over `path` only once fully written, so a failed run never leaves a
/// truncated workbook behind.
pub fn write_xlsx(workbook: &Workbook, path: &Path) -> Result<()> {
    let bytes = save_xlsx(workbook).map_err(|e| serialization_error(path, e))?;
    let write_err = |source: std::io::Error| MetadataError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".npn-metadata-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(write_err)?;
    tmp.write_all(&bytes).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))
            .map_err(write_err)?;
    }

    tmp.persist(path).map_err(|e| write_err(e.error))?;
    debug!(path = %path.display(), bytes = bytes.len(), "workbook written");
    Ok(())
}

/// Serialization failures are reported against the file being written.
fn serialization_error(path: &Path, err: MetadataError) -> MetadataError {
    let source = match err {
        MetadataError::Io(e) => e,
        MetadataError::Zip(e) => std::io::Error::new(std::io::ErrorKind::Other, e),
        MetadataError::Xml(e) => std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        other => return other,
    };
    MetadataError::Write {
        path: path.to_path_buf(),
        source,
    }
}

/// The `Char` production of XML 1.0.
fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..
    )
}

/// Escape text for element content or attribute values, dropping characters
/// XML 1.0 cannot represent.
pub(crate) fn xml_text(s: &str) -> Cow<'_, str> {
    if s.chars().all(is_xml_char) {
        quick_xml::escape::escape(s)
    } else {
        let cleaned: String = s.chars().filter(|&c| is_xml_char(c)).collect();
        Cow::Owned(quick_xml::escape::escape(&cleaned).into_owned())
    }
}
