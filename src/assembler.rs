//! Workbook assembler: renders one category into one sheet.

use tracing::debug;

use crate::error::Result;
use crate::fetch::MetadataSource;
use crate::registry::CategorySpec;
use crate::render::{populate, render_header};
use crate::types::Sheet;

/// Render `spec` into `sheet`: header, title, then the fetched field rows.
///
/// On a fetch failure the header is the only thing written and the error is
/// returned unchanged. Returns the number of data rows written.
pub fn add_sheet(
    sheet: &mut Sheet,
    spec: &CategorySpec,
    source: &dyn MetadataSource,
) -> Result<usize> {
    render_header(sheet);
    sheet.set_title(spec.title)?;

    let fields = source.fetch_fields(spec.type_key)?;
    let rows = populate(sheet, &fields);
    debug!(sheet = spec.title, type_key = spec.type_key, rows, "sheet assembled");
    Ok(rows)
}
