//! Sheet template: the header row and the field rows beneath it.

use crate::fetch::MetadataField;
use crate::types::{CellStyle, HAlign, Sheet, VAlign, Workbook};

/// Header row text, one entry per column.
pub const HEADERS: [&str; 4] = [
    "Sequence #",
    "Field name",
    "Field description",
    "Controlled value choices",
];

/// Column widths A..D in character units.
pub const COLUMN_WIDTHS: [f64; 4] = [9.25, 27.5, 64.38, 31.75];

/// Height of the header row and of every data row, in points.
pub const ROW_HEIGHT: f64 = 31.5;

/// Row 1 holds the header; fields start on row 2.
pub const HEADER_ROW: u32 = 0;
pub const FIRST_DATA_ROW: u32 = 1;

#[must_use]
pub fn header_style() -> CellStyle {
    CellStyle::default()
        .bold()
        .horizontal(HAlign::Center)
        .vertical(VAlign::Top)
}

#[must_use]
pub fn data_row_style() -> CellStyle {
    CellStyle::default().vertical(VAlign::Bottom)
}

/// Every cell of a published workbook wraps its text.
pub fn apply_workbook_defaults(workbook: &mut Workbook) {
    workbook.default_style = workbook.default_style.wrap_text();
}

/// Write the styled header row and fix the column widths.
pub fn render_header(sheet: &mut Sheet) {
    let style = header_style();
    for (col, header) in (0u32..).zip(HEADERS) {
        sheet.set_value(HEADER_ROW, col, header);
        sheet.set_cell_style(HEADER_ROW, col, style);
    }
    sheet.set_row_height(HEADER_ROW, ROW_HEIGHT);

    for (col, width) in (0u32..).zip(COLUMN_WIDTHS) {
        sheet.set_col_width(col, width);
    }
}

/// Write one row per field below the header, then freeze the header row.
///
/// Returns the number of data rows written.
pub fn populate(sheet: &mut Sheet, fields: &[MetadataField]) -> usize {
    let style = data_row_style();
    let mut written = 0;
    for (row, field) in (FIRST_DATA_ROW..).zip(fields) {
        sheet.set_row_height(row, ROW_HEIGHT);
        sheet.set_row_style(row, style);

        sheet.set_value(row, 0, field.sequence_number);
        sheet.set_value(row, 1, field.field_name.as_str());
        sheet.set_value(row, 2, field.field_description.as_str());
        sheet.set_value(row, 3, field.controlled_values.as_str());
        written += 1;
    }

    sheet.freeze_panes(FIRST_DATA_ROW, 0);
    written
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::types::CellValue;

    fn field(seq: i64, name: &str) -> MetadataField {
        MetadataField {
            sequence_number: seq,
            field_name: name.to_string(),
            field_description: format!("{name} description"),
            controlled_values: String::new(),
        }
    }

    #[test]
    fn header_row_is_styled_and_sized() {
        let mut sheet = Sheet::new("S");
        render_header(&mut sheet);

        let values: Vec<String> = sheet.row_values(0).iter().map(|v| v.display()).collect();
        assert_eq!(values, HEADERS.map(String::from).to_vec());
        for col in 0..4 {
            let style = sheet.cell(0, col).unwrap().style.unwrap();
            assert!(style.bold);
            assert_eq!(style.horizontal, Some(HAlign::Center));
            assert_eq!(style.vertical, Some(VAlign::Top));
        }
        assert_eq!(sheet.row_height(0), Some(31.5));
        assert_eq!(sheet.col_width(0), Some(9.25));
        assert_eq!(sheet.col_width(1), Some(27.5));
        assert_eq!(sheet.col_width(2), Some(64.38));
        assert_eq!(sheet.col_width(3), Some(31.75));
    }

    #[test]
    fn fields_land_in_fixed_column_order() {
        let mut sheet = Sheet::new("S");
        render_header(&mut sheet);
        let fields = vec![field(1, "Year"), field(2, "Site_ID"), field(3, "Latitude")];
        assert_eq!(populate(&mut sheet, &fields), 3);

        assert_eq!(sheet.populated_rows(), fields.len() + 1);
        for (i, f) in fields.iter().enumerate() {
            let row = u32::try_from(i).unwrap() + 1;
            assert_eq!(
                sheet.row_values(row),
                vec![
                    &CellValue::Integer(f.sequence_number),
                    &CellValue::from(f.field_name.as_str()),
                    &CellValue::from(f.field_description.as_str()),
                    &CellValue::from(""),
                ]
            );
            assert_eq!(sheet.row_height(row), Some(ROW_HEIGHT));
            assert_eq!(sheet.row_style(row), Some(data_row_style()));
        }
        assert_eq!((sheet.frozen_rows, sheet.frozen_cols), (1, 0));
    }

    #[test]
    fn no_fields_leaves_only_the_header_and_still_freezes() {
        let mut sheet = Sheet::new("S");
        render_header(&mut sheet);
        assert_eq!(populate(&mut sheet, &[]), 0);
        assert_eq!(sheet.populated_rows(), 1);
        assert_eq!(sheet.frozen_rows, 1);
        assert!(sheet.row_styles.is_empty());
    }

    #[test]
    fn populating_fresh_sheets_is_deterministic() {
        let fields = vec![field(1, "Year"), field(2, "Month")];
        let build = || {
            let mut sheet = Sheet::new("S");
            render_header(&mut sheet);
            populate(&mut sheet, &fields);
            sheet
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn workbook_defaults_enable_wrapping() {
        let mut wb = Workbook::new(crate::types::DocProperties::authored_by("a"));
        apply_workbook_defaults(&mut wb);
        assert!(wb.default_style.wrap_text);
    }
}
