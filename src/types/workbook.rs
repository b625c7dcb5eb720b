use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use super::{Cell, CellData, CellStyle, CellValue};
use crate::error::{MetadataError, Result};

/// Longest sheet name Excel accepts.
pub const MAX_SHEET_TITLE_LEN: usize = 31;

/// Name given to sheets before they are titled.
const DEFAULT_SHEET_NAME: &str = "Worksheet";

/// Document properties written to `docProps/core.xml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocProperties {
    pub title: String,
    pub subject: String,
    pub description: String,
    pub creator: String,
    pub last_modified_by: String,
    pub created: DateTime<Utc>,
}

impl DocProperties {
    /// Properties authored by `author`, stamped with the current time.
    #[must_use]
    pub fn authored_by(author: &str) -> Self {
        Self {
            title: String::new(),
            subject: String::new(),
            description: String::new(),
            creator: author.to_string(),
            last_modified_by: author.to_string(),
            created: Utc::now().trunc_subsecs(0),
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    #[must_use]
    pub fn with_subject(mut self, subject: &str) -> Self {
        self.subject = subject.to_string();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }
}

/// A workbook under construction.
///
/// Like a freshly opened spreadsheet it always holds at least one sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workbook {
    pub properties: DocProperties,
    pub sheets: Vec<Sheet>,
    /// Sheet shown when the file is first opened.
    pub active_sheet: usize,
    /// Style of `cellXfs[0]`; every other style is layered over it.
    pub default_style: CellStyle,
}

impl Workbook {
    #[must_use]
    pub fn new(properties: DocProperties) -> Self {
        Self {
            properties,
            sheets: vec![Sheet::new(DEFAULT_SHEET_NAME)],
            active_sheet: 0,
            default_style: CellStyle::default(),
        }
    }

    /// Append an untitled sheet and return it.
    pub fn create_sheet(&mut self) -> &mut Sheet {
        let mut n = self.sheets.len();
        let name = loop {
            let candidate = format!("{DEFAULT_SHEET_NAME}{n}");
            if self.sheet_by_name(&candidate).is_none() {
                break candidate;
            }
            n += 1;
        };
        let last = self.sheets.len();
        self.sheets.push(Sheet::new(&name));
        #[allow(clippy::indexing_slicing)] // pushed just above
        let sheet = &mut self.sheets[last];
        sheet
    }

    #[must_use]
    pub fn sheet(&self, index: usize) -> Option<&Sheet> {
        self.sheets.get(index)
    }

    pub fn sheet_mut(&mut self, index: usize) -> Option<&mut Sheet> {
        self.sheets.get_mut(index)
    }

    #[must_use]
    pub fn sheet_by_name(&self, name: &str) -> Option<&Sheet> {
        self.sheets
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    pub fn set_active_sheet(&mut self, index: usize) -> Result<()> {
        if index >= self.sheets.len() {
            return Err(MetadataError::SheetIndex(index));
        }
        self.active_sheet = index;
        Ok(())
    }

    #[must_use]
    pub fn sheet_titles(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Excel refuses to open a workbook with two sheets of the same name
    /// (compared case-insensitively).
    pub fn check_unique_titles(&self) -> Result<()> {
        for (idx, sheet) in self.sheets.iter().enumerate() {
            let clash = self
                .sheets
                .iter()
                .take(idx)
                .any(|earlier| earlier.name.eq_ignore_ascii_case(&sheet.name));
            if clash {
                return Err(MetadataError::SheetTitle {
                    title: sheet.name.clone(),
                    reason: "duplicate sheet name",
                });
            }
        }
        Ok(())
    }
}

/// Custom width for one column, in character units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColWidth {
    pub col: u32,
    pub width: f64,
}

/// Custom height for one row, in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RowHeight {
    pub row: u32,
    pub height: f64,
}

/// Style applied to a whole row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RowStyle {
    pub row: u32,
    pub style: CellStyle,
}

/// A single worksheet. Rows and columns are 0-indexed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    pub name: String,
    /// Sparse cells, kept sorted by (row, col).
    pub cells: Vec<CellData>,
    pub col_widths: Vec<ColWidth>,
    pub row_heights: Vec<RowHeight>,
    pub row_styles: Vec<RowStyle>,
    /// Number of frozen rows (0 = none)
    pub frozen_rows: u32,
    /// Number of frozen columns (0 = none)
    pub frozen_cols: u32,
}

impl Sheet {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            cells: Vec::new(),
            col_widths: Vec::new(),
            row_heights: Vec::new(),
            row_styles: Vec::new(),
            frozen_rows: 0,
            frozen_cols: 0,
        }
    }

    /// Rename the sheet, enforcing Excel's naming rules.
    pub fn set_title(&mut self, title: &str) -> Result<()> {
        validate_title(title)?;
        self.name = title.to_string();
        Ok(())
    }

    /// Write a value, replacing any existing value but keeping its style.
    pub fn set_value(&mut self, row: u32, col: u32, value: impl Into<CellValue>) {
        let value = value.into();
        match self.position(row, col) {
            Ok(idx) => {
                if let Some(existing) = self.cells.get_mut(idx) {
                    existing.cell.value = value;
                }
            }
            Err(idx) => self.cells.insert(
                idx,
                CellData {
                    r: row,
                    c: col,
                    cell: Cell::new(value),
                },
            ),
        }
    }

    /// Style an existing cell. Returns `false` if the cell is empty.
    pub fn set_cell_style(&mut self, row: u32, col: u32, style: CellStyle) -> bool {
        let Ok(idx) = self.position(row, col) else {
            return false;
        };
        match self.cells.get_mut(idx) {
            Some(cd) => {
                cd.cell.style = Some(style);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.position(row, col)
            .ok()
            .and_then(|idx| self.cells.get(idx))
            .map(|cd| &cd.cell)
    }

    /// Values of one row in column order.
    #[must_use]
    pub fn row_values(&self, row: u32) -> Vec<&CellValue> {
        self.cells
            .iter()
            .filter(|cd| cd.r == row)
            .map(|cd| &cd.cell.value)
            .collect()
    }

    /// Number of distinct rows holding at least one cell.
    #[must_use]
    pub fn populated_rows(&self) -> usize {
        let mut count = 0;
        let mut last = None;
        for cd in &self.cells {
            if last != Some(cd.r) {
                count += 1;
                last = Some(cd.r);
            }
        }
        count
    }

    pub fn set_col_width(&mut self, col: u32, width: f64) {
        match self.col_widths.iter_mut().find(|cw| cw.col == col) {
            Some(cw) => cw.width = width,
            None => {
                self.col_widths.push(ColWidth { col, width });
                self.col_widths.sort_by_key(|cw| cw.col);
            }
        }
    }

    #[must_use]
    pub fn col_width(&self, col: u32) -> Option<f64> {
        self.col_widths
            .iter()
            .find(|cw| cw.col == col)
            .map(|cw| cw.width)
    }

    pub fn set_row_height(&mut self, row: u32, height: f64) {
        match self.row_heights.iter_mut().find(|rh| rh.row == row) {
            Some(rh) => rh.height = height,
            None => {
                self.row_heights.push(RowHeight { row, height });
                self.row_heights.sort_by_key(|rh| rh.row);
            }
        }
    }

    #[must_use]
    pub fn row_height(&self, row: u32) -> Option<f64> {
        self.row_heights
            .iter()
            .find(|rh| rh.row == row)
            .map(|rh| rh.height)
    }

    pub fn set_row_style(&mut self, row: u32, style: CellStyle) {
        match self.row_styles.iter_mut().find(|rs| rs.row == row) {
            Some(rs) => rs.style = style,
            None => {
                self.row_styles.push(RowStyle { row, style });
                self.row_styles.sort_by_key(|rs| rs.row);
            }
        }
    }

    #[must_use]
    pub fn row_style(&self, row: u32) -> Option<CellStyle> {
        self.row_styles
            .iter()
            .find(|rs| rs.row == row)
            .map(|rs| rs.style)
    }

    /// Effective explicit style of a cell: its own, else its row's.
    #[must_use]
    pub fn effective_style(&self, row: u32, col: u32) -> Option<CellStyle> {
        self.cell(row, col)
            .and_then(|c| c.style)
            .or_else(|| self.row_style(row))
    }

    /// Keep `rows` rows and `cols` columns in view while scrolling.
    pub fn freeze_panes(&mut self, rows: u32, cols: u32) {
        self.frozen_rows = rows;
        self.frozen_cols = cols;
    }

    /// (rows, cols) extent of the used range, 0 when empty.
    #[must_use]
    pub fn extent(&self) -> (u32, u32) {
        let rows = self.cells.last().map_or(0, |cd| cd.r + 1);
        let cols = self.cells.iter().map(|cd| cd.c + 1).max().unwrap_or(0);
        (rows, cols)
    }

    fn position(&self, row: u32, col: u32) -> std::result::Result<usize, usize> {
        self.cells
            .binary_search_by(|cd| (cd.r, cd.c).cmp(&(row, col)))
    }
}

fn validate_title(title: &str) -> Result<()> {
    let reason = if title.is_empty() {
        Some("sheet name is empty")
    } else if title.chars().count() > MAX_SHEET_TITLE_LEN {
        Some("sheet name longer than 31 characters")
    } else if title.contains([':', '\\', '/', '?', '*', '[', ']']) {
        Some("sheet name contains one of : \\ / ? * [ ]")
    } else if title.starts_with('\'') || title.ends_with('\'') {
        Some("sheet name starts or ends with an apostrophe")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(MetadataError::SheetTitle {
            title: title.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
