use serde::{Deserialize, Serialize};

use super::CellStyle;

/// Cell with position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellData {
    pub r: u32, // row (0-indexed)
    pub c: u32, // col (0-indexed)
    pub cell: Cell,
}

/// A single cell's value and explicit style
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub value: CellValue,
    /// Explicit style; `None` falls back to the row style, then the workbook default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<CellStyle>,
}

impl Cell {
    #[must_use]
    pub fn new(value: CellValue) -> Self {
        Self { value, style: None }
    }
}

/// Cell contents as written to `<c>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "t", content = "v")]
pub enum CellValue {
    Integer(i64),
    Number(f64),
    String(String),
}

impl CellValue {
    /// Text form, as a viewer would show it.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Self::Integer(n) => n.to_string(),
            Self::Number(n) => n.to_string(),
            Self::String(s) => s.clone(),
        }
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}
