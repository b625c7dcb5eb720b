//! In-memory workbook model shared by the writer and the read-back parser.

mod cell;
mod style;
mod workbook;

pub use cell::*;
pub use style::*;
pub use workbook::*;
