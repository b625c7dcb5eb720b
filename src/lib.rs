//! npn-metadata - publishes USA-NPN metadata field definitions as XLSX
//!
//! Queries the National Phenology Network metadata service once per category
//! and renders the field records into spreadsheet workbooks:
//! - A composite workbook with one sheet per category
//! - One dedicated workbook per data category
//! - Grouped workbooks for ancillary reference tables
//!
//! # Usage
//!
//! ```no_run
//! use npn_metadata::{publish, Settings};
//!
//! let settings = Settings::load(&Settings::locate())?;
//! let report = publish(&settings)?;
//! for file in &report.files {
//!     println!("{}", file.path.display());
//! }
//! # Ok::<(), npn_metadata::MetadataError>(())
//! ```

pub mod assembler;
pub mod cell_ref;
pub mod config;
pub mod error;
pub mod export;
pub mod fetch;
pub mod parser;
pub mod registry;
pub mod render;
pub mod run;
pub mod types;

pub use assembler::add_sheet;
pub use config::Settings;
pub use error::{MetadataError, Result};
pub use export::{save_xlsx, write_xlsx};
pub use fetch::{CachedSource, HttpSource, MetadataField, MetadataSource};
pub use registry::{BundleKind, CategorySpec, OutputBundle, Registry, Release};
pub use run::{build_workbook, publish, run, RunReport, WrittenFile};
pub use types::*;

/// Get the library version
#[must_use]
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
