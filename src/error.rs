//! Structured error types for npn-metadata.
//!
//! Every failure in a publish run is fatal: configuration problems stop the
//! run before anything is fetched, fetch and write failures stop it before
//! any later file is produced.

use std::path::PathBuf;

/// All errors that can occur while fetching, assembling or writing workbooks.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// Settings file unreadable, unparsable or missing a required key.
    #[error("configuration: {0}")]
    Config(String),

    /// Transport or HTTP status failure talking to the metadata service.
    #[error("fetching metadata type `{type_key}`: {source}")]
    Fetch {
        type_key: String,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with something that is not the documented record array.
    #[error("decoding metadata type `{type_key}`: {source}")]
    Decode {
        type_key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Output file could not be created, written or moved into place.
    #[error("writing {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Sheet title rejected by the spreadsheet format.
    #[error("invalid sheet title {title:?}: {reason}")]
    SheetTitle { title: String, reason: &'static str },

    /// Sheet or cell address outside the workbook.
    #[error("no sheet at index {0}")]
    SheetIndex(usize),

    /// XML parsing error from quick-xml.
    #[error("XML parsing: {0}")]
    Xml(#[from] quick_xml::Error),

    /// ZIP archive error.
    #[error("ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Malformed workbook content on read-back.
    #[error("Parse error: {0}")]
    Parse(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MetadataError {
    /// Whether the error came from talking to the remote service.
    #[must_use]
    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::Decode { .. })
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MetadataError>;

impl From<quick_xml::events::attributes::AttrError> for MetadataError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        Self::Xml(quick_xml::Error::InvalidAttr(e))
    }
}
