//! Run settings, read once at startup from a TOML file.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{MetadataError, Result};
use crate::registry::Release;

/// Environment variable naming the settings file.
pub const CONFIG_ENV: &str = "NPN_METADATA_CONFIG";

/// Settings file used when [`CONFIG_ENV`] is unset.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Service path appended to `{scheme}://{domain}`.
pub const METADATA_PATH: &str = "/npn_portal/metadata/getMetadataFields.json";

/// Settings for one publish run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Written as creator and last-modified-by of every workbook.
    pub author: String,
    /// Host (optionally `host:port`) of the metadata service.
    pub domain: String,
    /// Directory the workbooks are written to.
    pub output_path: PathBuf,
    #[serde(default = "default_scheme")]
    pub scheme: String,
    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub release: Release,
}

fn default_scheme() -> String {
    "http".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Settings {
    /// Parse and validate settings from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: Self =
            toml::from_str(text).map_err(|e| MetadataError::Config(e.message().to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            MetadataError::Config(format!("reading {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    /// Settings file location: `$NPN_METADATA_CONFIG`, else `./config.toml`.
    #[must_use]
    pub fn locate() -> PathBuf {
        std::env::var_os(CONFIG_ENV)
            .filter(|v| !v.is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from)
    }

    /// Base URL of the metadata endpoint, without query string.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!(
            "{}://{}{METADATA_PATH}",
            self.scheme,
            self.domain.trim_end_matches('/')
        )
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Where a bundle's file lands.
    #[must_use]
    pub fn output_file(&self, file_name: &str) -> PathBuf {
        self.output_path.join(file_name)
    }

    fn validate(&self) -> Result<()> {
        for (key, value) in [("author", &self.author), ("domain", &self.domain)] {
            if value.trim().is_empty() {
                return Err(MetadataError::Config(format!("`{key}` must not be empty")));
            }
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(MetadataError::Config(
                "`output_path` must not be empty".to_string(),
            ));
        }
        if self.domain.contains("://") {
            return Err(MetadataError::Config(
                "`domain` is a host name; set the protocol with `scheme`".to_string(),
            ));
        }
        if !matches!(self.scheme.as_str(), "http" | "https") {
            return Err(MetadataError::Config(format!(
                "unsupported scheme `{}`",
                self.scheme
            )));
        }
        if self.timeout_secs == 0 {
            return Err(MetadataError::Config(
                "`timeout_secs` must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
