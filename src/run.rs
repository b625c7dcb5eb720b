//! Run orchestrator: build and write every bundle of a release, in order.

use std::path::PathBuf;

use tracing::{info, info_span};

use crate::assembler::add_sheet;
use crate::config::Settings;
use crate::error::{MetadataError, Result};
use crate::export::write_xlsx;
use crate::fetch::{CachedSource, HttpSource, MetadataSource};
use crate::registry::{OutputBundle, Registry};
use crate::render::apply_workbook_defaults;
use crate::types::{DocProperties, Workbook};

/// One file produced by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub sheet_titles: Vec<String>,
    pub rows: usize,
}

/// Everything a successful run wrote, in write order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub files: Vec<WrittenFile>,
}

/// Build the workbook for one bundle.
///
/// The workbook starts with one sheet; one more is created per additional
/// spec, and sheet `i` is rendered from `bundle.specs[i]`. Returns the
/// workbook and the number of data rows written across its sheets.
pub fn build_workbook(
    bundle: &OutputBundle,
    author: &str,
    source: &dyn MetadataSource,
) -> Result<(Workbook, usize)> {
    let properties = DocProperties::authored_by(author)
        .with_title(&bundle.title)
        .with_subject(&bundle.subject)
        .with_description(&bundle.description);
    let mut workbook = Workbook::new(properties);
    apply_workbook_defaults(&mut workbook);

    for _ in 1..bundle.specs.len() {
        workbook.create_sheet();
    }

    let mut rows = 0;
    for (spec, sheet) in bundle.specs.iter().zip(workbook.sheets.iter_mut()) {
        rows += add_sheet(sheet, spec, source)?;
    }

    workbook.set_active_sheet(0)?;
    Ok((workbook, rows))
}

/// Write every bundle of `registry` under `settings.output_path`.
///
/// Stops at the first failure; bundles after it are not written.
pub fn run(
    settings: &Settings,
    registry: &Registry,
    source: &dyn MetadataSource,
) -> Result<RunReport> {
    let mut report = RunReport::default();

    for bundle in registry.bundles() {
        let _span = info_span!("bundle", file = %bundle.file_name).entered();

        let (workbook, rows) = build_workbook(&bundle, &settings.author, source)?;
        let path = settings.output_file(&bundle.file_name);
        write_xlsx(&workbook, &path)?;

        info!(
            path = %path.display(),
            sheets = workbook.sheets.len(),
            rows,
            "wrote workbook"
        );
        report.files.push(WrittenFile {
            path,
            sheet_titles: workbook.sheets.iter().map(|s| s.name.clone()).collect(),
            rows,
        });
    }

    Ok(report)
}

/// Publish the configured release from the live metadata service.
///
/// The output directory is checked before anything is fetched.
pub fn publish(settings: &Settings) -> Result<RunReport> {
    if !settings.output_path.is_dir() {
        return Err(MetadataError::Write {
            path: settings.output_path.clone(),
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "output directory does not exist",
            ),
        });
    }

    let registry = Registry::for_release(settings.release);
    let http = HttpSource::new(settings)?;
    info!(
        endpoint = http.endpoint(),
        release = ?registry.release(),
        "publishing metadata workbooks"
    );
    run(settings, &registry, &CachedSource::new(http))
}
