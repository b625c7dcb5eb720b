//! Category registry: which metadata types are published, under which sheet
//! titles, and into which files.
//!
//! The tables are static. A [`Registry`] turns them into the ordered list of
//! [`OutputBundle`]s a run produces: the composite workbook first, then one
//! dedicated workbook per data category, then grouped reference workbooks.

use serde::{Deserialize, Serialize};

/// One worksheet's content: the sheet title and the service's type key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategorySpec {
    pub title: &'static str,
    pub type_key: &'static str,
}

impl CategorySpec {
    #[must_use]
    pub const fn new(title: &'static str, type_key: &'static str) -> Self {
        Self { title, type_key }
    }
}

/// How a bundle's sheets relate to the rest of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BundleKind {
    /// Every category of the run, in registration order.
    Composite,
    /// A fixed multi-sheet subset (e.g. the ancillary reference tables).
    Group,
    /// Exactly one category.
    Dedicated,
}

/// One output file and the sheets it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputBundle {
    pub file_name: String,
    pub kind: BundleKind,
    pub specs: Vec<CategorySpec>,
    pub title: String,
    pub subject: String,
    pub description: String,
}

/// Which generation of bundle definitions to publish.
///
/// `Legacy` is the default: its type keys are the ones the service is known
/// to answer. The `magnitude` and `ancillary_*` keys of `Current` have not
/// been checked against the live service yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Release {
    /// Status/intensity, the three phenometrics tables and ancillary data.
    Current,
    /// The original raw / individual / site trio and its file names.
    #[default]
    Legacy,
}

/// A data category that also gets a workbook of its own.
#[derive(Debug)]
struct DedicatedCategory {
    spec: CategorySpec,
    file_stem: &'static str,
}

const CURRENT_DATA: &[DedicatedCategory] = &[
    DedicatedCategory {
        spec: CategorySpec::new("Status and Intensity", "raw"),
        file_stem: "status-intensity",
    },
    DedicatedCategory {
        spec: CategorySpec::new("Individual Phenometrics", "individual_summarized"),
        file_stem: "individual-phenometrics",
    },
    DedicatedCategory {
        spec: CategorySpec::new("Site Phenometrics", "site_summarized"),
        file_stem: "site-phenometrics",
    },
    DedicatedCategory {
        spec: CategorySpec::new("Magnitude Phenometrics", "magnitude"),
        file_stem: "magnitude-phenometrics",
    },
];

const CURRENT_ANCILLARY: &[CategorySpec] = &[
    CategorySpec::new("Sites", "ancillary_site"),
    CategorySpec::new("Individual Plants", "ancillary_individual_plant"),
    CategorySpec::new("Observers", "ancillary_person"),
    CategorySpec::new("Datasets", "ancillary_dataset"),
    CategorySpec::new("Protocols", "ancillary_protocol"),
    CategorySpec::new("Phenophases", "ancillary_phenophase"),
    CategorySpec::new("Species-Specific Info", "ancillary_species_protocol"),
    CategorySpec::new("Intensity Categories", "ancillary_intensity"),
];

const LEGACY_DATA: &[DedicatedCategory] = &[
    DedicatedCategory {
        spec: CategorySpec::new("Raw", "raw"),
        file_stem: "raw",
    },
    DedicatedCategory {
        spec: CategorySpec::new("Individual-Summarized", "individual_summarized"),
        file_stem: "individual-summarized",
    },
    DedicatedCategory {
        spec: CategorySpec::new("Site-Summarized", "site_summarized"),
        file_stem: "site-summarized",
    },
];

const FILE_SUFFIX: &str = "_metadata.xlsx";
const PUBLISHER: &str = "USA National Phenology Network";

/// Bundle definitions for one release.
#[derive(Debug, Clone, Copy)]
pub struct Registry {
    release: Release,
    data: &'static [DedicatedCategory],
    ancillary: &'static [CategorySpec],
}

impl Registry {
    #[must_use]
    pub fn for_release(release: Release) -> Self {
        match release {
            Release::Current => Self {
                release,
                data: CURRENT_DATA,
                ancillary: CURRENT_ANCILLARY,
            },
            Release::Legacy => Self {
                release,
                data: LEGACY_DATA,
                ancillary: &[],
            },
        }
    }

    #[must_use]
    pub fn release(&self) -> Release {
        self.release
    }

    /// Every category of the run in registration order: data, then ancillary.
    pub fn categories(&self) -> impl Iterator<Item = CategorySpec> + '_ {
        self.data
            .iter()
            .map(|d| d.spec)
            .chain(self.ancillary.iter().copied())
    }

    /// Look a category up by its sheet title.
    #[must_use]
    pub fn category(&self, title: &str) -> Option<CategorySpec> {
        self.categories().find(|spec| spec.title == title)
    }

    /// The ordered bundles to write.
    #[must_use]
    pub fn bundles(&self) -> Vec<OutputBundle> {
        let mut bundles = Vec::with_capacity(self.data.len() + 2);

        bundles.push(OutputBundle {
            file_name: format!("composite{FILE_SUFFIX}"),
            kind: BundleKind::Composite,
            specs: self.categories().collect(),
            title: "Metadata Field Descriptions".to_string(),
            subject: PUBLISHER.to_string(),
            description: "Every metadata table published by the National Phenology Database."
                .to_string(),
        });

        for dedicated in self.data {
            let spec = dedicated.spec;
            bundles.push(OutputBundle {
                file_name: format!("{}{FILE_SUFFIX}", dedicated.file_stem),
                kind: BundleKind::Dedicated,
                specs: vec![spec],
                title: format!("{} Field Descriptions", spec.title),
                subject: PUBLISHER.to_string(),
                description: format!(
                    "Field definitions for the {} data type (`{}`).",
                    spec.title, spec.type_key
                ),
            });
        }

        if !self.ancillary.is_empty() {
            bundles.push(OutputBundle {
                file_name: format!("ancillary{FILE_SUFFIX}"),
                kind: BundleKind::Group,
                specs: self.ancillary.to_vec(),
                title: "Ancillary Data Field Descriptions".to_string(),
                subject: PUBLISHER.to_string(),
                description: "Field definitions for the ancillary reference tables.".to_string(),
            });
        }

        bundles
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::for_release(Release::default())
    }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn legacy_release_matches_original_files() {
        let bundles = Registry::for_release(Release::Legacy).bundles();
        let names: Vec<&str> = bundles.iter().map(|b| b.file_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "composite_metadata.xlsx",
                "raw_metadata.xlsx",
                "individual-summarized_metadata.xlsx",
                "site-summarized_metadata.xlsx",
            ]
        );

        let composite: Vec<(&str, &str)> = bundles[0]
            .specs
            .iter()
            .map(|s| (s.title, s.type_key))
            .collect();
        assert_eq!(
            composite,
            vec![
                ("Raw", "raw"),
                ("Individual-Summarized", "individual_summarized"),
                ("Site-Summarized", "site_summarized"),
            ]
        );
    }

    #[test]
    fn composite_holds_every_category_in_order() {
        let registry = Registry::for_release(Release::Current);
        let bundles = registry.bundles();
        let composite = &bundles[0];
        assert_eq!(composite.kind, BundleKind::Composite);
        let all: Vec<CategorySpec> = registry.categories().collect();
        assert_eq!(composite.specs, all);
    }

    #[test]
    fn every_sheet_of_a_non_composite_bundle_is_in_the_composite() {
        let bundles = Registry::for_release(Release::Current).bundles();
        let composite: HashSet<&str> = bundles[0].specs.iter().map(|s| s.type_key).collect();
        for bundle in &bundles[1..] {
            for spec in &bundle.specs {
                assert!(composite.contains(spec.type_key), "{}", spec.type_key);
            }
        }
    }

    #[test]
    fn dedicated_bundles_hold_exactly_one_spec() {
        for release in [Release::Current, Release::Legacy] {
            for bundle in Registry::for_release(release).bundles() {
                if bundle.kind == BundleKind::Dedicated {
                    assert_eq!(bundle.specs.len(), 1, "{}", bundle.file_name);
                }
            }
        }
    }

    #[test]
    fn default_release_is_legacy() {
        let registry = Registry::default();
        assert_eq!(registry.release(), Release::Legacy);
        let keys: Vec<&str> = registry.categories().map(|s| s.type_key).collect();
        assert_eq!(keys, vec!["raw", "individual_summarized", "site_summarized"]);
    }

    #[test]
    fn current_release_adds_magnitude_and_ancillary() {
        let registry = Registry::for_release(Release::Current);
        assert_eq!(
            registry.category("Site Phenometrics").unwrap().type_key,
            "site_summarized"
        );
        assert_eq!(
            registry.category("Magnitude Phenometrics").unwrap().type_key,
            "magnitude"
        );
        let last = registry.bundles().pop().unwrap();
        assert_eq!(last.kind, BundleKind::Group);
        assert_eq!(last.file_name, "ancillary_metadata.xlsx");
        assert_eq!(last.specs, CURRENT_ANCILLARY.to_vec());
    }

    #[test]
    fn titles_and_file_names_are_unique() {
        for release in [Release::Current, Release::Legacy] {
            let registry = Registry::for_release(release);
            let titles: HashSet<&str> = registry.categories().map(|s| s.title).collect();
            assert_eq!(titles.len(), registry.categories().count());
            let bundles = registry.bundles();
            let files: HashSet<&str> = bundles.iter().map(|b| b.file_name.as_str()).collect();
            assert_eq!(files.len(), bundles.len());
            for title in titles {
                assert!(title.len() <= crate::types::MAX_SHEET_TITLE_LEN, "{title}");
            }
        }
    }
}
