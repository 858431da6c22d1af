//! Pipeline configuration.
//!
//! Locations, placeholder tokens, date formats, and rule sets are carried by
//! [`PipelineConfig`], which can be built in code or loaded from a TOML file.
//! Missing keys take the defaults.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::collection::CollectionKind;
use crate::date_format::{DEFAULT_DATE_FORMATS, DateFormat};
use crate::error::{ConfigError, Result};
use crate::rules::CollectionRules;

/// Placeholder tokens that mean "no data", compared after trim + lowercase.
pub const DEFAULT_PLACEHOLDERS: [&str; 8] =
    ["", "invalid", "dob", "n/a", "na", "none", "unknown", "??"];

/// Raw field values the loader reads as null (exact match).
pub const DEFAULT_READER_NULL_VALUES: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn default_placeholders() -> Vec<String> {
    DEFAULT_PLACEHOLDERS.iter().map(ToString::to_string).collect()
}

pub fn default_reader_null_values() -> Vec<String> {
    DEFAULT_READER_NULL_VALUES
        .iter()
        .map(ToString::to_string)
        .collect()
}

/// Configuration passed to the pipeline entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory holding the four raw extracts.
    pub input_dir: PathBuf,
    /// Directory receiving the four cleaned collections.
    pub output_dir: PathBuf,
    /// File receiving the anomaly report.
    pub report_path: PathBuf,
    /// Placeholder tokens rewritten to null in every field.
    pub placeholders: Vec<String>,
    /// Raw values the loader treats as null.
    pub reader_null_values: Vec<String>,
    /// Candidate date formats, tried in order.
    pub date_formats: Vec<DateFormat>,
    /// Literal written for null cells.
    pub null_marker: String,
    /// Write outputs into a staging directory before moving them into place.
    pub staged_writes: bool,
    /// Rule sets, one per collection, in processing order.
    pub collections: Vec<CollectionRules>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("data/raw"),
            output_dir: PathBuf::from("data/cleaned"),
            report_path: PathBuf::from("data/monitoring/orphaned_insurance_ids_log.txt"),
            placeholders: default_placeholders(),
            reader_null_values: default_reader_null_values(),
            date_formats: DEFAULT_DATE_FORMATS.to_vec(),
            null_marker: "null".to_string(),
            staged_writes: true,
            collections: CollectionRules::defaults(),
        }
    }
}

impl PipelineConfig {
    /// Load a TOML configuration file and validate it.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.date_formats.is_empty() {
            return Err(ConfigError::Invalid(
                "date_formats must list at least one format".to_string(),
            ));
        }
        if self.null_marker.is_empty() {
            return Err(ConfigError::Invalid(
                "null_marker must not be empty".to_string(),
            ));
        }
        let mut seen = BTreeSet::new();
        for rules in &self.collections {
            if !seen.insert(rules.kind) {
                return Err(ConfigError::Invalid(format!(
                    "collection {} is configured more than once",
                    rules.kind
                )));
            }
        }
        Ok(())
    }

    pub fn rules_for(&self, kind: CollectionKind) -> Option<&CollectionRules> {
        self.collections.iter().find(|rules| rules.kind == kind)
    }

    pub fn source_path(&self, kind: CollectionKind) -> PathBuf {
        self.input_dir.join(kind.source_file_name())
    }

    pub fn output_path(&self, kind: CollectionKind) -> PathBuf {
        self.output_dir.join(kind.output_file_name())
    }

    #[must_use]
    pub fn with_input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.input_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_report_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_path = path.into();
        self
    }

    #[must_use]
    pub fn with_staged_writes(mut self, enable: bool) -> Self {
        self.staged_writes = enable;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_all_collections() {
        let config = PipelineConfig::default();
        let kinds: Vec<CollectionKind> = config.collections.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, CollectionKind::ALL.to_vec());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn duplicate_collection_is_rejected() {
        let mut config = PipelineConfig::default();
        config
            .collections
            .push(CollectionRules::for_kind(CollectionKind::Visits));
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn paths_join_file_names() {
        let config = PipelineConfig::default()
            .with_input_dir("in")
            .with_output_dir("out");
        assert_eq!(
            config.source_path(CollectionKind::LabResults),
            PathBuf::from("in/lab_results.csv")
        );
        assert_eq!(
            config.output_path(CollectionKind::IcdCodes),
            PathBuf::from("out/icd_clean.csv")
        );
    }
}
