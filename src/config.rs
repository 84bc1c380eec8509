use crate::constants::{DEFAULT_SNAPSHOT_FILE, DEFAULT_ZERO_REQUEST_DATASETS_FILE};
use crate::error::{CoverageError, Result};
use crate::pipeline::analyze::ReportLimits;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Run configuration as read from a TOML file or assembled from CLI flags.
/// Every path is optional here; [`Config::resolve`] enforces what a run needs.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub dataset_id_fxf_map_file: Option<PathBuf>,
    pub fxf_domain_map_file: Option<PathBuf>,
    pub spandex_dataset_ids: Option<PathBuf>,
    pub logfile_dir: Option<PathBuf>,
    pub logfiles: Vec<PathBuf>,
    pub log_snapshot: Option<PathBuf>,
    pub zero_request_datasets: Option<PathBuf>,
    pub output_file: Option<PathBuf>,
    pub report: ReportLimits,
}

/// Where request events come from
#[derive(Debug, Clone, PartialEq)]
pub enum LogSource {
    /// JSON-lines log exports, extracted and enriched this run
    Raw {
        log_dir: Option<PathBuf>,
        files: Vec<PathBuf>,
    },
    /// A snapshot of enriched events written by an earlier run
    Snapshot(PathBuf),
}

/// Fully resolved inputs and outputs for one run
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub dataset_map_file: PathBuf,
    pub domain_map_file: PathBuf,
    pub indexed_ids_file: PathBuf,
    pub source: LogSource,
    pub zero_request_file: PathBuf,
    pub snapshot_file: PathBuf,
    pub limits: ReportLimits,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CoverageError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load `path` when given, otherwise start from an empty config.
    pub fn load_optional(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn has_log_source(&self) -> bool {
        self.log_snapshot.is_some() || self.logfile_dir.is_some() || !self.logfiles.is_empty()
    }

    /// Layer `overrides` on top of `self`. A log source given in `overrides`
    /// replaces the file's log source as a whole.
    pub fn merge(self, overrides: Config) -> Config {
        let (logfile_dir, logfiles, log_snapshot) = if overrides.has_log_source() {
            (overrides.logfile_dir, overrides.logfiles, overrides.log_snapshot)
        } else {
            (self.logfile_dir, self.logfiles, self.log_snapshot)
        };
        Config {
            dataset_id_fxf_map_file: overrides.dataset_id_fxf_map_file.or(self.dataset_id_fxf_map_file),
            fxf_domain_map_file: overrides.fxf_domain_map_file.or(self.fxf_domain_map_file),
            spandex_dataset_ids: overrides.spandex_dataset_ids.or(self.spandex_dataset_ids),
            logfile_dir,
            logfiles,
            log_snapshot,
            zero_request_datasets: overrides.zero_request_datasets.or(self.zero_request_datasets),
            output_file: overrides.output_file.or(self.output_file),
            report: self.report,
        }
    }

    pub fn resolve(self) -> Result<Settings> {
        let source = match (self.log_snapshot, self.logfile_dir, self.logfiles.is_empty()) {
            (Some(_), dir, no_files) if dir.is_some() || !no_files => {
                return Err(CoverageError::Config(
                    "a log snapshot cannot be combined with raw log files".to_string(),
                ))
            }
            (Some(snapshot), _, _) => LogSource::Snapshot(snapshot),
            (None, None, true) => {
                return Err(CoverageError::MissingInput(
                    "one of logfile_dir, logfile or log_snapshot".to_string(),
                ))
            }
            (None, log_dir, _) => LogSource::Raw {
                log_dir,
                files: self.logfiles,
            },
        };

        Ok(Settings {
            dataset_map_file: required(self.dataset_id_fxf_map_file, "dataset_id_fxf_map_file")?,
            domain_map_file: required(self.fxf_domain_map_file, "fxf_domain_map_file")?,
            indexed_ids_file: required(self.spandex_dataset_ids, "spandex_dataset_ids")?,
            source,
            zero_request_file: self
                .zero_request_datasets
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ZERO_REQUEST_DATASETS_FILE)),
            snapshot_file: self
                .output_file
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SNAPSHOT_FILE)),
            limits: self.report,
        })
    }
}

fn required(value: Option<PathBuf>, name: &str) -> Result<PathBuf> {
    value.ok_or_else(|| CoverageError::MissingInput(name.to_string()))
}
