//! Defaults and fixed shapes shared by the CLI, config loader and pipeline.

// Output files
pub const DEFAULT_ZERO_REQUEST_DATASETS_FILE: &str = "spandex_zero_request_datasets.txt";
pub const DEFAULT_SNAPSHOT_FILE: &str = "spandex_logs.ndjson";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const LOG_FILE_NAME: &str = "coverage.log";

// Config file lookup
pub const CONFIG_ENV_VAR: &str = "SPANDEX_COVERAGE_CONFIG";

// Report limits
pub const DEFAULT_TOP_DATASETS: usize = 100;
pub const DEFAULT_TOP_DOMAINS: usize = 100;
pub const DEFAULT_TOP_UNINDEXED: usize = 20;

/// Number of leading characters of `_messagetime` that hold epoch seconds
pub const EPOCH_SECONDS_DIGITS: usize = 10;

// Reference table shapes
pub const DATASET_TABLE_MIN_FIELDS: usize = 3;
pub const DOMAIN_TABLE_FIELDS: usize = 4;
