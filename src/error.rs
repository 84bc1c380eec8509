use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoverageError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed row at {}:{line}: expected at least {expected} tab-separated fields, found {found}", path.display())]
    MalformedRow {
        path: PathBuf,
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Invalid JSON in log file {}:{line}: {source}", path.display())]
    LogLine {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid snapshot record at {}:{line}: {source}", path.display())]
    Snapshot {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cannot open run log in {}: {source}", path.display())]
    LogSetup {
        path: PathBuf,
        #[source]
        source: tracing_appender::rolling::InitError,
    },

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing required input: {0}")]
    MissingInput(String),
}

impl CoverageError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CoverageError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoverageError>;
