use crate::error::{CoverageError, Result};
use crate::metrics::ExtractMetrics;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One exported log record (a JSON object per line, as written by the Sumo Logic scrape).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogMessage {
    #[serde(rename = "_raw", default, deserialize_with = "string_only")]
    pub raw: Option<String>,
    #[serde(
        rename = "_messagetime",
        default,
        deserialize_with = "string_or_number"
    )]
    pub message_time: Option<String>,
}

impl LogMessage {
    pub fn new(raw: impl Into<String>, message_time: impl Into<String>) -> Self {
        Self {
            raw: Some(raw.into()),
            message_time: Some(message_time.into()),
        }
    }
}

// `_messagetime` is normally a string but some exports emit a bare number
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

// a non-string `_raw` is treated as absent so the record is skipped downstream
fn string_only<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        _ => None,
    })
}

/// Reads request-log files, newest first.
pub struct LogReader {
    files: Vec<PathBuf>,
}

impl LogReader {
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self { files }
    }

    /// Collect the files of `log_dir` (sorted by name, descending) followed by any explicit files.
    pub fn from_sources(log_dir: Option<&Path>, explicit: &[PathBuf]) -> Result<Self> {
        let mut files = Vec::new();
        if let Some(dir) = log_dir {
            files.extend(list_log_dir(dir)?);
        }
        files.extend(explicit.iter().cloned());
        if files.is_empty() {
            return Err(CoverageError::MissingInput(
                "no request log files found".to_string(),
            ));
        }
        info!(
            "Reading logfiles: {:?}",
            files.iter().map(|p| p.display().to_string()).collect::<Vec<_>>()
        );
        Ok(Self::new(files))
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Read every record of every file, in file order.
    pub fn read_all(&self) -> Result<Vec<LogMessage>> {
        let mut messages = Vec::new();
        for path in &self.files {
            messages.extend(read_log_file(path)?);
        }
        Ok(messages)
    }
}

fn list_log_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| CoverageError::io(dir, e))? {
        let path = entry.map_err(|e| CoverageError::io(dir, e))?.path();
        if path.is_file() {
            files.push(path);
        } else {
            debug!("Skipping non-file entry {}", path.display());
        }
    }
    files.sort_by(|a, b| b.cmp(a));
    Ok(files)
}

/// Read a JSON-lines file of request logs. Blank lines are ignored and a line
/// that is not JSON aborts the run. JSON values that are not objects yield an
/// empty message, which extraction skips.
pub fn read_log_file(path: &Path) -> Result<Vec<LogMessage>> {
    info!("Reading request logs from {}", path.display());
    let file = File::open(path).map_err(|e| CoverageError::io(path, e))?;
    let reader = BufReader::new(file);

    let mut messages = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| CoverageError::io(path, e))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let line_error = |source| CoverageError::LogLine {
            path: path.to_path_buf(),
            line: idx + 1,
            source,
        };
        let value = serde_json::from_str::<serde_json::Value>(line).map_err(line_error)?;
        let message = if value.is_object() {
            serde_json::from_value::<LogMessage>(value).map_err(line_error)?
        } else {
            debug!("Non-object record at {}:{}", path.display(), idx + 1);
            LogMessage::default()
        };
        messages.push(message);
    }
    ExtractMetrics::record_file_read(messages.len());
    debug!("Read {} records from {}", messages.len(), path.display());
    Ok(messages)
}
