//! Newline-delimited JSON snapshot of the enriched event collection, so a
//! later run can skip log extraction.

use crate::error::{CoverageError, Result};
use crate::types::EnrichedEvent;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Write one JSON object per event, replacing any existing file
pub fn write_snapshot(path: &Path, events: &[EnrichedEvent]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| CoverageError::io(parent, e))?;
    }
    let file = File::create(path).map_err(|e| CoverageError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    for event in events {
        let line = serde_json::to_string(event)?;
        writeln!(writer, "{}", line).map_err(|e| CoverageError::io(path, e))?;
    }
    writer.flush().map_err(|e| CoverageError::io(path, e))?;
    info!("Wrote {} enriched events to {}", events.len(), path.display());
    Ok(())
}

pub fn read_snapshot(path: &Path) -> Result<Vec<EnrichedEvent>> {
    let file = File::open(path).map_err(|e| CoverageError::io(path, e))?;
    let mut events = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| CoverageError::io(path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        let event = serde_json::from_str(&line).map_err(|source| CoverageError::Snapshot {
            path: path.to_path_buf(),
            line: idx + 1,
            source,
        })?;
        events.push(event);
    }
    info!("Read {} enriched events from {}", events.len(), path.display());
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DatasetMetadata, RequestEvent};
    use chrono::{Local, TimeZone};
    use tempfile::tempdir;

    fn sample() -> EnrichedEvent {
        EnrichedEvent {
            event: RequestEvent {
                timestamp: Local.timestamp_opt(1_609_459_200, 0).unwrap(),
                dataset_id: "alpha.1".to_string(),
                publication_stage: "published".to_string(),
                query_params: [("text".to_string(), vec!["new york".to_string()])].into(),
            },
            metadata: DatasetMetadata {
                external_id: Some("fxf1-aaaa".to_string()),
                version: Some("v1".to_string()),
                domain_name: None,
                salesforce_id: None,
                domain_deleted_at: None,
                is_customer_domain: None,
            },
        }
    }

    #[test]
    fn test_snapshot_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("logs.ndjson");
        let events = vec![sample(), sample()];

        write_snapshot(&path, &events).unwrap();
        assert_eq!(read_snapshot(&path).unwrap(), events);
    }

    #[test]
    fn test_snapshot_lines_are_flat_records() {
        let line = serde_json::to_value(sample()).unwrap();
        assert_eq!(line["dataset_id"], "alpha.1");
        assert_eq!(line["external_id"], "fxf1-aaaa");
        assert!(line["is_customer_domain"].is_null());
    }

    #[test]
    fn test_corrupt_snapshot_reports_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs.ndjson");
        fs::write(&path, "{\"dataset_id\": \"alpha.1\"}\n").unwrap();

        match read_snapshot(&path).unwrap_err() {
            CoverageError::Snapshot { line, .. } => assert_eq!(line, 1),
            other => panic!("unexpected error: {other}"),
        }
    }
}
