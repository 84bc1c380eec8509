// Coverage pipeline: reference-table and log ingestion, extraction and
// enrichment, then coverage analysis over the pooled events.

pub mod analyze;
pub mod ingestion;
pub mod processing;

use crate::config::{LogSource, Settings};
use crate::error::Result;
use crate::gateway::{read_snapshot, write_id_list, write_snapshot};
use crate::metrics::CoverageMetrics;
use crate::pipeline::analyze::{CoverageAnalyzer, CoverageReport};
use crate::pipeline::ingestion::log_reader::LogReader;
use crate::pipeline::ingestion::metadata::{load_dataset_map, load_domain_map, load_indexed_ids};
use crate::pipeline::processing::enrich::MetadataJoiner;
use crate::pipeline::processing::extract::{extract_all, SkipReason};
use crate::types::EnrichedEvent;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

/// Record counts from the extraction stage of a raw-log run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionStats {
    pub files_read: usize,
    pub records_read: usize,
    pub events: usize,
    pub skipped: BTreeMap<SkipReason, usize>,
}

/// Result of a complete pipeline run
#[derive(Debug, Serialize)]
pub struct PipelineResult {
    pub report: CoverageReport,
    /// `None` when events came from a snapshot
    pub extraction: Option<ExtractionStats>,
    pub zero_request_file: PathBuf,
    pub snapshot_file: Option<PathBuf>,
}

pub struct Pipeline;

impl Pipeline {
    /// Load reference tables and events, analyze coverage and write the output files.
    #[instrument(skip_all)]
    pub fn run(settings: &Settings) -> Result<PipelineResult> {
        let datasets = load_dataset_map(&settings.dataset_map_file)?;
        let domains = load_domain_map(&settings.domain_map_file)?;
        let indexed = load_indexed_ids(&settings.indexed_ids_file)?;
        let joiner = MetadataJoiner::new(&datasets, &domains);

        let (events, extraction) = match &settings.source {
            LogSource::Snapshot(path) => (read_snapshot(path)?, None),
            LogSource::Raw { log_dir, files } => {
                let reader = LogReader::from_sources(log_dir.as_deref(), files)?;
                let (events, stats) = Self::extract_events(&reader, &joiner)?;
                (events, Some(stats))
            }
        };
        info!("Found {} suggest requests", events.len());

        let report = CoverageAnalyzer::new(&joiner, settings.limits).analyze(&events, &indexed);
        CoverageMetrics::record_report(&report);

        write_id_list(&settings.zero_request_file, &report.zero_traffic)?;

        let snapshot_file = if extraction.is_some() {
            info!("Writing enriched events snapshot to {}", settings.snapshot_file.display());
            write_snapshot(&settings.snapshot_file, &events)?;
            Some(settings.snapshot_file.clone())
        } else {
            None
        };

        Ok(PipelineResult {
            report,
            extraction,
            zero_request_file: settings.zero_request_file.clone(),
            snapshot_file,
        })
    }

    /// Read every log file, extract request events and enrich them.
    pub fn extract_events(
        reader: &LogReader,
        joiner: &MetadataJoiner,
    ) -> Result<(Vec<EnrichedEvent>, ExtractionStats)> {
        let messages = reader.read_all()?;
        let summary = extract_all(&messages);

        if summary.skipped_total() > 0 {
            warn!(
                "Skipped {} of {} log records",
                summary.skipped_total(),
                summary.records_read
            );
        }

        let stats = ExtractionStats {
            files_read: reader.files().len(),
            records_read: summary.records_read,
            events: summary.events.len(),
            skipped: summary.skipped,
        };
        let events = summary
            .events
            .into_iter()
            .map(|event| joiner.enrich_event(event))
            .collect();
        Ok((events, stats))
    }
}
