//! Plain-text rendering of a pipeline run for stdout.

use crate::pipeline::analyze::{CoverageReport, Ranked};
use crate::pipeline::{ExtractionStats, PipelineResult};
use std::fmt::{self, Write};

fn write_ranked(out: &mut String, rows: &Ranked, key_header: &str, count_header: &str) -> fmt::Result {
    if rows.is_empty() {
        return writeln!(out, "  (none)");
    }
    let width = rows
        .iter()
        .map(|(key, _)| key.len())
        .chain(std::iter::once(key_header.len()))
        .max()
        .unwrap_or(0);
    writeln!(out, "  {:<width$}  {}", key_header, count_header, width = width)?;
    for (key, count) in rows {
        writeln!(out, "  {:<width$}  {}", key, count, width = width)?;
    }
    Ok(())
}

fn write_extraction(out: &mut String, stats: &ExtractionStats) -> fmt::Result {
    writeln!(
        out,
        "Read {} log records from {} files; extracted {} requests",
        stats.records_read, stats.files_read, stats.events
    )?;
    for (reason, count) in &stats.skipped {
        writeln!(out, "  skipped ({}): {}", reason, count)?;
    }
    Ok(())
}

fn write_coverage(out: &mut String, report: &CoverageReport) -> fmt::Result {
    writeln!(out, "Found {} suggest requests", report.total_requests)?;
    writeln!(out)?;

    writeln!(out, "Top datasets by request count")?;
    write_ranked(out, &report.top_datasets, "dataset_id", "requests")?;
    writeln!(
        out,
        "Number of unique datasets receiving suggestion requests: {}",
        report.unique_dataset_count
    )?;
    writeln!(out)?;

    writeln!(
        out,
        "{} datasets in Spandex received 0 suggest requests",
        report.zero_traffic.len()
    )?;
    writeln!(out, "Top domains among datasets receiving zero requests")?;
    write_ranked(out, &report.zero_traffic_top_domains, "domain", "datasets")?;
    writeln!(out)?;

    writeln!(
        out,
        "{} datasets that are missing from Spandex received one or more suggest requests",
        report.unindexed.len()
    )?;
    writeln!(
        out,
        "Top {} datasets that are missing from Spandex by request count",
        report.limits.top_unindexed
    )?;
    write_ranked(out, &report.top_unindexed, "dataset_id", "request_count")?;
    writeln!(out)?;

    writeln!(
        out,
        "{} / {} datasets in Spandex are from non-customer domains",
        report.non_customer_count, report.indexed_count
    )
}

/// Render the full human-readable report
pub fn render(result: &PipelineResult) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = render_into(&mut out, result);
    out
}

fn render_into(out: &mut String, result: &PipelineResult) -> fmt::Result {
    writeln!(
        out,
        "Found {} datasets in the Spandex index",
        result.report.indexed_count
    )?;
    if let Some(stats) = &result.extraction {
        write_extraction(out, stats)?;
    }
    write_coverage(out, &result.report)?;
    writeln!(out)?;
    writeln!(
        out,
        "Zero-request dataset ids written to {}",
        result.zero_request_file.display()
    )?;
    if let Some(path) = &result.snapshot_file {
        writeln!(out, "Enriched request snapshot written to {}", path.display())?;
    }
    Ok(())
}
