use anyhow::Result;
use serde_json::json;
use spandex_coverage::config::{Config, LogSource, Settings};
use spandex_coverage::error::CoverageError;
use spandex_coverage::gateway::read_snapshot;
use spandex_coverage::pipeline::analyze::ReportLimits;
use spandex_coverage::pipeline::processing::extract::SkipReason;
use spandex_coverage::pipeline::Pipeline;
use spandex_coverage::report;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write_fixtures(root: &Path, log_lines: &[serde_json::Value]) -> Result<Settings> {
    fs::write(
        root.join("datasets.tsv"),
        "alpha.1\tfxf1-aaaa\tv1\nalpha.2\tfxf2-bbbb\tv1\n",
    )?;
    fs::write(root.join("domains.tsv"), "fxf1-aaaa\texample.com\tSF1\n")?;
    fs::write(root.join("spandex_ids.txt"), "alpha.1\nalpha.2\n")?;

    let log_dir = root.join("logs");
    fs::create_dir_all(&log_dir)?;
    let body: String = log_lines.iter().map(|v| format!("{}\n", v)).collect();
    fs::write(log_dir.join("spandex_requests_2021-01-01.json"), body)?;

    Ok(Settings {
        dataset_map_file: root.join("datasets.tsv"),
        domain_map_file: root.join("domains.tsv"),
        indexed_ids_file: root.join("spandex_ids.txt"),
        source: LogSource::Raw {
            log_dir: Some(log_dir),
            files: vec![],
        },
        zero_request_file: root.join("zero.txt"),
        snapshot_file: root.join("out").join("logs.ndjson"),
        limits: ReportLimits::default(),
    })
}

#[test]
fn test_single_request_end_to_end() -> Result<()> {
    let temp_dir = tempdir()?;
    let settings = write_fixtures(
        temp_dir.path(),
        &[json!({
            "_raw": "INFO request GET /suggest/alpha.1/published/ab12-cd34 took 12ms",
            "_messagetime": "1609459200000"
        })],
    )?;

    let result = Pipeline::run(&settings)?;
    let coverage = &result.report;

    assert_eq!(coverage.total_requests, 1);
    assert_eq!(coverage.top_datasets, vec![("alpha.1".to_string(), 1)]);
    assert_eq!(coverage.zero_traffic.iter().collect::<Vec<_>>(), vec!["alpha.2"]);
    assert!(coverage.unindexed.is_empty());
    // fxf2-bbbb has no domain row, so nothing to rank
    assert!(coverage.zero_traffic_top_domains.is_empty());
    assert_eq!(coverage.non_customer_count, 0);

    assert_eq!(fs::read_to_string(&settings.zero_request_file)?, "alpha.2\n");

    let snapshot = read_snapshot(&settings.snapshot_file)?;
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].event.timestamp.timestamp(), 1_609_459_200);
    assert_eq!(snapshot[0].metadata.domain_name.as_deref(), Some("example.com"));
    assert_eq!(snapshot[0].metadata.is_customer_domain, Some(true));

    let text = report::render(&result);
    assert!(text.contains("Found 2 datasets in the Spandex index"));
    assert!(text.contains("1 datasets in Spandex received 0 suggest requests"));
    Ok(())
}

#[test]
fn test_bad_records_are_skipped_not_fatal() -> Result<()> {
    let temp_dir = tempdir()?;
    let settings = write_fixtures(
        temp_dir.path(),
        &[
            json!({"_raw": "GET /other/path", "_messagetime": "1609459200000"}),
            json!({"_raw": "GET /suggest/bravo.9/published/ab12-cd34?text=foo", "_messagetime": 1609459260000u64}),
            json!({"_raw": "GET /suggest/alpha.1/published/ab12-cd34"}),
        ],
    )?;

    let result = Pipeline::run(&settings)?;
    let stats = result.extraction.as_ref().expect("raw run has extraction stats");

    assert_eq!(stats.records_read, 3);
    assert_eq!(stats.events, 1);
    assert_eq!(stats.skipped[&SkipReason::NoRequestMatch], 1);
    assert_eq!(stats.skipped[&SkipReason::MissingFields], 1);

    assert_eq!(result.report.unindexed.len(), 1);
    assert_eq!(result.report.top_unindexed, vec![("bravo.9".to_string(), 1)]);
    assert_eq!(result.report.zero_traffic.len(), 2);
    Ok(())
}

#[test]
fn test_mistyped_records_do_not_abort_the_run() -> Result<()> {
    let temp_dir = tempdir()?;
    let settings = write_fixtures(
        temp_dir.path(),
        &[
            json!({"_raw": "GET /suggest/alpha.1/published/ab12-cd34", "_messagetime": "1609459200"}),
            json!({"_raw": 42, "_messagetime": "1609459200"}),
            json!([1, 2]),
        ],
    )?;

    let result = Pipeline::run(&settings)?;
    let stats = result.extraction.as_ref().expect("raw run has extraction stats");

    assert_eq!(stats.records_read, 3);
    assert_eq!(stats.events, 1);
    assert_eq!(stats.skipped[&SkipReason::MissingFields], 2);
    assert_eq!(result.report.top_datasets, vec![("alpha.1".to_string(), 1)]);
    Ok(())
}

#[test]
fn test_snapshot_run_skips_extraction() -> Result<()> {
    let temp_dir = tempdir()?;
    let settings = write_fixtures(
        temp_dir.path(),
        &[json!({
            "_raw": "GET /suggest/alpha.2/published/ab12-cd34",
            "_messagetime": "1609459200"
        })],
    )?;
    let first = Pipeline::run(&settings)?;

    let replay = Settings {
        source: LogSource::Snapshot(settings.snapshot_file.clone()),
        snapshot_file: temp_dir.path().join("unused.ndjson"),
        ..settings.clone()
    };
    let second = Pipeline::run(&replay)?;

    assert!(second.extraction.is_none());
    assert!(second.snapshot_file.is_none());
    assert!(!replay.snapshot_file.exists());
    assert_eq!(first.report, second.report);
    Ok(())
}

#[test]
fn test_malformed_dataset_table_aborts() -> Result<()> {
    let temp_dir = tempdir()?;
    let settings = write_fixtures(temp_dir.path(), &[])?;
    fs::write(&settings.dataset_map_file, "alpha.1\tfxf1-aaaa\n")?;

    let err = Pipeline::run(&settings).unwrap_err();
    assert!(matches!(err, CoverageError::MalformedRow { .. }));
    assert!(!settings.zero_request_file.exists());
    Ok(())
}

#[test]
fn test_config_file_resolves_to_settings() -> Result<()> {
    let temp_dir = tempdir()?;
    let path = temp_dir.path().join("coverage.toml");
    fs::write(
        &path,
        r#"
        dataset_id_fxf_map_file = "datasets.tsv"
        fxf_domain_map_file = "domains.tsv"
        spandex_dataset_ids = "ids.txt"
        logfile_dir = "logs"

        [report]
        top_datasets = 10
        "#,
    )?;

    let settings = Config::load(&path)?.resolve()?;
    assert_eq!(settings.limits.top_datasets, 10);
    assert_eq!(settings.limits.top_unindexed, 20);
    assert!(matches!(settings.source, LogSource::Raw { .. }));
    Ok(())
}
