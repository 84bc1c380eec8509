//! Extract Phase Metrics
//!
//! Log records read, request events produced and records skipped by reason.

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

/// Metrics collection for the extraction phase
pub struct ExtractMetrics;

impl ExtractMetrics {
    pub fn record_file_read(records: usize) {
        ::metrics::counter!(phase_metric!(counter, "extract", "files_read")).increment(1);
        ::metrics::counter!(phase_metric!(counter, "extract", "records_read"))
            .increment(records as u64);
    }

    pub fn record_event() {
        ::metrics::counter!(phase_metric!(counter, "extract", "events")).increment(1);
    }

    pub fn record_skip(reason: &'static str) {
        ::metrics::counter!(phase_metric!(counter, "extract", "skipped"), "reason" => reason)
            .increment(1);
    }
}

impl PhaseMetrics for ExtractMetrics {
    fn register_metrics() {
        use metrics::counter;

        let _ = counter!(phase_metric!(counter, "extract", "files_read"));
        let _ = counter!(phase_metric!(counter, "extract", "records_read"));
        let _ = counter!(phase_metric!(counter, "extract", "events"));
        let _ = counter!(phase_metric!(counter, "extract", "skipped"));
    }

    fn phase_name() -> &'static str {
        "extract"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "extract", "files_read"),
                metric_type: MetricType::Counter,
                help: "Log files read",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "extract", "records_read"),
                metric_type: MetricType::Counter,
                help: "Log records read from all files",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "extract", "events"),
                metric_type: MetricType::Counter,
                help: "Suggestion request events extracted",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(counter, "extract", "skipped"),
                metric_type: MetricType::Counter,
                help: "Log records skipped during extraction",
                labels: vec!["reason"],
            },
        ]
    }
}
