//! Metadata Phase Metrics
//!
//! Row counts for the reference tables loaded at startup.

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

/// Metrics collection for the metadata loading phase
pub struct MetadataMetrics;

impl MetadataMetrics {
    /// Record the number of rows loaded from one reference table
    pub fn record_rows_loaded(table: &'static str, rows: usize) {
        ::metrics::counter!(phase_metric!(counter, "metadata", "rows_loaded"), "table" => table)
            .increment(rows as u64);
    }

    /// Record a short domain row that was padded
    pub fn record_padded_row() {
        ::metrics::counter!(phase_metric!(counter, "metadata", "padded_rows")).increment(1);
    }
}

impl PhaseMetrics for MetadataMetrics {
    fn register_metrics() {
        use metrics::counter;

        let _ = counter!(phase_metric!(counter, "metadata", "rows_loaded"));
        let _ = counter!(phase_metric!(counter, "metadata", "padded_rows"));
    }

    fn phase_name() -> &'static str {
        "metadata"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "metadata", "rows_loaded"),
                metric_type: MetricType::Counter,
                help: "Rows loaded from reference tables",
                labels: vec!["table"],
            },
            MetricDoc {
                name: phase_metric!(counter, "metadata", "padded_rows"),
                metric_type: MetricType::Counter,
                help: "Domain table rows with fewer than four fields",
                labels: vec![],
            },
        ]
    }
}
