//! Coverage Phase Metrics
//!
//! Gauges mirroring the headline numbers of the coverage report.

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};
use crate::pipeline::analyze::CoverageReport;

/// Metrics collection for the coverage analysis phase
pub struct CoverageMetrics;

impl CoverageMetrics {
    pub fn record_report(report: &CoverageReport) {
        ::metrics::gauge!(phase_metric!(gauge, "coverage", "indexed_datasets"))
            .set(report.indexed_count as f64);
        ::metrics::gauge!(phase_metric!(gauge, "coverage", "requests"))
            .set(report.total_requests as f64);
        ::metrics::gauge!(phase_metric!(gauge, "coverage", "requested_datasets"))
            .set(report.unique_dataset_count as f64);
        ::metrics::gauge!(phase_metric!(gauge, "coverage", "zero_traffic_datasets"))
            .set(report.zero_traffic.len() as f64);
        ::metrics::gauge!(phase_metric!(gauge, "coverage", "unindexed_datasets"))
            .set(report.unindexed.len() as f64);
        ::metrics::gauge!(phase_metric!(gauge, "coverage", "non_customer_datasets"))
            .set(report.non_customer_count as f64);
    }
}

impl PhaseMetrics for CoverageMetrics {
    fn register_metrics() {
        use metrics::gauge;

        let _ = gauge!(phase_metric!(gauge, "coverage", "indexed_datasets"));
        let _ = gauge!(phase_metric!(gauge, "coverage", "requests"));
        let _ = gauge!(phase_metric!(gauge, "coverage", "requested_datasets"));
        let _ = gauge!(phase_metric!(gauge, "coverage", "zero_traffic_datasets"));
        let _ = gauge!(phase_metric!(gauge, "coverage", "unindexed_datasets"));
        let _ = gauge!(phase_metric!(gauge, "coverage", "non_customer_datasets"));
    }

    fn phase_name() -> &'static str {
        "coverage"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(gauge, "coverage", "indexed_datasets"),
                metric_type: MetricType::Gauge,
                help: "Datasets present in the Spandex index",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(gauge, "coverage", "requests"),
                metric_type: MetricType::Gauge,
                help: "Suggestion requests in the analyzed log window",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(gauge, "coverage", "requested_datasets"),
                metric_type: MetricType::Gauge,
                help: "Distinct datasets receiving at least one request",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(gauge, "coverage", "zero_traffic_datasets"),
                metric_type: MetricType::Gauge,
                help: "Indexed datasets receiving no requests",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(gauge, "coverage", "unindexed_datasets"),
                metric_type: MetricType::Gauge,
                help: "Requested datasets missing from the index",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(gauge, "coverage", "non_customer_datasets"),
                metric_type: MetricType::Gauge,
                help: "Indexed datasets belonging to non-customer domains",
                labels: vec![],
            },
        ]
    }
}
