//! Registers the metrics of every phase and detects name conflicts early.

use crate::metrics::{MetricDoc, PhaseMetrics};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Register all metrics from all phases
pub fn register_all_metrics() {
    let mut all_metrics = HashMap::new();

    register_phase_metrics::<super::metadata::MetadataMetrics>(&mut all_metrics);
    register_phase_metrics::<super::extract::ExtractMetrics>(&mut all_metrics);
    register_phase_metrics::<super::coverage::CoverageMetrics>(&mut all_metrics);

    info!(
        "Registered {} total metrics across all phases",
        all_metrics.len()
    );
}

fn register_phase_metrics<T: PhaseMetrics>(all_metrics: &mut HashMap<&'static str, MetricDoc>) {
    T::register_metrics();
    let phase_name = T::phase_name();

    for doc in T::metrics_documentation() {
        if all_metrics.contains_key(doc.name) {
            warn!(
                "Metric name conflict detected: '{}' redefined by phase '{}'",
                doc.name, phase_name
            );
            continue;
        }
        debug!(
            "Registered {} ({:?}) for phase '{}': {}",
            doc.name, doc.metric_type, phase_name, doc.help
        );
        all_metrics.insert(doc.name, doc);
    }
}
