//! Run metrics for the coverage pipeline
//!
//! Each pipeline phase defines its own metrics in a dedicated submodule. The
//! job is short-lived, so instead of serving a scrape endpoint the recorder is
//! installed in-process and its Prometheus text rendering can be written to a
//! file at the end of the run (node_exporter textfile style).

pub mod coverage;
pub mod extract;
pub mod metadata;
pub mod registry;

pub use coverage::CoverageMetrics;
pub use extract::ExtractMetrics;
pub use metadata::MetadataMetrics;

use crate::error::{CoverageError, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::path::Path;
use std::sync::{Once, OnceLock};
use tracing::{info, warn};

static INIT: Once = Once::new();
static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus recorder and register all phase metrics.
///
/// Idempotent.
pub fn init_metrics() {
    INIT.call_once(|| match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if HANDLE.set(handle).is_err() {
                warn!("Metrics handle was already set");
            }
            registry::register_all_metrics();
            info!("Prometheus recorder installed");
        }
        Err(e) => {
            warn!("Failed to install Prometheus recorder: {}", e);
        }
    });
}

/// Render the current metrics snapshot in Prometheus text format
pub fn render() -> Option<String> {
    HANDLE.get().map(PrometheusHandle::render)
}

/// Write the rendered metrics to `path`. No-op when no recorder is installed.
pub fn write_to_file(path: &Path) -> Result<()> {
    match render() {
        Some(text) => {
            std::fs::write(path, text).map_err(|e| CoverageError::io(path, e))?;
            info!("Wrote run metrics to {}", path.display());
        }
        None => warn!("Metrics recorder not installed; skipping {}", path.display()),
    }
    Ok(())
}

/// Trait for phase-specific metrics collections
pub trait PhaseMetrics {
    /// Register all metrics for this phase
    fn register_metrics();

    /// Get the phase name for prefixing metrics
    fn phase_name() -> &'static str;

    /// Get documentation for all metrics in this phase
    fn metrics_documentation() -> Vec<MetricDoc>;
}

/// Documentation for a single metric
#[derive(Debug, Clone)]
pub struct MetricDoc {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub help: &'static str,
    #[allow(dead_code)]
    pub labels: Vec<&'static str>,
}

#[derive(Debug, Clone)]
pub enum MetricType {
    Counter,
    Gauge,
}

/// Builds metric names as `spandex_{phase}_{metric_name}[_total]`
macro_rules! phase_metric {
    (counter, $phase:literal, $name:literal) => {
        concat!("spandex_", $phase, "_", $name, "_total")
    };
    (gauge, $phase:literal, $name:literal) => {
        concat!("spandex_", $phase, "_", $name)
    };
}

pub(crate) use phase_metric;
