//! Coverage analysis: compares observed suggestion traffic against the
//! datasets currently indexed in Spandex.
//!
//! Every computation here is a pure reduction over the enriched events and
//! the indexed id set.

use crate::constants::{DEFAULT_TOP_DATASETS, DEFAULT_TOP_DOMAINS, DEFAULT_TOP_UNINDEXED};
use crate::pipeline::processing::enrich::MetadataJoiner;
use crate::types::{EnrichedDataset, EnrichedEvent, IndexedDatasetSet};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, instrument};

/// How many rows each ranked section of the report keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportLimits {
    pub top_datasets: usize,
    pub top_domains: usize,
    pub top_unindexed: usize,
}

impl Default for ReportLimits {
    fn default() -> Self {
        Self {
            top_datasets: DEFAULT_TOP_DATASETS,
            top_domains: DEFAULT_TOP_DOMAINS,
            top_unindexed: DEFAULT_TOP_UNINDEXED,
        }
    }
}

/// A `(key, count)` pair in a frequency ranking
pub type Ranked = Vec<(String, usize)>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageReport {
    pub limits: ReportLimits,
    pub indexed_count: usize,
    pub total_requests: usize,
    pub top_datasets: Ranked,
    pub unique_dataset_count: usize,
    pub zero_traffic: BTreeSet<String>,
    pub zero_traffic_top_domains: Ranked,
    pub unindexed: BTreeSet<String>,
    pub top_unindexed: Ranked,
    pub non_customer_count: usize,
}

/// Count occurrences of each key.
pub fn frequencies<'a, I>(keys: I) -> HashMap<&'a str, usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts = HashMap::new();
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

/// Sort counts descending, ties by key ascending, and keep the first `limit`.
pub fn rank(counts: HashMap<&str, usize>, limit: usize) -> Ranked {
    let mut ranked: Ranked = counts
        .into_iter()
        .map(|(key, count)| (key.to_string(), count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}

/// Distinct dataset ids that received at least one request
pub fn requested_dataset_ids(events: &[EnrichedEvent]) -> BTreeSet<String> {
    events.iter().map(|e| e.dataset_id().to_string()).collect()
}

/// Indexed datasets that received no requests
pub fn zero_traffic(indexed: &IndexedDatasetSet, requested: &BTreeSet<String>) -> BTreeSet<String> {
    indexed.difference(requested).cloned().collect()
}

/// Requested datasets missing from the index
pub fn unindexed(requested: &BTreeSet<String>, indexed: &IndexedDatasetSet) -> BTreeSet<String> {
    requested.difference(indexed).cloned().collect()
}

/// Domain frequencies among enriched datasets. Datasets without a known domain are not counted.
pub fn domain_counts(datasets: &[EnrichedDataset]) -> HashMap<&str, usize> {
    frequencies(
        datasets
            .iter()
            .filter_map(|d| d.metadata.domain_name.as_deref()),
    )
}

/// Datasets whose customer flag is explicitly false. Unknown status is not counted.
pub fn non_customer_count(datasets: &[EnrichedDataset]) -> usize {
    datasets
        .iter()
        .filter(|d| d.metadata.is_customer_domain == Some(false))
        .count()
}

pub struct CoverageAnalyzer<'a> {
    joiner: &'a MetadataJoiner<'a>,
    limits: ReportLimits,
}

impl<'a> CoverageAnalyzer<'a> {
    pub fn new(joiner: &'a MetadataJoiner<'a>, limits: ReportLimits) -> Self {
        Self { joiner, limits }
    }

    #[instrument(skip_all, fields(events = events.len(), indexed = indexed.len()))]
    pub fn analyze(&self, events: &[EnrichedEvent], indexed: &IndexedDatasetSet) -> CoverageReport {
        let dataset_counts = frequencies(events.iter().map(EnrichedEvent::dataset_id));
        let unique_dataset_count = dataset_counts.len();
        let requested = requested_dataset_ids(events);

        let zero_traffic = zero_traffic(indexed, &requested);
        let zero_traffic_datasets = self.joiner.enrich_datasets(&zero_traffic);
        let zero_traffic_top_domains =
            rank(domain_counts(&zero_traffic_datasets), self.limits.top_domains);

        let unindexed = unindexed(&requested, indexed);
        let unindexed_counts = dataset_counts
            .iter()
            .filter(|(id, _)| unindexed.contains(**id))
            .map(|(id, count)| (*id, *count))
            .collect();
        let top_unindexed = rank(unindexed_counts, self.limits.top_unindexed);

        let indexed_datasets = self.joiner.enrich_datasets(indexed);
        let non_customer_count = non_customer_count(&indexed_datasets);

        debug!(
            zero_traffic = zero_traffic.len(),
            unindexed = unindexed.len(),
            non_customer = non_customer_count,
            "Coverage analysis complete"
        );

        CoverageReport {
            limits: self.limits,
            indexed_count: indexed.len(),
            total_requests: events.len(),
            top_datasets: rank(dataset_counts, self.limits.top_datasets),
            unique_dataset_count,
            zero_traffic,
            zero_traffic_top_domains,
            unindexed,
            top_unindexed,
            non_customer_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DatasetMap, DatasetMetadata, DatasetRef, DomainInfo, DomainMap, RequestEvent};
    use chrono::{Local, TimeZone};

    fn event(dataset_id: &str) -> EnrichedEvent {
        EnrichedEvent {
            event: RequestEvent {
                timestamp: Local.timestamp_opt(1_609_459_200, 0).unwrap(),
                dataset_id: dataset_id.to_string(),
                publication_stage: "published".to_string(),
                query_params: Default::default(),
            },
            metadata: DatasetMetadata::default(),
        }
    }

    fn ids(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn dataset(id: &str, fxf: &str) -> (String, DatasetRef) {
        (
            id.to_string(),
            DatasetRef {
                dataset_id: id.to_string(),
                external_id: fxf.to_string(),
                version: "v1".to_string(),
            },
        )
    }

    fn domain(fxf: &str, name: &str, salesforce_id: Option<&str>, deleted_at: Option<&str>) -> (String, DomainInfo) {
        (
            fxf.to_string(),
            DomainInfo {
                external_id: fxf.to_string(),
                domain_name: Some(name.to_string()),
                salesforce_id: salesforce_id.map(str::to_string),
                deleted_at: deleted_at.map(str::to_string),
            },
        )
    }

    #[test]
    fn test_rank_orders_by_count_then_key() {
        let counts = frequencies(["b", "a", "c", "c", "b", "c"]);
        assert_eq!(
            rank(counts, 2),
            vec![("c".to_string(), 3), ("b".to_string(), 2)]
        );
        let tied = frequencies(["z", "y", "x"]);
        assert_eq!(rank(tied, 10)[0].0, "x");
    }

    #[test]
    fn test_coverage_set_identities() {
        let indexed = ids(&["alpha.1", "alpha.2", "alpha.3"]);
        let events = vec![event("alpha.1"), event("alpha.3"), event("bravo.9")];
        let requested = requested_dataset_ids(&events);

        let zero = zero_traffic(&indexed, &requested);
        let missing = unindexed(&requested, &indexed);

        let covered: BTreeSet<String> = requested.intersection(&indexed).cloned().collect();
        assert_eq!(zero.union(&covered).cloned().collect::<BTreeSet<_>>(), indexed);
        assert!(zero.is_disjoint(&requested));
        assert!(missing.is_disjoint(&indexed));
        assert_eq!(missing, ids(&["bravo.9"]));
    }

    #[test]
    fn test_analyze_reports_all_sections() {
        let datasets: DatasetMap = [
            dataset("alpha.1", "fxf1"),
            dataset("alpha.2", "fxf2"),
            dataset("alpha.3", "fxf3"),
            dataset("alpha.4", "fxf4"),
            dataset("alpha.5", "fxf5"),
        ]
        .into_iter()
        .collect();
        let domains: DomainMap = [
            domain("fxf1", "example.com", Some("SF1"), None),
            domain("fxf2", "example.com", Some("SF1"), None),
            domain("fxf3", "stale.org", Some("SF3"), Some("2018-01-01")),
            domain("fxf4", "stale.org", None, None),
        ]
        .into_iter()
        .collect();
        let joiner = MetadataJoiner::new(&datasets, &domains);
        let analyzer = CoverageAnalyzer::new(&joiner, ReportLimits::default());

        let indexed = ids(&["alpha.1", "alpha.2", "alpha.3", "alpha.4", "alpha.5"]);
        let events = vec![
            event("alpha.1"),
            event("alpha.1"),
            event("bravo.7"),
            event("bravo.7"),
            event("bravo.7"),
            event("bravo.8"),
        ];
        let report = analyzer.analyze(&events, &indexed);

        assert_eq!(report.indexed_count, 5);
        assert_eq!(report.total_requests, 6);
        assert_eq!(report.unique_dataset_count, 3);
        assert_eq!(report.top_datasets[0], ("bravo.7".to_string(), 3));
        assert_eq!(report.zero_traffic, ids(&["alpha.2", "alpha.3", "alpha.4", "alpha.5"]));
        assert_eq!(
            report.zero_traffic_top_domains,
            vec![("stale.org".to_string(), 2), ("example.com".to_string(), 1)]
        );
        assert_eq!(report.unindexed, ids(&["bravo.7", "bravo.8"]));
        assert_eq!(
            report.top_unindexed,
            vec![("bravo.7".to_string(), 3), ("bravo.8".to_string(), 1)]
        );
        // only alpha.3 has a sales account and a deletion date
        assert_eq!(report.non_customer_count, 1);
    }

    #[test]
    fn test_limits_truncate_rankings() {
        let datasets = DatasetMap::new();
        let domains = DomainMap::new();
        let joiner = MetadataJoiner::new(&datasets, &domains);
        let limits = ReportLimits {
            top_datasets: 1,
            top_domains: 1,
            top_unindexed: 1,
        };
        let analyzer = CoverageAnalyzer::new(&joiner, limits);

        let events = vec![event("bravo.1"), event("bravo.2"), event("bravo.2")];
        let report = analyzer.analyze(&events, &IndexedDatasetSet::new());

        assert_eq!(report.top_datasets, vec![("bravo.2".to_string(), 2)]);
        assert_eq!(report.top_unindexed, vec![("bravo.2".to_string(), 2)]);
        assert_eq!(report.unindexed.len(), 2);
        assert!(report.zero_traffic.is_empty());
    }
}
