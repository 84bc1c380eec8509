use crate::types::{
    DatasetMap, DatasetMetadata, DomainMap, EnrichedDataset, EnrichedEvent, RequestEvent,
};
use tracing::trace;

/// Join a dataset id against the reference tables.
///
/// Never fails: unknown dataset ids and external ids leave the corresponding
/// fields unset.
pub fn enrich(dataset_id: &str, dataset_map: &DatasetMap, domain_map: &DomainMap) -> DatasetMetadata {
    let Some(dataset) = dataset_map.get(dataset_id) else {
        trace!("No dataset reference for {}", dataset_id);
        return DatasetMetadata::default();
    };

    let domain = domain_map.get(&dataset.external_id);
    DatasetMetadata {
        external_id: Some(dataset.external_id.clone()),
        version: Some(dataset.version.clone()),
        domain_name: domain.and_then(|d| d.domain_name.clone()),
        salesforce_id: domain.and_then(|d| d.salesforce_id.clone()),
        domain_deleted_at: domain.and_then(|d| d.deleted_at.clone()),
        is_customer_domain: domain.and_then(|d| d.customer_status()),
    }
}

/// Enriches request events and bare dataset ids from the loaded reference tables
pub struct MetadataJoiner<'a> {
    datasets: &'a DatasetMap,
    domains: &'a DomainMap,
}

impl<'a> MetadataJoiner<'a> {
    pub fn new(datasets: &'a DatasetMap, domains: &'a DomainMap) -> Self {
        Self { datasets, domains }
    }

    pub fn metadata(&self, dataset_id: &str) -> DatasetMetadata {
        enrich(dataset_id, self.datasets, self.domains)
    }

    pub fn enrich_event(&self, event: RequestEvent) -> EnrichedEvent {
        let metadata = self.metadata(&event.dataset_id);
        EnrichedEvent { event, metadata }
    }

    pub fn enrich_dataset(&self, dataset_id: &str) -> EnrichedDataset {
        EnrichedDataset {
            dataset_id: dataset_id.to_string(),
            metadata: self.metadata(dataset_id),
        }
    }

    pub fn enrich_datasets<'i, I>(&self, dataset_ids: I) -> Vec<EnrichedDataset>
    where
        I: IntoIterator<Item = &'i String>,
    {
        dataset_ids
            .into_iter()
            .map(|id| self.enrich_dataset(id))
            .collect()
    }
}
