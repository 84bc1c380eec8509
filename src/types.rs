use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Query-string parameters decoded from a suggestion request path
pub type QueryParams = BTreeMap<String, Vec<String>>;

/// Dataset reference keyed by dataset id
pub type DatasetMap = HashMap<String, DatasetRef>;

/// Domain metadata keyed by external id (fxf)
pub type DomainMap = HashMap<String, DomainInfo>;

/// Dataset ids currently present in the Spandex index
pub type IndexedDatasetSet = BTreeSet<String>;

/// One row of the dataset reference table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetRef {
    pub dataset_id: String,
    pub external_id: String,
    pub version: String,
}

/// One row of the domain reference table. Short rows leave trailing fields unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainInfo {
    pub external_id: String,
    pub domain_name: Option<String>,
    pub salesforce_id: Option<String>,
    pub deleted_at: Option<String>,
}

impl DomainInfo {
    /// A customer domain has a sales account and has not been deleted.
    pub fn is_customer_domain(&self) -> bool {
        self.customer_status() == Some(true)
    }

    /// Tri-state customer flag carried on enriched records.
    ///
    /// `None` when there is no sales account to judge by, otherwise whether the
    /// domain is still live.
    pub fn customer_status(&self) -> Option<bool> {
        if non_empty(&self.salesforce_id) {
            Some(!non_empty(&self.deleted_at))
        } else {
            None
        }
    }
}

fn non_empty(field: &Option<String>) -> bool {
    field.as_deref().map(|s| !s.is_empty()).unwrap_or(false)
}

/// A single suggestion request recovered from a log line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEvent {
    pub timestamp: DateTime<Local>,
    pub dataset_id: String,
    pub publication_stage: String,
    #[serde(default)]
    pub query_params: QueryParams,
}

/// Denormalized metadata for one dataset id. Every field is best-effort.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    pub external_id: Option<String>,
    pub version: Option<String>,
    pub domain_name: Option<String>,
    pub salesforce_id: Option<String>,
    pub domain_deleted_at: Option<String>,
    pub is_customer_domain: Option<bool>,
}

/// A request event joined with its dataset metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedEvent {
    #[serde(flatten)]
    pub event: RequestEvent,
    #[serde(flatten)]
    pub metadata: DatasetMetadata,
}

impl EnrichedEvent {
    pub fn dataset_id(&self) -> &str {
        &self.event.dataset_id
    }
}

/// A bare dataset id joined with its metadata (no request attached)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedDataset {
    pub dataset_id: String,
    #[serde(flatten)]
    pub metadata: DatasetMetadata,
}
