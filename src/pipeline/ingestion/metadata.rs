//! Reference table loaders.
//!
//! The dataset table is validated strictly (a short row aborts the run) while
//! the domain table is padded, since domain exports are often incomplete.

use crate::constants::{DATASET_TABLE_MIN_FIELDS, DOMAIN_TABLE_FIELDS};
use crate::error::{CoverageError, Result};
use crate::metrics::MetadataMetrics;
use crate::types::{DatasetMap, DatasetRef, DomainInfo, DomainMap, IndexedDatasetSet};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

fn read_table(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| CoverageError::io(path, e))
}

/// Non-blank, trimmed lines with their 1-based line numbers
fn rows(content: &str) -> impl Iterator<Item = (usize, Vec<&str>)> {
    content
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .map(|(line_no, line)| (line_no, line.split('\t').collect()))
}

/// Load `dataset_id<TAB>external_id<TAB>version` rows keyed by dataset id.
pub fn load_dataset_map(path: &Path) -> Result<DatasetMap> {
    let content = read_table(path)?;
    let map = parse_dataset_rows(&content, path)?;
    MetadataMetrics::record_rows_loaded("dataset", map.len());
    info!("Loaded {} dataset references from {}", map.len(), path.display());
    Ok(map)
}

fn parse_dataset_rows(content: &str, path: &Path) -> Result<DatasetMap> {
    let mut map = DatasetMap::new();
    for (line, fields) in rows(content) {
        if fields.len() < DATASET_TABLE_MIN_FIELDS {
            return Err(CoverageError::MalformedRow {
                path: path.to_path_buf(),
                line,
                expected: DATASET_TABLE_MIN_FIELDS,
                found: fields.len(),
            });
        }
        if fields.len() > DATASET_TABLE_MIN_FIELDS {
            debug!(
                "Ignoring {} extra fields at {}:{}",
                fields.len() - DATASET_TABLE_MIN_FIELDS,
                path.display(),
                line
            );
        }
        let dataset = DatasetRef {
            dataset_id: fields[0].to_string(),
            external_id: fields[1].to_string(),
            version: fields[2].to_string(),
        };
        map.insert(dataset.dataset_id.clone(), dataset);
    }
    Ok(map)
}

/// Load `external_id[<TAB>domain_name[<TAB>salesforce_id[<TAB>deleted_at]]]` rows keyed by external id.
pub fn load_domain_map(path: &Path) -> Result<DomainMap> {
    let content = read_table(path)?;
    let map = parse_domain_rows(&content);
    MetadataMetrics::record_rows_loaded("domain", map.len());
    info!("Loaded {} domain records from {}", map.len(), path.display());
    Ok(map)
}

fn parse_domain_rows(content: &str) -> DomainMap {
    let mut map = DomainMap::new();
    for (_, fields) in rows(content) {
        if fields.len() < DOMAIN_TABLE_FIELDS {
            MetadataMetrics::record_padded_row();
        }
        let field = |idx: usize| fields.get(idx).map(|s| s.to_string());
        let domain = DomainInfo {
            external_id: fields[0].to_string(),
            domain_name: field(1),
            salesforce_id: field(2),
            deleted_at: field(3),
        };
        map.insert(domain.external_id.clone(), domain);
    }
    map
}

/// Load the set of dataset ids currently in the Spandex index, one per line.
pub fn load_indexed_ids(path: &Path) -> Result<IndexedDatasetSet> {
    let content = read_table(path)?;
    let ids = parse_indexed_ids(&content);
    MetadataMetrics::record_rows_loaded("indexed", ids.len());
    info!("Loaded {} indexed dataset ids from {}", ids.len(), path.display());
    Ok(ids)
}

fn parse_indexed_ids(content: &str) -> IndexedDatasetSet {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
