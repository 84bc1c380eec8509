// Pipeline processing: request extraction and metadata enrichment

pub mod enrich;
pub mod extract;
