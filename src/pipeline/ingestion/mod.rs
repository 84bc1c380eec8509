// Pipeline ingestion: reference tables and request-log exports

pub mod log_reader;
pub mod metadata;
