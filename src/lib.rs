pub mod config;
pub mod constants;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod report;
pub mod types;
