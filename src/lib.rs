//! Smart Sales Warehouse Library
//!
//! Loads a star-schema sales warehouse from loosely formatted staging
//! extracts (customers, products and sales).
//!
//! This library provides tools for:
//! - Parsing `M/D/YYYY` staging dates into calendar keys and attributes
//! - Coercing text fields into typed warehouse columns
//! - Deriving dimension rows from the staging data
//! - Splitting sales into accepted facts and rejects with a recorded reason
//! - Persisting every table as Parquet with all-or-nothing commits

pub mod coerce;
pub mod config;
pub mod constants;
pub mod dates;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod staging;
pub mod store;
pub mod warehouse;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use config::{CompressionAlgorithm, EtlConfig};
pub use error::{EtlError, Result};
pub use models::RejectReason;
pub use pipeline::{Pipeline, RunSummary};
pub use warehouse::Warehouse;
