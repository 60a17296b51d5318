//! Error handling for warehouse load operations.
//!
//! Structural failures (missing staging files, missing columns, unkeyable
//! rows, unreadable or unwritable tables) abort the run. Field-level
//! problems never surface here; they degrade to "no value" in the
//! transform layer.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Staging file not found at path: {path}")]
    StagingNotFound { path: PathBuf },

    #[error("Staging table '{table}' is missing required column '{column}'")]
    MissingColumn { table: String, column: String },

    #[error("Staging table '{table}' row {row} cannot be loaded: {reason}")]
    InvalidStagingRow {
        table: String,
        row: usize,
        reason: String,
    },

    #[error("Warehouse table '{table}' at {path} is unreadable: {reason}")]
    CorruptTable {
        table: String,
        path: PathBuf,
        reason: String,
    },

    #[error("Commit failed for warehouse at {path}: {reason}")]
    CommitFailed { path: PathBuf, reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Interrupted by user before the run completed")]
    Interrupted,

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, EtlError>;

/// Free text that does not read as an `M/D/YYYY` calendar date.
///
/// Distinct from blank input, which parses to "no value".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid date '{input}': {reason}")]
pub struct DateFormatInvalid {
    pub input: String,
    pub reason: String,
}

impl DateFormatInvalid {
    pub fn new(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            reason: reason.into(),
        }
    }
}
