//! Error handling for the encounter analytics pipeline.

use std::io;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;

/// Specialized error type for loading, validating and summarizing encounters
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error opening, reading or writing a file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error processing Parquet data
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    /// Error building or reading Arrow arrays
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Error reading or writing CSV data
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error serializing a run summary
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Input table is missing a column or has an unusable type
    #[error("Schema error: {0}")]
    Schema(String),

    /// A raw encounter row violates the input contract
    #[error("Invalid encounter record {encounter_id}: field '{field}' {reason}")]
    InvalidRecord {
        /// The offending record's `encounter_id`, or `<row N>` when that is itself missing
        encounter_id: String,
        /// The violated field
        field: &'static str,
        /// What was wrong with it
        reason: String,
    },

    /// A decimal total left the representable range
    #[error("Overflow: {0}")]
    Overflow(String),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Build an `InvalidRecord` error
    pub fn invalid_record(
        encounter_id: impl Into<String>,
        field: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidRecord {
            encounter_id: encounter_id.into(),
            field,
            reason: reason.into(),
        }
    }
}

/// Result type for encounter analytics operations
pub type Result<T> = std::result::Result<T, Error>;
