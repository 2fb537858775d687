//! File IO for encounter tables and pipeline outputs
//!
//! Parquet reading and writing lives in [`parquet`]; CSV, JSON and report
//! writers live in [`writer`].

pub mod parquet;
pub mod writer;

pub use parquet::{
    create_projection, find_parquet_files, read_parquet, read_parquet_schema, validate_directory,
    write_parquet,
};
pub use writer::{
    encounters_to_batch, summary_to_batch, write_encounters_csv, write_encounters_parquet,
    write_flagged_csv, write_json, write_report, write_summary_csv, write_summary_parquet,
};
