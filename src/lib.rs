//! Monthly encounter analytics over versioned raw encounter tables.
//!
//! Raw encounters are loaded from Parquet or CSV, validated, deduplicated to
//! their latest version per `encounter_id`, and aggregated per
//! `(patient_id, facility_id, year_month)`. Quality checks then split the
//! summary into cleaned and flagged rows.

pub mod algorithm;
pub mod async_io;
pub mod config;
pub mod error;
pub mod generator;
pub mod loader;
pub mod models;
pub mod pipeline;
pub mod schema;
pub mod utils;

// Core types
pub use config::{DateFormatConfig, PipelineConfig};
pub use error::{Error, Result};
pub use models::{EncounterRecord, FlagReason, FlaggedRow, RawEncounterRow, SummaryRow, YearMonth};

// Summarization and checks
pub use algorithm::quality::{QualityOutcome, run_quality_checks};
pub use algorithm::summarize::{DedupStats, Summarizer, Summary, summarize};
pub use algorithm::validation::{ValidationOptions, validate_records};

// Loading and running
pub use async_io::load_encounters_async;
pub use generator::{GeneratorConfig, generate_encounters};
pub use loader::load_encounters;
pub use pipeline::{PipelineOutcome, run_pipeline, run_pipeline_async};

// Arrow types
pub use arrow::record_batch::RecordBatch;

// Utility functions
pub use utils::DEFAULT_BATCH_SIZE;
