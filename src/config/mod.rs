//! Configuration for the encounter pipeline.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::utils::DEFAULT_BATCH_SIZE;

/// Default percentile above which a monthly encounter count is flagged
pub const DEFAULT_QUALITY_PERCENTILE: f64 = 0.99;

/// Default number of raw records before deduplication switches to the parallel path
pub const DEFAULT_PARALLEL_DEDUP_THRESHOLD: usize = 100_000;

/// Configuration for date format handling in text inputs
#[derive(Debug, Clone)]
pub struct DateFormatConfig {
    /// List of date format strings to try when parsing dates
    pub date_formats: Vec<String>,
    /// List of timestamp format strings to try before falling back to RFC 3339
    pub timestamp_formats: Vec<String>,
}

impl Default for DateFormatConfig {
    fn default() -> Self {
        Self {
            date_formats: vec![
                "%Y-%m-%d".to_string(), // ISO format: 2025-01-15
                "%Y/%m/%d".to_string(), // 2025/01/15
                "%Y%m%d".to_string(),   // Compact: 20250115
            ],
            timestamp_formats: vec![
                "%Y-%m-%d %H:%M:%S%.f".to_string(),
                "%Y-%m-%dT%H:%M:%S%.f".to_string(),
                "%Y-%m-%d %H:%M:%S".to_string(),
                "%Y-%m-%dT%H:%M:%S".to_string(),
            ],
        }
    }
}

/// Configuration for a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Raw encounter table: a `.parquet` or `.csv` file, or a directory of parquet files
    pub input: PathBuf,
    /// Directory receiving the summary, cleaned, flagged and report files
    pub output_dir: PathBuf,
    /// Percentile (0..=1) used by the high encounter count check
    pub quality_percentile: f64,
    /// Rows per record batch when reading parquet files
    pub batch_size: usize,
    /// Input size at which deduplication runs on the rayon pool
    pub parallel_dedup_threshold: usize,
    /// Enforce the column length and `decimal(12,2)` limits of the raw table
    pub enforce_column_limits: bool,
    /// Also write `analytics_summary.parquet`
    pub write_parquet: bool,
    /// Date format configuration for CSV inputs
    pub date_format_config: DateFormatConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("data/raw_encounters.parquet"),
            output_dir: PathBuf::from("output"),
            quality_percentile: DEFAULT_QUALITY_PERCENTILE,
            batch_size: DEFAULT_BATCH_SIZE,
            parallel_dedup_threshold: DEFAULT_PARALLEL_DEDUP_THRESHOLD,
            enforce_column_limits: true,
            write_parquet: true,
            date_format_config: DateFormatConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Build a configuration from defaults overridden by environment variables
    ///
    /// Recognised variables: `ENCOUNTERS_INPUT`, `OUTPUT_DIR`, `QUALITY_PERCENTILE`,
    /// `PARQUET_BATCH_SIZE`, `PARALLEL_DEDUP_THRESHOLD`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(input) = std::env::var("ENCOUNTERS_INPUT") {
            config.input = PathBuf::from(input);
        }
        if let Ok(output_dir) = std::env::var("OUTPUT_DIR") {
            config.output_dir = PathBuf::from(output_dir);
        }
        if let Some(percentile) = parse_env::<f64>("QUALITY_PERCENTILE")? {
            config.quality_percentile = percentile;
        }
        if let Some(batch_size) = parse_env::<usize>("PARQUET_BATCH_SIZE")? {
            config.batch_size = batch_size;
        }
        if let Some(threshold) = parse_env::<usize>("PARALLEL_DEDUP_THRESHOLD")? {
            config.parallel_dedup_threshold = threshold;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.quality_percentile) {
            return Err(Error::Config(format!(
                "quality percentile must be within 0..=1, got {}",
                self.quality_percentile
            )));
        }
        if self.batch_size == 0 {
            return Err(Error::Config("batch size must be positive".to_string()));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| Error::Config(format!("{name} has an invalid value: {raw}"))),
        Err(_) => Ok(None),
    }
}
