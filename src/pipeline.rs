//! End-to-end pipeline: load, validate, summarize, check quality, write outputs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::info;
use serde::Serialize;

use crate::algorithm::quality::{QualityOutcome, run_quality_checks};
use crate::algorithm::report::{
    ANALYTICS_SUMMARY_FILE, ANALYTICS_SUMMARY_PARQUET_FILE, CLEANED_FILE, FLAGGED_FILE,
    REPORT_FILE, RUN_SUMMARY_FILE, generate_report,
};
use crate::algorithm::summarize::{DedupStats, Summarizer, Summary};
use crate::algorithm::validation::{ValidationOptions, validate_records};
use crate::async_io::load_encounters_async;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::loader::load_encounters;
use crate::models::RawEncounterRow;
use crate::utils::io::{
    summary_to_batch, write_flagged_csv, write_json, write_report, write_summary_csv,
    write_summary_parquet,
};

/// Everything a run computes before anything is written
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub summary: Summary,
    pub quality: QualityOutcome,
    pub report: String,
}

/// Counters written to `run_summary.json`
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub input: String,
    pub dedup: DedupStats,
    pub summary_rows: usize,
    pub cleaned_rows: usize,
    pub flagged_rows: usize,
    pub flag_counts: BTreeMap<String, usize>,
    pub outputs: Vec<String>,
}

impl RunSummary {
    fn new(config: &PipelineConfig, outcome: &PipelineOutcome, outputs: &[PathBuf]) -> Self {
        let flag_counts = outcome
            .quality
            .reasons()
            .iter()
            .map(|reason| (reason.to_string(), outcome.quality.count_with_reason(reason)))
            .collect();

        Self {
            input: config.input.display().to_string(),
            dedup: outcome.summary.stats.clone(),
            summary_rows: outcome.summary.rows.len(),
            cleaned_rows: outcome.quality.cleaned.len(),
            flagged_rows: outcome.quality.flagged.len(),
            flag_counts,
            outputs: outputs
                .iter()
                .filter_map(|p| p.file_name())
                .map(|name| name.to_string_lossy().into_owned())
                .collect(),
        }
    }
}

/// Validate, summarize and quality-check raw rows without touching the filesystem
///
/// # Errors
/// Fails on the first row that breaks the input contract
pub fn process_encounters(
    rows: Vec<RawEncounterRow>,
    config: &PipelineConfig,
) -> Result<PipelineOutcome> {
    let options = ValidationOptions {
        enforce_column_limits: config.enforce_column_limits,
    };
    let records = validate_records(rows, options)?;
    info!("Validated {} encounter records", records.len());

    let summary = Summarizer::new()
        .with_parallel_threshold(config.parallel_dedup_threshold)
        .summarize(&records)?;
    info!(
        "Summarized {} canonical encounters into {} rows",
        summary.stats.canonical_encounters,
        summary.rows.len()
    );

    let quality = run_quality_checks(&summary.rows, config.quality_percentile);
    info!(
        "Quality checks: {} rows passing, {} flagged",
        quality.cleaned.len(),
        quality.flagged.len()
    );

    let report = generate_report(&summary.rows, &quality, Some(&summary.stats))?;

    Ok(PipelineOutcome {
        summary,
        quality,
        report,
    })
}

/// Write every output of a run into `output_dir`, returning the paths written
///
/// Conversions that can reject the data run before the first file is created.
pub fn write_outputs(config: &PipelineConfig, outcome: &PipelineOutcome) -> Result<Vec<PathBuf>> {
    let summary_batch = config
        .write_parquet
        .then(|| summary_to_batch(&outcome.summary.rows))
        .transpose()?;

    let dir: &Path = &config.output_dir;
    std::fs::create_dir_all(dir)?;

    let mut written = Vec::new();

    let path = dir.join(ANALYTICS_SUMMARY_FILE);
    write_summary_csv(&path, &outcome.summary.rows)?;
    written.push(path);

    let path = dir.join(CLEANED_FILE);
    write_summary_csv(&path, &outcome.quality.cleaned)?;
    written.push(path);

    let path = dir.join(FLAGGED_FILE);
    write_flagged_csv(&path, &outcome.quality.flagged)?;
    written.push(path);

    if let Some(batch) = summary_batch {
        let path = dir.join(ANALYTICS_SUMMARY_PARQUET_FILE);
        write_summary_parquet(&path, batch)?;
        written.push(path);
    }

    let path = dir.join(REPORT_FILE);
    write_report(&path, &outcome.report)?;
    written.push(path);

    let path = dir.join(RUN_SUMMARY_FILE);
    written.push(path.clone());
    write_json(&path, &RunSummary::new(config, outcome, &written))?;

    Ok(written)
}

/// Run the pipeline with blocking IO
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineOutcome> {
    let start = Instant::now();
    config.validate()?;

    let rows = load_encounters(config)?;
    let outcome = process_encounters(rows, config)?;
    write_outputs(config, &outcome)?;

    info!("Pipeline finished in {:?}", start.elapsed());
    Ok(outcome)
}

/// Run the pipeline, loading the input on the tokio runtime
pub async fn run_pipeline_async(config: &PipelineConfig) -> Result<PipelineOutcome> {
    let start = Instant::now();
    config.validate()?;

    let rows = load_encounters_async(config).await?;
    let outcome = process_encounters(rows, config)?;
    write_outputs(config, &outcome)?;

    info!("Pipeline finished in {:?}", start.elapsed());
    Ok(outcome)
}
