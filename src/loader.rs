//! Loading raw encounter rows from Parquet and CSV inputs

use std::path::Path;
use std::time::Instant;

use arrow::record_batch::RecordBatch;
use itertools::izip;
use rayon::prelude::*;
use serde::Deserialize;

use crate::config::{DateFormatConfig, PipelineConfig};
use crate::error::{Error, Result};
use crate::models::RawEncounterRow;
use crate::schema::date_utils::{
    parse_amount, parse_date_string, parse_field, parse_timestamp_string,
};
use crate::schema::{
    COST, DIAGNOSIS_CODE, ENCOUNTER_DATE, ENCOUNTER_ID, FACILITY_ID, PATIENT_ID, RAW_COLUMNS,
    UPDATED_AT, check_raw_schema,
};
use crate::utils::arrow::{extract_costs, extract_dates, extract_strings, extract_timestamps};
use crate::utils::io::{find_parquet_files, read_parquet, read_parquet_schema};
use crate::utils::logging::{
    create_main_progress_bar, finish_progress_bar, log_operation_complete, log_operation_start,
};

/// Convert one record batch into raw rows
///
/// `row_offset` is the position of the batch's first row in the whole input.
pub fn batch_to_raw_rows(
    batch: &RecordBatch,
    row_offset: usize,
    config: &DateFormatConfig,
) -> Result<Vec<RawEncounterRow>> {
    let encounter_ids = extract_strings(batch, ENCOUNTER_ID)?;
    let patient_ids = extract_strings(batch, PATIENT_ID)?;
    let facility_ids = extract_strings(batch, FACILITY_ID)?;
    let encounter_dates = extract_dates(batch, ENCOUNTER_DATE, config)?;
    let diagnosis_codes = extract_strings(batch, DIAGNOSIS_CODE)?;
    let costs = extract_costs(batch, COST)?;
    let updated_ats = extract_timestamps(batch, UPDATED_AT, config)?;

    let rows = izip!(
        encounter_ids,
        patient_ids,
        facility_ids,
        encounter_dates,
        diagnosis_codes,
        costs,
        updated_ats
    )
    .enumerate()
    .map(
        |(i, (encounter_id, patient_id, facility_id, encounter_date, diagnosis_code, cost, updated_at))| {
            RawEncounterRow {
                row_index: row_offset + i,
                encounter_id,
                patient_id,
                facility_id,
                encounter_date,
                diagnosis_code,
                cost,
                updated_at,
            }
        },
    )
    .collect();

    Ok(rows)
}

/// Read a single parquet file of raw encounters
///
/// # Errors
/// Fails when a required column is missing or has an unreadable type
pub fn read_encounters_parquet(
    path: &Path,
    batch_size: usize,
    config: &DateFormatConfig,
) -> Result<Vec<RawEncounterRow>> {
    let schema = read_parquet_schema(path)?;
    check_raw_schema(&schema, &path.to_string_lossy()).into_result()?;

    let batches = read_parquet(path, &RAW_COLUMNS, batch_size)?;

    let mut rows = Vec::with_capacity(batches.iter().map(RecordBatch::num_rows).sum());
    for batch in &batches {
        let converted = batch_to_raw_rows(batch, rows.len(), config)?;
        rows.extend(converted);
    }
    Ok(rows)
}

/// One CSV line; every cell is optional so that gaps reach validation
#[derive(Debug, Deserialize)]
struct CsvEncounterRow {
    encounter_id: Option<String>,
    patient_id: Option<String>,
    facility_id: Option<String>,
    encounter_date: Option<String>,
    diagnosis_code: Option<String>,
    cost: Option<String>,
    updated_at: Option<String>,
}

impl CsvEncounterRow {
    fn into_raw(self, row_index: usize, config: &DateFormatConfig) -> RawEncounterRow {
        let text = |value: Option<&str>| parse_field(value, |s| Some(s.to_string()));
        RawEncounterRow {
            row_index,
            encounter_id: text(self.encounter_id.as_deref()),
            patient_id: text(self.patient_id.as_deref()),
            facility_id: text(self.facility_id.as_deref()),
            encounter_date: parse_field(self.encounter_date.as_deref(), |s| {
                parse_date_string(s, config)
            }),
            diagnosis_code: text(self.diagnosis_code.as_deref()),
            cost: parse_field(self.cost.as_deref(), parse_amount),
            updated_at: parse_field(self.updated_at.as_deref(), |s| {
                parse_timestamp_string(s, config)
            }),
        }
    }
}

/// Read a CSV file of raw encounters with a header row
///
/// # Errors
/// Fails when the header lacks a required column or a line cannot be read
pub fn read_encounters_csv(path: &Path, config: &DateFormatConfig) -> Result<Vec<RawEncounterRow>> {
    let start = Instant::now();
    log_operation_start("Reading CSV file", path);

    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let missing: Vec<&str> = RAW_COLUMNS
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|h| h.trim() == *column))
        .collect();
    if !missing.is_empty() {
        return Err(Error::Schema(format!(
            "{}: missing column(s) {}",
            path.display(),
            missing.join(", ")
        )));
    }

    let mut rows = Vec::new();
    for (row_index, line) in reader.deserialize::<CsvEncounterRow>().enumerate() {
        rows.push(line?.into_raw(row_index, config));
    }

    log_operation_complete("read", path, rows.len(), Some(start.elapsed()));
    Ok(rows)
}

/// Load every parquet file in a directory in parallel
///
/// Files are concatenated in file name order and rows renumbered across files.
pub fn load_encounters_dir(
    dir: &Path,
    batch_size: usize,
    config: &DateFormatConfig,
) -> Result<Vec<RawEncounterRow>> {
    let files = find_parquet_files(dir)?;
    if files.is_empty() {
        return Ok(Vec::new());
    }

    log::info!("Found {} parquet files in {}", files.len(), dir.display());
    let pb = create_main_progress_bar(files.len() as u64, Some("Loading encounter files"));

    let per_file: Vec<Result<Vec<RawEncounterRow>>> = files
        .par_iter()
        .map(|path| {
            let rows = read_encounters_parquet(path, batch_size, config);
            pb.inc(1);
            rows
        })
        .collect();

    finish_progress_bar(&pb, Some("Loaded encounter files"));

    let mut rows = Vec::new();
    for result in per_file {
        rows.extend(result?);
    }
    for (row_index, row) in rows.iter_mut().enumerate() {
        row.row_index = row_index;
    }
    Ok(rows)
}

/// Load raw encounters from the configured input
///
/// A directory is read as a set of parquet files; otherwise the file
/// extension picks the format.
pub fn load_encounters(config: &PipelineConfig) -> Result<Vec<RawEncounterRow>> {
    let path = config.input.as_path();
    let dates = &config.date_format_config;

    if path.is_dir() {
        return load_encounters_dir(path, config.batch_size, dates);
    }

    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("parquet") => {
            read_encounters_parquet(path, config.batch_size, dates)
        }
        Some(ext) if ext.eq_ignore_ascii_case("csv") => read_encounters_csv(path, dates),
        _ => Err(Error::Config(format!(
            "unsupported input {}; expected a .parquet or .csv file or a directory",
            path.display()
        ))),
    }
}
