//! Writers for raw encounter tables, summary rows and reports.

use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    ArrayRef, Date32Array, Decimal128Array, StringArray, TimestampMicrosecondArray, UInt64Array,
};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::encounter::{COST_PRECISION, COST_SCALE};
use crate::models::{EncounterRecord, FlaggedRow, SummaryRow};
use crate::schema::{TOTAL_COST_PRECISION, raw_encounter_schema, summary_schema};
use crate::utils::io::parquet::write_parquet;
use crate::utils::logging::log_operation_complete;

/// Header of the summary CSV files
pub const SUMMARY_HEADER: [&str; 6] = [
    "patient_id",
    "facility_id",
    "year_month",
    "total_encounters",
    "total_cost",
    "distinct_diagnosis_count",
];

fn summary_fields(row: &SummaryRow) -> [String; 6] {
    [
        row.patient_id.clone(),
        row.facility_id.clone(),
        row.year_month.to_string(),
        row.total_encounters.to_string(),
        row.total_cost.to_string(),
        row.distinct_diagnosis_count.to_string(),
    ]
}

/// Write summary rows to CSV, header included even when there are no rows
pub fn write_summary_csv(path: &Path, rows: &[SummaryRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(SUMMARY_HEADER)?;
    for row in rows {
        writer.write_record(summary_fields(row))?;
    }
    writer.flush()?;
    log_operation_complete("wrote", path, rows.len(), None);
    Ok(())
}

/// Write flagged rows to CSV with an extra `flag_reason` column
pub fn write_flagged_csv(path: &Path, flagged: &[FlaggedRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(SUMMARY_HEADER.iter().chain(["flag_reason"].iter()))?;
    for entry in flagged {
        let fields = summary_fields(&entry.row);
        writer.write_record(fields.iter().map(String::as_str).chain([entry.flag_reason().as_str()]))?;
    }
    writer.flush()?;
    log_operation_complete("wrote", path, flagged.len(), None);
    Ok(())
}

fn to_fixed_scale(value: Decimal, scale: u32, column: &str) -> Result<i128> {
    let mut scaled = value;
    scaled.rescale(scale);
    if scaled != value {
        return Err(Error::Schema(format!(
            "{column} value {value} has more than {scale} decimal places"
        )));
    }
    Ok(scaled.mantissa())
}

fn decimal_array(values: Vec<i128>, precision: u8, column: &str) -> Result<Decimal128Array> {
    Decimal128Array::from(values)
        .with_precision_and_scale(precision, COST_SCALE as i8)
        .map_err(|e| Error::Schema(format!("{column} cannot be stored as decimal: {e}")))
}

/// Convert summary rows into a record batch following [`summary_schema`]
pub fn summary_to_batch(rows: &[SummaryRow]) -> Result<RecordBatch> {
    let costs = rows
        .iter()
        .map(|row| to_fixed_scale(row.total_cost, COST_SCALE, "total_cost"))
        .collect::<Result<Vec<_>>>()?;

    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.patient_id.as_str()))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.facility_id.as_str()))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.year_month.to_string()))),
        Arc::new(UInt64Array::from_iter_values(rows.iter().map(|r| r.total_encounters))),
        Arc::new(decimal_array(costs, TOTAL_COST_PRECISION, "total_cost")?),
        Arc::new(UInt64Array::from_iter_values(
            rows.iter().map(|r| r.distinct_diagnosis_count),
        )),
    ];

    Ok(RecordBatch::try_new(summary_schema(), columns)?)
}

/// Write a batch built by [`summary_to_batch`] to parquet
pub fn write_summary_parquet(path: &Path, batch: RecordBatch) -> Result<()> {
    write_parquet(path, summary_schema(), &[batch])
}

fn days_since_epoch(date: NaiveDate) -> i32 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
    (date - epoch).num_days() as i32
}

/// Convert encounter records into a record batch following [`raw_encounter_schema`]
pub fn encounters_to_batch(records: &[EncounterRecord]) -> Result<RecordBatch> {
    let costs = records
        .iter()
        .map(|r| to_fixed_scale(r.cost, COST_SCALE, "cost"))
        .collect::<Result<Vec<_>>>()?;

    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(records.iter().map(|r| r.encounter_id.as_str()))),
        Arc::new(StringArray::from_iter_values(records.iter().map(|r| r.patient_id.as_str()))),
        Arc::new(StringArray::from_iter_values(records.iter().map(|r| r.facility_id.as_str()))),
        Arc::new(Date32Array::from_iter_values(
            records.iter().map(|r| days_since_epoch(r.encounter_date)),
        )),
        Arc::new(StringArray::from_iter_values(records.iter().map(|r| r.diagnosis_code.as_str()))),
        Arc::new(decimal_array(costs, COST_PRECISION as u8, "cost")?),
        Arc::new(TimestampMicrosecondArray::from_iter_values(
            records.iter().map(|r| r.updated_at.and_utc().timestamp_micros()),
        )),
    ];

    Ok(RecordBatch::try_new(raw_encounter_schema(), columns)?)
}

/// Write encounter records as a `raw_encounters` parquet table
pub fn write_encounters_parquet(path: &Path, records: &[EncounterRecord]) -> Result<()> {
    let batch = encounters_to_batch(records)?;
    write_parquet(path, raw_encounter_schema(), &[batch])
}

/// Write encounter records as CSV with a header row
pub fn write_encounters_csv(path: &Path, records: &[EncounterRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    log_operation_complete("wrote", path, records.len(), None);
    Ok(())
}

/// Write the pipeline report text
pub fn write_report(path: &Path, report: &str) -> Result<()> {
    std::fs::write(path, report)?;
    log::info!("Wrote report to {}", path.display());
    Ok(())
}

/// Write any serializable value as pretty-printed JSON
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), value)?;
    log::info!("Wrote {}", path.display());
    Ok(())
}
