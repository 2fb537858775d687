//! Input contract checks for raw encounter rows.
//!
//! Validation stops at the first violation; a run with malformed input
//! produces no summary at all.

use chrono::Datelike;
use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::models::encounter::{
    COST_PRECISION, COST_SCALE, MAX_DIAGNOSIS_CODE_LEN, MAX_ID_LEN,
};
use crate::models::{EncounterRecord, RawEncounterRow, RawField};

/// Which optional limits to enforce on top of the non-null contract
#[derive(Debug, Clone, Copy)]
pub struct ValidationOptions {
    /// Column widths and `decimal(12,2)` range of the raw table
    pub enforce_column_limits: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            enforce_column_limits: true,
        }
    }
}

fn required<T: Clone>(label: &str, field: &'static str, value: &RawField<T>) -> Result<T> {
    match value {
        RawField::Present(value) => Ok(value.clone()),
        RawField::Missing => Err(Error::invalid_record(label, field, "is missing")),
        RawField::Malformed(text) => Err(Error::invalid_record(
            label,
            field,
            format!("could not be parsed from '{text}'"),
        )),
    }
}

fn required_text(
    label: &str,
    field: &'static str,
    value: &RawField<String>,
    max_len: Option<usize>,
) -> Result<String> {
    let text = required(label, field, value)?;
    if text.trim().is_empty() {
        return Err(Error::invalid_record(label, field, "is empty"));
    }
    if let Some(max_len) = max_len {
        let len = text.chars().count();
        if len > max_len {
            return Err(Error::invalid_record(
                label,
                field,
                format!("has {len} characters, more than the allowed {max_len}"),
            ));
        }
    }
    Ok(text)
}

fn check_cost(label: &str, cost: Decimal) -> Result<()> {
    let normalized = cost.normalize();
    if normalized.scale() > COST_SCALE {
        return Err(Error::invalid_record(
            label,
            "cost",
            format!("{cost} has more than {COST_SCALE} decimal places"),
        ));
    }
    let integer_digits = normalized.abs().trunc().to_string().trim_start_matches('0').len() as u32;
    if integer_digits > COST_PRECISION - COST_SCALE {
        return Err(Error::invalid_record(
            label,
            "cost",
            format!("{cost} does not fit decimal({COST_PRECISION},{COST_SCALE})"),
        ));
    }
    Ok(())
}

/// Check one raw row against the input contract
pub fn validate_record(row: &RawEncounterRow, options: ValidationOptions) -> Result<EncounterRecord> {
    let label = row.label();
    let id_limit = options.enforce_column_limits.then_some(MAX_ID_LEN);
    let code_limit = options
        .enforce_column_limits
        .then_some(MAX_DIAGNOSIS_CODE_LEN);

    let encounter_id = required_text(&label, "encounter_id", &row.encounter_id, id_limit)?;
    let patient_id = required_text(&label, "patient_id", &row.patient_id, id_limit)?;
    let facility_id = required_text(&label, "facility_id", &row.facility_id, id_limit)?;
    let encounter_date = required(&label, "encounter_date", &row.encounter_date)?;
    let diagnosis_code = required_text(&label, "diagnosis_code", &row.diagnosis_code, code_limit)?;
    let cost = required(&label, "cost", &row.cost)?;
    let updated_at = required(&label, "updated_at", &row.updated_at)?;

    // year_month is rendered with exactly four year digits
    if !(0..=9999).contains(&encounter_date.year()) {
        return Err(Error::invalid_record(
            &label,
            "encounter_date",
            format!("{encounter_date} is outside years 0000-9999"),
        ));
    }
    if options.enforce_column_limits {
        check_cost(&label, cost)?;
    }

    Ok(EncounterRecord {
        encounter_id,
        patient_id,
        facility_id,
        encounter_date,
        diagnosis_code,
        cost,
        updated_at,
    })
}

/// Validate every row, failing on the first one that breaks the contract
pub fn validate_records<I>(rows: I, options: ValidationOptions) -> Result<Vec<EncounterRecord>>
where
    I: IntoIterator<Item = RawEncounterRow>,
{
    rows.into_iter()
        .map(|row| validate_record(&row, options))
        .collect()
}
