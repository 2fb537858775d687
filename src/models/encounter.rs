//! Encounter records as they come off the raw table and after validation.

use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;

/// Maximum length of the identifier columns in the raw table
pub const MAX_ID_LEN: usize = 20;

/// Maximum length of `diagnosis_code` in the raw table
pub const MAX_DIAGNOSIS_CODE_LEN: usize = 10;

/// Digits allowed in `cost` (`decimal(12,2)`)
pub const COST_PRECISION: u32 = 12;

/// Fractional digits allowed in `cost` (`decimal(12,2)`)
pub const COST_SCALE: u32 = 2;

/// A single field of a raw row before the input contract has been checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawField<T> {
    /// Null, empty or absent
    Missing,
    /// Present but could not be interpreted; holds the offending text
    Malformed(String),
    /// Parsed value
    Present(T),
}

impl<T> RawField<T> {
    /// The parsed value, if any
    pub const fn as_present(&self) -> Option<&T> {
        match self {
            Self::Present(value) => Some(value),
            _ => None,
        }
    }
}

/// A raw encounter row as read from Parquet or CSV
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEncounterRow {
    /// Zero-based position in the input, used when `encounter_id` is missing
    pub row_index: usize,
    pub encounter_id: RawField<String>,
    pub patient_id: RawField<String>,
    pub facility_id: RawField<String>,
    pub encounter_date: RawField<NaiveDate>,
    pub diagnosis_code: RawField<String>,
    pub cost: RawField<Decimal>,
    pub updated_at: RawField<NaiveDateTime>,
}

impl RawEncounterRow {
    /// Label identifying this row in error messages
    #[must_use]
    pub fn label(&self) -> String {
        match &self.encounter_id {
            RawField::Present(id) if !id.trim().is_empty() => id.clone(),
            _ => format!("<row {}>", self.row_index),
        }
    }
}

impl From<EncounterRecord> for RawEncounterRow {
    fn from(record: EncounterRecord) -> Self {
        Self {
            row_index: 0,
            encounter_id: RawField::Present(record.encounter_id),
            patient_id: RawField::Present(record.patient_id),
            facility_id: RawField::Present(record.facility_id),
            encounter_date: RawField::Present(record.encounter_date),
            diagnosis_code: RawField::Present(record.diagnosis_code),
            cost: RawField::Present(record.cost),
            updated_at: RawField::Present(record.updated_at),
        }
    }
}

/// One version of an encounter that satisfies the input contract
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EncounterRecord {
    /// Logical encounter; shared by every version of the same encounter
    pub encounter_id: String,
    pub patient_id: String,
    pub facility_id: String,
    /// Date of the clinical event
    pub encounter_date: NaiveDate,
    pub diagnosis_code: String,
    /// Signed cost; negative values are corrections or refunds
    pub cost: Decimal,
    /// When this version was written
    pub updated_at: NaiveDateTime,
}

impl EncounterRecord {
    /// Create a new encounter record
    #[must_use]
    pub fn new(
        encounter_id: impl Into<String>,
        patient_id: impl Into<String>,
        facility_id: impl Into<String>,
        encounter_date: NaiveDate,
        diagnosis_code: impl Into<String>,
        cost: Decimal,
        updated_at: NaiveDateTime,
    ) -> Self {
        Self {
            encounter_id: encounter_id.into(),
            patient_id: patient_id.into(),
            facility_id: facility_id.into(),
            encounter_date,
            diagnosis_code: diagnosis_code.into(),
            cost,
            updated_at,
        }
    }

    /// Total order over the non-key fields, used to settle equal `updated_at` values
    ///
    /// Compares `patient_id`, `facility_id`, `encounter_date`, `diagnosis_code`,
    /// the `cost` value and finally the `cost` scale, since `100.1` and `100.10`
    /// are equal in value but print differently. Two records that compare equal
    /// here are identical for every purpose of the summary.
    #[must_use]
    pub fn cmp_content(&self, other: &Self) -> Ordering {
        self.patient_id
            .cmp(&other.patient_id)
            .then_with(|| self.facility_id.cmp(&other.facility_id))
            .then_with(|| self.encounter_date.cmp(&other.encounter_date))
            .then_with(|| self.diagnosis_code.cmp(&other.diagnosis_code))
            .then_with(|| self.cost.cmp(&other.cost))
            .then_with(|| self.cost.scale().cmp(&other.cost.scale()))
    }
}
