//! Time bucketing of encounter dates.

use chrono::{Datelike, NaiveDate};

use crate::models::{EncounterRecord, GroupKey, YearMonth};

/// Calendar month of a date
#[must_use]
pub fn year_month(date: NaiveDate) -> YearMonth {
    YearMonth::new(date.year(), date.month())
}

/// Summary group of a canonical encounter
#[must_use]
pub fn group_key(record: &EncounterRecord) -> GroupKey {
    GroupKey {
        patient_id: record.patient_id.clone(),
        facility_id: record.facility_id.clone(),
        year_month: year_month(record.encounter_date),
    }
}
