//! Summary rows produced by the monthly aggregation.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use smallvec::SmallVec;

/// A calendar month, displayed as `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// Create a new year-month; `month` is 1-based
    #[must_use]
    pub const fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Grouping key of the monthly summary
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    pub patient_id: String,
    pub facility_id: String,
    pub year_month: YearMonth,
}

/// One row of the monthly summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub patient_id: String,
    pub facility_id: String,
    pub year_month: YearMonth,
    /// Canonical encounters in the group
    pub total_encounters: u64,
    /// Signed sum of `cost` over the group
    pub total_cost: Decimal,
    /// Unique diagnosis codes in the group
    pub distinct_diagnosis_count: u64,
}

impl SummaryRow {
    /// The `(patient_id, facility_id, year_month)` key of this row
    #[must_use]
    pub fn key(&self) -> GroupKey {
        GroupKey {
            patient_id: self.patient_id.clone(),
            facility_id: self.facility_id.clone(),
            year_month: self.year_month,
        }
    }
}

/// Why a summary row failed a data quality check
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FlagReason {
    /// `total_cost` below zero
    NegativeCost,
    /// `total_encounters` above the percentile threshold
    HighEncounterCount {
        /// Threshold rounded for display
        threshold: String,
        /// Percentile as a whole number, e.g. `99`
        percentile: String,
    },
}

impl fmt::Display for FlagReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeCost => write!(f, "negative_cost"),
            Self::HighEncounterCount {
                threshold,
                percentile,
            } => write!(f, "high_encounter_count (>{threshold}, p{percentile})"),
        }
    }
}

/// A summary row together with every reason it was flagged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlaggedRow {
    pub row: SummaryRow,
    /// Sorted by display text and free of duplicates
    pub reasons: SmallVec<[FlagReason; 2]>,
}

impl FlaggedRow {
    /// All reasons joined by `"; "`
    #[must_use]
    pub fn flag_reason(&self) -> String {
        self.reasons
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}
