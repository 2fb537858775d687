//! Data quality checks run on the monthly summary
//!
//! Two checks are applied:
//! - negative total cost, which usually means refunds outweigh charges or a
//!   correction was entered with the wrong sign
//! - monthly encounter counts above a high percentile, which may indicate
//!   duplicate registrations, data entry errors or chronic-care patients
//!
//! Rows failing any check are moved to the flagged set with every reason
//! attached; the rest form the cleaned set.

pub mod flags;

use rustc_hash::FxHashMap;

use crate::models::{FlagReason, FlaggedRow, GroupKey, SummaryRow};

pub use flags::{flag_high_encounter_counts, flag_negative_costs, quantile};

/// Summary rows split by data quality
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QualityOutcome {
    /// Rows passing every check, in input order
    pub cleaned: Vec<SummaryRow>,
    /// Rows failing at least one check, one entry per group key
    pub flagged: Vec<FlaggedRow>,
}

impl QualityOutcome {
    /// Number of flagged rows carrying the given reason
    #[must_use]
    pub fn count_with_reason(&self, reason: &FlagReason) -> usize {
        self.flagged
            .iter()
            .filter(|flagged| flagged.reasons.contains(reason))
            .count()
    }

    /// Distinct reasons present among flagged rows, sorted by display text
    #[must_use]
    pub fn reasons(&self) -> Vec<FlagReason> {
        let mut reasons: Vec<FlagReason> = Vec::new();
        for flagged in &self.flagged {
            for reason in &flagged.reasons {
                if !reasons.contains(reason) {
                    reasons.push(reason.clone());
                }
            }
        }
        reasons.sort_by_cached_key(ToString::to_string);
        reasons
    }
}

/// Run every check and split the rows into cleaned and flagged sets
///
/// Flagged rows keep the order in which checks first reported them
/// (negative cost first, then high encounter count). A row failing several
/// checks appears once with its reasons sorted by text.
#[must_use]
pub fn run_quality_checks(rows: &[SummaryRow], percentile: f64) -> QualityOutcome {
    let reports = flag_negative_costs(rows)
        .into_iter()
        .chain(flag_high_encounter_counts(rows, percentile));

    let mut flagged: Vec<FlaggedRow> = Vec::new();
    let mut positions: FxHashMap<GroupKey, usize> = FxHashMap::default();

    for report in reports {
        let key = report.row.key();
        if let Some(&position) = positions.get(&key) {
            let existing = &mut flagged[position];
            for reason in report.reasons {
                if !existing.reasons.contains(&reason) {
                    existing.reasons.push(reason);
                }
            }
        } else {
            positions.insert(key, flagged.len());
            flagged.push(report);
        }
    }

    for entry in &mut flagged {
        entry.reasons.sort_by_cached_key(ToString::to_string);
    }

    let cleaned = rows
        .iter()
        .filter(|row| !positions.contains_key(&row.key()))
        .cloned()
        .collect();

    QualityOutcome { cleaned, flagged }
}
