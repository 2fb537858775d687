//! Individual data quality checks over summary rows.

use itertools::Itertools;
use rust_decimal::Decimal;
use smallvec::smallvec;

use crate::models::{FlagReason, FlaggedRow, SummaryRow};

/// Linearly interpolated quantile of a set of values
///
/// `percentile` is a fraction in `0..=1`. Returns `None` for an empty set.
#[must_use]
pub fn quantile(values: &[u64], percentile: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let sorted = values.iter().copied().sorted_unstable().collect_vec();
    let position = (sorted.len() - 1) as f64 * percentile.clamp(0.0, 1.0);
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;

    let low = sorted[lower] as f64;
    let high = sorted[upper] as f64;
    Some(low + (high - low) * fraction)
}

/// Rows whose `total_cost` is below zero
///
/// Zero is not flagged.
#[must_use]
pub fn flag_negative_costs(rows: &[SummaryRow]) -> Vec<FlaggedRow> {
    rows.iter()
        .filter(|row| row.total_cost < Decimal::ZERO)
        .map(|row| FlaggedRow {
            row: row.clone(),
            reasons: smallvec![FlagReason::NegativeCost],
        })
        .collect()
}

/// Rows whose `total_encounters` is strictly above the given percentile
///
/// When every count is equal the threshold equals that count and nothing is
/// flagged.
#[must_use]
pub fn flag_high_encounter_counts(rows: &[SummaryRow], percentile: f64) -> Vec<FlaggedRow> {
    let counts = rows.iter().map(|row| row.total_encounters).collect_vec();
    let Some(threshold) = quantile(&counts, percentile) else {
        return Vec::new();
    };

    let reason = FlagReason::HighEncounterCount {
        threshold: format!("{threshold:.0}"),
        percentile: format!("{:.0}", percentile * 100.0),
    };

    rows.iter()
        .filter(|row| row.total_encounters as f64 > threshold)
        .map(|row| FlaggedRow {
            row: row.clone(),
            reasons: smallvec![reason.clone()],
        })
        .collect()
}
