//! Human-readable pipeline report.

use itertools::Itertools;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::algorithm::quality::QualityOutcome;
use crate::algorithm::summarize::DedupStats;
use crate::error::{Error, Result};
use crate::models::SummaryRow;

/// Output file holding every summary row
pub const ANALYTICS_SUMMARY_FILE: &str = "analytics_summary.csv";
/// Output file holding rows that passed every quality check
pub const CLEANED_FILE: &str = "cleaned_encounters.csv";
/// Output file holding flagged rows and their reasons
pub const FLAGGED_FILE: &str = "flagged_encounters.csv";
/// Output file holding the report text
pub const REPORT_FILE: &str = "pipeline_report.txt";
/// Parquet copy of the analytics summary
pub const ANALYTICS_SUMMARY_PARQUET_FILE: &str = "analytics_summary.parquet";
/// Machine-readable counters of a run
pub const RUN_SUMMARY_FILE: &str = "run_summary.json";

const RULE_WIDTH: usize = 65;

/// Format an integer with thousands separators
#[must_use]
pub fn format_count(value: usize) -> String {
    group_digits(&value.to_string())
}

/// Format an amount with two decimals and thousands separators
#[must_use]
pub fn format_amount(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{rounded:.2}");
    let (sign, unsigned) = text
        .strip_prefix('-')
        .map_or(("", text.as_str()), |rest| ("-", rest));
    let (integer, fraction) = unsigned.split_once('.').unwrap_or((unsigned, "00"));
    format!("{sign}{}.{fraction}", group_digits(integer))
}

fn group_digits(digits: &str) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Cost statistics over summary rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostSummary {
    pub total: Decimal,
    pub mean: Decimal,
    pub min: Decimal,
    pub max: Decimal,
}

impl CostSummary {
    /// Compute cost statistics; `None` when there are no rows
    ///
    /// # Errors
    /// Fails when the grand total overflows `Decimal`
    pub fn from_rows(rows: &[SummaryRow]) -> Result<Option<Self>> {
        let Some((min, max)) = rows
            .iter()
            .map(|row| row.total_cost)
            .minmax()
            .into_option()
        else {
            return Ok(None);
        };
        let total = rows
            .iter()
            .try_fold(Decimal::ZERO, |acc, row| acc.checked_add(row.total_cost))
            .ok_or_else(|| {
                Error::Overflow("total cost over all summary rows exceeds the decimal range".to_string())
            })?;
        let mean = total / Decimal::from(rows.len());
        Ok(Some(Self {
            total,
            mean,
            min,
            max,
        }))
    }
}

/// Build the pipeline report
pub fn generate_report(
    analytics: &[SummaryRow],
    quality: &QualityOutcome,
    dedup: Option<&DedupStats>,
) -> Result<String> {
    let rule = "=".repeat(RULE_WIDTH);
    let mut report = String::new();

    report.push_str(&format!("{rule}\n"));
    report.push_str("  HEALTHCARE ENCOUNTER ANALYTICS - PIPELINE REPORT\n");
    report.push_str(&format!("{rule}\n\n"));

    let patients = analytics.iter().map(|r| r.patient_id.as_str()).unique().count();
    let facilities = analytics.iter().map(|r| r.facility_id.as_str()).unique().count();
    let months = analytics
        .iter()
        .map(|r| r.year_month)
        .unique()
        .sorted()
        .map(|m| m.to_string())
        .join(", ");

    report.push_str("DATA OVERVIEW\n");
    report.push_str(&format!(
        "  Total aggregated rows (patient x facility x month): {}\n",
        format_count(analytics.len())
    ));
    report.push_str(&format!("  Unique patients:    {patients}\n"));
    report.push_str(&format!("  Unique facilities:  {facilities}\n"));
    report.push_str(&format!("  Reporting months:   [{months}]\n"));

    if let Some(stats) = dedup {
        report.push_str("\nDEDUPLICATION\n");
        report.push_str(&format!(
            "  Raw records:                  {}\n",
            format_count(stats.raw_records)
        ));
        report.push_str(&format!(
            "  Canonical encounters:         {}\n",
            format_count(stats.canonical_encounters)
        ));
        report.push_str(&format!(
            "  Superseded versions:          {}\n",
            format_count(stats.superseded_versions)
        ));
        report.push_str(&format!(
            "  Ambiguous latest versions:    {}\n",
            format_count(stats.tied_encounters.len())
        ));
    }

    report.push_str("\nCOST SUMMARY\n");
    match CostSummary::from_rows(analytics)? {
        Some(costs) => {
            report.push_str(&format!(
                "  Total cost (all records):     {}\n",
                format_amount(costs.total)
            ));
            report.push_str(&format!(
                "  Mean cost per row:            {}\n",
                format_amount(costs.mean)
            ));
            report.push_str(&format!(
                "  Min cost:                     {}\n",
                format_amount(costs.min)
            ));
            report.push_str(&format!(
                "  Max cost:                     {}\n",
                format_amount(costs.max)
            ));
        }
        None => report.push_str("  No rows to summarize\n"),
    }

    report.push_str("\nDATA QUALITY RESULTS\n");
    report.push_str(&format!(
        "  Records passing all checks:   {}\n",
        format_count(quality.cleaned.len())
    ));
    report.push_str(&format!(
        "  Records flagged:              {}\n",
        format_count(quality.flagged.len())
    ));

    if !quality.flagged.is_empty() {
        report.push_str("\n  FLAG BREAKDOWN:\n");
        for reason in quality.reasons() {
            report.push_str(&format!(
                "    - {reason}: {} record(s)\n",
                quality.count_with_reason(&reason)
            ));
        }
    }

    report.push_str("\nOUTPUT FILES\n");
    report.push_str(&format!(
        "  {ANALYTICS_SUMMARY_FILE:<24}- Full analytics output ({} rows)\n",
        analytics.len()
    ));
    report.push_str(&format!(
        "  {CLEANED_FILE:<24}- Quality-checked records ({} rows)\n",
        quality.cleaned.len()
    ));
    report.push_str(&format!(
        "  {FLAGGED_FILE:<24}- Flagged records ({} rows)\n",
        quality.flagged.len()
    ));
    report.push_str(&format!("\n{rule}"));

    Ok(report)
}
