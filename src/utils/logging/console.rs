//! Console output of summary and flagged rows.

use crate::algorithm::report::format_amount;
use crate::models::{FlaggedRow, SummaryRow};

const HEADER: &str = "patient_id  facility_id  year_month  total_encounters  total_cost  distinct_diagnosis_count";

fn format_row(row: &SummaryRow) -> String {
    format!(
        "{:<10}  {:<11}  {:<10}  {:>16}  {:>10}  {:>24}",
        row.patient_id,
        row.facility_id,
        row.year_month.to_string(),
        row.total_encounters,
        format_amount(row.total_cost),
        row.distinct_diagnosis_count
    )
}

/// Print the first `limit` summary rows as a table
pub fn print_summary_preview(rows: &[SummaryRow], limit: usize) {
    println!("{HEADER}");
    for row in rows.iter().take(limit) {
        println!("{}", format_row(row));
    }
}

/// Print every flagged row with its reasons
pub fn print_flagged_rows(flagged: &[FlaggedRow]) {
    if flagged.is_empty() {
        println!("  No records flagged.");
        return;
    }
    println!("{HEADER}  flag_reason");
    for entry in flagged {
        println!("{}  {}", format_row(&entry.row), entry.flag_reason());
    }
}
