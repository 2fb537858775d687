use crate::utils::summary_row;
use encounter_analytics::YearMonth;
use encounter_analytics::algorithm::summarize::year_month;

#[test]
fn test_year_month_display_and_order() {
    assert_eq!(YearMonth::new(2025, 3).to_string(), "2025-03");
    assert_eq!(YearMonth::new(987, 11).to_string(), "0987-11");
    assert!(YearMonth::new(2024, 12) < YearMonth::new(2025, 1));
    assert_eq!(
        year_month(crate::utils::date(2025, 1, 31)),
        YearMonth::new(2025, 1)
    );
}

#[test]
fn test_summary_row_json() {
    let row = summary_row("P001", "F001", 1, 2, "30.00", 2);
    let json = serde_json::to_value(&row).unwrap();
    assert_eq!(json["year_month"], "2025-01");
    assert_eq!(json["total_cost"], "30.00");
    assert_eq!(json["total_encounters"], 2);
}

#[test]
fn test_summary_key_ordering() {
    let a = summary_row("P001", "F002", 1, 1, "1.00", 1);
    let b = summary_row("P001", "F010", 1, 1, "1.00", 1);
    let c = summary_row("P002", "F001", 1, 1, "1.00", 1);
    assert!(a.key() < b.key());
    assert!(b.key() < c.key());
}
