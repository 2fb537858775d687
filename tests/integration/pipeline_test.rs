use std::fs;

use encounter_analytics::algorithm::report::{
    ANALYTICS_SUMMARY_FILE, ANALYTICS_SUMMARY_PARQUET_FILE, CLEANED_FILE, FLAGGED_FILE,
    REPORT_FILE, RUN_SUMMARY_FILE,
};
use encounter_analytics::utils::io::{read_parquet, write_encounters_parquet};
use encounter_analytics::{Error, run_pipeline};
use tempfile::TempDir;

use crate::utils::{RAW_CSV_HEADER, example_records, test_config, write_file};

#[test]
fn test_pipeline_writes_every_output() -> encounter_analytics::Result<()> {
    let dir = TempDir::new()?;
    let input = dir.path().join("raw_encounters.parquet");
    write_encounters_parquet(&input, &example_records())?;
    let output_dir = dir.path().join("output");

    let config = test_config(&input, &output_dir);
    let outcome = run_pipeline(&config)?;
    assert_eq!(outcome.summary.rows.len(), 1);
    assert_eq!(outcome.summary.stats.superseded_versions, 1);

    let summary_csv = fs::read_to_string(output_dir.join(ANALYTICS_SUMMARY_FILE))?;
    assert_eq!(
        summary_csv,
        "patient_id,facility_id,year_month,total_encounters,total_cost,distinct_diagnosis_count\n\
         P001,F001,2025-01,2,30.00,2\n"
    );

    let flagged_csv = fs::read_to_string(output_dir.join(FLAGGED_FILE))?;
    assert_eq!(flagged_csv.lines().count(), 1);
    assert!(flagged_csv.ends_with("flag_reason\n"));

    let cleaned_csv = fs::read_to_string(output_dir.join(CLEANED_FILE))?;
    assert_eq!(cleaned_csv.lines().count(), 2);

    let batches = read_parquet(&output_dir.join(ANALYTICS_SUMMARY_PARQUET_FILE), &[], 1024)?;
    assert_eq!(batches.iter().map(|b| b.num_rows()).sum::<usize>(), 1);

    let report = fs::read_to_string(output_dir.join(REPORT_FILE))?;
    assert!(report.contains("PIPELINE REPORT"));
    assert_eq!(report, outcome.report);

    let run_summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(output_dir.join(RUN_SUMMARY_FILE))?)?;
    assert_eq!(run_summary["summary_rows"], 1);
    assert_eq!(run_summary["dedup"]["raw_records"], 3);
    assert_eq!(run_summary["outputs"].as_array().map(Vec::len), Some(6));
    Ok(())
}

#[test]
fn test_malformed_input_writes_nothing() -> encounter_analytics::Result<()> {
    let dir = TempDir::new()?;
    let contents = format!(
        "{RAW_CSV_HEADER}\n\
         E0001,P001,F001,2025-01-15,A01,100.00,2025-01-15 08:00:00\n\
         E0002,P001,F001,2025-01-16,A01,ten,2025-01-16 08:00:00\n"
    );
    let input = write_file(dir.path(), "raw.csv", &contents);
    let output_dir = dir.path().join("output");

    let err = run_pipeline(&test_config(&input, &output_dir)).unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidRecord { ref encounter_id, field: "cost", .. } if encounter_id == "E0002"
    ));
    assert!(!output_dir.exists());
    Ok(())
}

#[test]
fn test_unstorable_cost_writes_nothing() -> encounter_analytics::Result<()> {
    let dir = TempDir::new()?;
    let contents = format!(
        "{RAW_CSV_HEADER}\n\
         E0001,P001,F001,2025-01-15,A01,1.005,2025-01-15 08:00:00\n"
    );
    let input = write_file(dir.path(), "raw.csv", &contents);
    let output_dir = dir.path().join("output");

    let mut config = test_config(&input, &output_dir);
    config.enforce_column_limits = false;

    let err = run_pipeline(&config).unwrap_err();
    assert!(matches!(err, Error::Schema(_)));
    assert!(!output_dir.exists());
    Ok(())
}

#[test]
fn test_empty_input_gives_empty_outputs() -> encounter_analytics::Result<()> {
    let dir = TempDir::new()?;
    let input = write_file(dir.path(), "raw.csv", &format!("{RAW_CSV_HEADER}\n"));
    let output_dir = dir.path().join("output");

    let outcome = run_pipeline(&test_config(&input, &output_dir))?;
    assert!(outcome.summary.rows.is_empty());
    assert!(outcome.quality.flagged.is_empty());

    let summary_csv = fs::read_to_string(output_dir.join(ANALYTICS_SUMMARY_FILE))?;
    assert_eq!(summary_csv.lines().count(), 1);
    assert!(outcome.report.contains("No rows to summarize"));
    Ok(())
}

#[test]
fn test_invalid_percentile_rejected() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(&dir.path().join("raw.csv"), dir.path());
    config.quality_percentile = 2.0;
    assert!(matches!(run_pipeline(&config), Err(Error::Config(_))));
}
