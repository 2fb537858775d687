use std::collections::HashSet;

use encounter_analytics::generator::write_encounters;
use encounter_analytics::{
    GeneratorConfig, PipelineConfig, YearMonth, generate_encounters, run_pipeline, summarize,
};
use rust_decimal::Decimal;
use tempfile::TempDir;

#[test]
fn test_fixture_shape() -> encounter_analytics::Result<()> {
    let records = generate_encounters(&GeneratorConfig::default())?;
    assert_eq!(records.len(), 1000);

    let patients: HashSet<_> = records.iter().map(|r| r.patient_id.as_str()).collect();
    let facilities: HashSet<_> = records.iter().map(|r| r.facility_id.as_str()).collect();
    assert_eq!(patients.len(), 50);
    assert_eq!(facilities.len(), 5);
    assert!(patients.iter().all(|p| p.len() == 4 && p.starts_with('P')));

    let ids: HashSet<_> = records.iter().map(|r| r.encounter_id.as_str()).collect();
    assert!(ids.len() < records.len(), "expected late-update duplicates");

    let negatives = records.iter().filter(|r| r.cost < Decimal::ZERO).count();
    assert!(negatives > 0 && negatives < 50);
    assert!(records.iter().all(|r| r.updated_at.date() >= r.encounter_date));
    Ok(())
}

#[test]
fn test_fixture_months() -> encounter_analytics::Result<()> {
    let records = generate_encounters(&GeneratorConfig::default())?;
    let rows = summarize(&records).unwrap();
    let months: HashSet<_> = rows.iter().map(|r| r.year_month).collect();
    let expected: HashSet<_> = (1..=3).map(|m| YearMonth::new(2025, m)).collect();
    assert_eq!(months, expected);

    let distinct = records
        .iter()
        .map(|r| r.encounter_id.as_str())
        .collect::<HashSet<_>>()
        .len() as u64;
    assert_eq!(rows.iter().map(|r| r.total_encounters).sum::<u64>(), distinct);
    Ok(())
}

#[test]
fn test_generated_csv_feeds_pipeline() -> encounter_analytics::Result<()> {
    let dir = TempDir::new()?;
    let config = GeneratorConfig {
        rows: 300,
        random_seed: Some(11),
        ..Default::default()
    };
    let records = generate_encounters(&config)?;
    let input = dir.path().join("raw_encounters.csv");
    write_encounters(&input, &records)?;

    let outcome = run_pipeline(&PipelineConfig {
        input,
        output_dir: dir.path().join("output"),
        ..Default::default()
    })?;
    assert_eq!(outcome.summary.rows, summarize(&records).unwrap());
    Ok(())
}

#[test]
fn test_unknown_output_extension() {
    let dir = TempDir::new().unwrap();
    let err = write_encounters(&dir.path().join("raw.json"), &[]).unwrap_err();
    assert!(matches!(err, encounter_analytics::Error::Config(_)));
}
