use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use encounter_analytics::loader::{load_encounters, read_encounters_csv, read_encounters_parquet};
use encounter_analytics::models::RawField;
use encounter_analytics::utils::io::{write_encounters_parquet, write_parquet};
use encounter_analytics::{DEFAULT_BATCH_SIZE, DateFormatConfig, Error, validate_records};
use tempfile::TempDir;

use crate::utils::{RAW_CSV_HEADER, at, date, dec, example_records, test_config, write_file};

#[test]
fn test_parquet_round_trip() -> encounter_analytics::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("raw_encounters.parquet");
    write_encounters_parquet(&path, &example_records())?;

    let rows = read_encounters_parquet(&path, 2, &DateFormatConfig::default())?;
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2].row_index, 2);

    let records = validate_records(rows, Default::default())?;
    assert_eq!(records, example_records());
    Ok(())
}

#[test]
fn test_csv_input() -> encounter_analytics::Result<()> {
    let dir = TempDir::new()?;
    let contents = format!(
        "{RAW_CSV_HEADER}\n\
         E0001,P001,F001,2025-01-15,A01,100.00,2025-01-15 08:00:00\n\
         E0001,P001,F001,2025-01-15,A01,-20.00,2025-01-20T08:00:00\n\
         E0002,P001,F001,2025/01/28,B02,50,2025-01-28T09:00:00+01:00\n"
    );
    let path = write_file(dir.path(), "raw.csv", &contents);

    let rows = read_encounters_csv(&path, &DateFormatConfig::default())?;
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2].encounter_date, RawField::Present(date(2025, 1, 28)));
    assert_eq!(rows[2].updated_at, RawField::Present(at(2025, 1, 28, 8)));
    assert_eq!(rows[1].cost, RawField::Present(dec("-20.00")));
    Ok(())
}

#[test]
fn test_csv_gaps_reach_validation() -> encounter_analytics::Result<()> {
    let dir = TempDir::new()?;
    let contents = format!(
        "{RAW_CSV_HEADER}\n\
         E0001,P001,F001,2025-01-15,A01,100.00,2025-01-15 08:00:00\n\
         E0002,P001,,2025-01-16,A01,10.00,2025-01-16 08:00:00\n"
    );
    let path = write_file(dir.path(), "raw.csv", &contents);

    let rows = read_encounters_csv(&path, &DateFormatConfig::default())?;
    let err = validate_records(rows, Default::default()).unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidRecord { ref encounter_id, field: "facility_id", .. } if encounter_id == "E0002"
    ));
    Ok(())
}

#[test]
fn test_csv_missing_column() -> encounter_analytics::Result<()> {
    let dir = TempDir::new()?;
    let path = write_file(
        dir.path(),
        "raw.csv",
        "encounter_id,patient_id\nE0001,P001\n",
    );
    let err = read_encounters_csv(&path, &DateFormatConfig::default()).unwrap_err();
    assert!(matches!(err, Error::Schema(ref msg) if msg.contains("updated_at")));
    Ok(())
}

#[test]
fn test_parquet_with_text_and_float_columns() -> encounter_analytics::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("loose.parquet");

    let text = |values: &[&str]| -> ArrayRef { Arc::new(StringArray::from(values.to_vec())) };
    let schema = Arc::new(Schema::new(vec![
        Field::new("encounter_id", DataType::Utf8, true),
        Field::new("patient_id", DataType::Utf8, true),
        Field::new("facility_id", DataType::Utf8, true),
        Field::new("encounter_date", DataType::Utf8, true),
        Field::new("diagnosis_code", DataType::Utf8, true),
        Field::new("cost", DataType::Float64, true),
        Field::new("updated_at", DataType::Utf8, true),
        Field::new("source_system", DataType::Utf8, true),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            text(&["E0001"]),
            text(&["P001"]),
            text(&["F001"]),
            text(&["2025-01-15"]),
            text(&["A01"]),
            Arc::new(Float64Array::from(vec![100.1])),
            text(&["2025-01-20 08:00:00"]),
            text(&["legacy"]),
        ],
    )?;
    write_parquet(&path, schema, &[batch])?;

    let rows = read_encounters_parquet(&path, DEFAULT_BATCH_SIZE, &DateFormatConfig::default())?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].cost, RawField::Present(dec("100.1")));
    assert_eq!(rows[0].updated_at, RawField::Present(at(2025, 1, 20, 8)));
    Ok(())
}

#[test]
fn test_directory_input_keeps_file_order() -> encounter_analytics::Result<()> {
    let dir = TempDir::new()?;
    let records = example_records();
    write_encounters_parquet(&dir.path().join("part-0.parquet"), &records[..2])?;
    write_encounters_parquet(&dir.path().join("part-1.parquet"), &records[2..])?;
    write_file(dir.path(), "notes.txt", "ignored");

    let config = test_config(dir.path(), dir.path());
    let rows = load_encounters(&config)?;
    assert_eq!(rows.len(), 3);
    assert_eq!(
        rows.iter().map(|r| r.row_index).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
    assert_eq!(validate_records(rows, Default::default())?, records);
    Ok(())
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir.path().join("absent.parquet"), dir.path());
    assert!(matches!(load_encounters(&config), Err(Error::Io(_))));
}
