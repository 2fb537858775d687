use crate::utils::example_records;
use encounter_analytics::algorithm::validation::{ValidationOptions, validate_records};
use encounter_analytics::models::RawField;
use encounter_analytics::{Error, RawEncounterRow};

fn raw_rows() -> Vec<RawEncounterRow> {
    example_records()
        .into_iter()
        .enumerate()
        .map(|(i, record)| RawEncounterRow {
            row_index: i,
            ..RawEncounterRow::from(record)
        })
        .collect()
}

#[test]
fn test_valid_rows_pass() {
    let records = validate_records(raw_rows(), ValidationOptions::default()).unwrap();
    assert_eq!(records, example_records());
}

#[test]
fn test_first_bad_row_named() {
    let mut rows = raw_rows();
    rows[1].cost = RawField::Malformed("12,50".to_string());
    rows[2].patient_id = RawField::Missing;

    let err = validate_records(rows, ValidationOptions::default()).unwrap_err();
    match err {
        Error::InvalidRecord {
            encounter_id,
            field,
            ..
        } => {
            assert_eq!(encounter_id, "E0001");
            assert_eq!(field, "cost");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_id_uses_row_position() {
    let mut rows = raw_rows();
    rows[2].encounter_id = RawField::Missing;
    let err = validate_records(rows, ValidationOptions::default()).unwrap_err();
    assert!(err.to_string().contains("<row 2>"));
    assert!(err.to_string().contains("encounter_id"));
}

#[test]
fn test_column_limits_can_be_relaxed() {
    let mut rows = raw_rows();
    rows[0].diagnosis_code = RawField::Present("A01.234567890".to_string());

    assert!(validate_records(rows.clone(), ValidationOptions::default()).is_err());
    let relaxed = ValidationOptions {
        enforce_column_limits: false,
    };
    assert!(validate_records(rows, relaxed).is_ok());
}
