//! Arrow schemas of the raw encounter table and the summary output.

pub mod date_utils;

use std::sync::Arc;

use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};

use crate::error::{Error, Result};
use crate::models::encounter::{COST_PRECISION, COST_SCALE};

pub const ENCOUNTER_ID: &str = "encounter_id";
pub const PATIENT_ID: &str = "patient_id";
pub const FACILITY_ID: &str = "facility_id";
pub const ENCOUNTER_DATE: &str = "encounter_date";
pub const DIAGNOSIS_CODE: &str = "diagnosis_code";
pub const COST: &str = "cost";
pub const UPDATED_AT: &str = "updated_at";

pub const YEAR_MONTH: &str = "year_month";
pub const TOTAL_ENCOUNTERS: &str = "total_encounters";
pub const TOTAL_COST: &str = "total_cost";
pub const DISTINCT_DIAGNOSIS_COUNT: &str = "distinct_diagnosis_count";

/// Precision of `total_cost` in parquet output
pub const TOTAL_COST_PRECISION: u8 = 18;

/// Columns every raw encounter table must provide
pub const RAW_COLUMNS: [&str; 7] = [
    ENCOUNTER_ID,
    PATIENT_ID,
    FACILITY_ID,
    ENCOUNTER_DATE,
    DIAGNOSIS_CODE,
    COST,
    UPDATED_AT,
];

/// Schema written by the generator for `raw_encounters`
#[must_use]
pub fn raw_encounter_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new(ENCOUNTER_ID, DataType::Utf8, false),
        Field::new(PATIENT_ID, DataType::Utf8, false),
        Field::new(FACILITY_ID, DataType::Utf8, false),
        Field::new(ENCOUNTER_DATE, DataType::Date32, false),
        Field::new(DIAGNOSIS_CODE, DataType::Utf8, false),
        Field::new(
            COST,
            DataType::Decimal128(COST_PRECISION as u8, COST_SCALE as i8),
            false,
        ),
        Field::new(
            UPDATED_AT,
            DataType::Timestamp(TimeUnit::Microsecond, None),
            false,
        ),
    ]))
}

/// Schema of the monthly summary in parquet output
#[must_use]
pub fn summary_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new(PATIENT_ID, DataType::Utf8, false),
        Field::new(FACILITY_ID, DataType::Utf8, false),
        Field::new(YEAR_MONTH, DataType::Utf8, false),
        Field::new(TOTAL_ENCOUNTERS, DataType::UInt64, false),
        Field::new(
            TOTAL_COST,
            DataType::Decimal128(TOTAL_COST_PRECISION, COST_SCALE as i8),
            false,
        ),
        Field::new(DISTINCT_DIAGNOSIS_COUNT, DataType::UInt64, false),
    ]))
}

const fn is_text(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View
    )
}

/// Whether a column of the given type can be read into the named raw field
#[must_use]
pub fn is_supported_type(column: &str, data_type: &DataType) -> bool {
    match column {
        ENCOUNTER_DATE => {
            is_text(data_type)
                || matches!(
                    data_type,
                    DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _)
                )
        }
        COST => {
            is_text(data_type)
                || matches!(
                    data_type,
                    DataType::Decimal128(_, _)
                        | DataType::Float32
                        | DataType::Float64
                        | DataType::Int32
                        | DataType::Int64
                )
        }
        UPDATED_AT => {
            is_text(data_type)
                || matches!(
                    data_type,
                    DataType::Timestamp(_, _) | DataType::Date32 | DataType::Date64
                )
        }
        _ => is_text(data_type),
    }
}

/// A struct that represents the compatibility of an input table with the raw schema
#[derive(Debug, Default)]
pub struct SchemaCompatibilityReport {
    /// Whether the table can be read
    pub compatible: bool,
    /// List of incompatibility issues, if any
    pub issues: Vec<SchemaIssue>,
}

/// A schema compatibility issue
#[derive(Debug)]
pub struct SchemaIssue {
    /// The file whose schema was checked
    pub file_path: String,
    /// The column concerned
    pub column: String,
    /// Description of the incompatibility
    pub description: String,
}

/// Check that a table schema provides every raw column in a readable type
#[must_use]
pub fn check_raw_schema(schema: &Schema, file_path: &str) -> SchemaCompatibilityReport {
    let mut issues = Vec::new();

    for column in RAW_COLUMNS {
        match schema.field_with_name(column) {
            Ok(field) if is_supported_type(column, field.data_type()) => {}
            Ok(field) => issues.push(SchemaIssue {
                file_path: file_path.to_string(),
                column: column.to_string(),
                description: format!("unsupported type {}", field.data_type()),
            }),
            Err(_) => issues.push(SchemaIssue {
                file_path: file_path.to_string(),
                column: column.to_string(),
                description: "column not found".to_string(),
            }),
        }
    }

    SchemaCompatibilityReport {
        compatible: issues.is_empty(),
        issues,
    }
}

impl SchemaCompatibilityReport {
    /// Turn an incompatible report into an error listing every issue
    pub fn into_result(self) -> Result<()> {
        if self.compatible {
            return Ok(());
        }
        let details = self
            .issues
            .iter()
            .map(|issue| {
                format!(
                    "{}: column '{}' {}",
                    issue.file_path, issue.column, issue.description
                )
            })
            .collect::<Vec<_>>()
            .join("; ");
        Err(Error::Schema(details))
    }
}
