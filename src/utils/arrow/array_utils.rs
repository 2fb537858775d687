//! Utilities for working with Arrow arrays.
//!
//! Column lookup, downcasting and type casting with errors that name the
//! column involved.

use arrow::array::{Array, ArrayRef};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use log::debug;

use crate::error::{Error, Result};

/// Get a required column from a record batch by name
///
/// # Errors
/// Returns a schema error if the column does not exist
pub fn get_column<'a>(batch: &'a RecordBatch, column_name: &str) -> Result<&'a ArrayRef> {
    let idx = batch
        .schema()
        .index_of(column_name)
        .map_err(|_| Error::Schema(format!("column '{column_name}' not found in record batch")))?;
    Ok(batch.column(idx))
}

/// Get a column cast to the given type, casting only when the types differ
pub fn get_column_as(
    batch: &RecordBatch,
    column_name: &str,
    expected_type: &DataType,
) -> Result<ArrayRef> {
    let column = get_column(batch, column_name)?;
    if column.data_type() == expected_type {
        return Ok(column.clone());
    }

    debug!(
        "Casting column '{column_name}' from {} to {expected_type}",
        column.data_type()
    );
    cast(column, expected_type).map_err(|e| {
        Error::Schema(format!(
            "column '{column_name}' cannot be read as {expected_type}: {e}"
        ))
    })
}

/// Downcast a column to a specific array type with clear error messages
///
/// # Arguments
///
/// * `array` - The array reference to downcast
/// * `column_name` - The name of the column (for error messages)
/// * `expected_type_name` - A human-readable name of the expected type (for error messages)
pub fn downcast_array<'a, A: Array + 'static>(
    array: &'a ArrayRef,
    column_name: &str,
    expected_type_name: &str,
) -> Result<&'a A> {
    array.as_any().downcast_ref::<A>().ok_or_else(|| {
        Error::Schema(format!(
            "column '{column_name}' is {}, expected {expected_type_name}",
            array.data_type()
        ))
    })
}
