//! Field extraction utilities for Arrow record batches
//!
//! Each extractor reads one whole column into [`RawField`] values. Nulls
//! become `Missing`; values of a readable type that cannot be interpreted
//! become `Malformed` and are reported later by validation.

use arrow::array::{
    Array, Date32Array, Decimal128Array, Float64Array, Int64Array, StringArray,
    TimestampMicrosecondArray,
};
use arrow::datatypes::{DataType, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::config::DateFormatConfig;
use crate::error::{Error, Result};
use crate::models::RawField;
use crate::schema::date_utils::{parse_amount, parse_date_string, parse_timestamp_string};
use crate::utils::arrow::array_utils::{downcast_array, get_column, get_column_as};

fn collect_text<T>(
    batch: &RecordBatch,
    column_name: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Vec<RawField<T>>> {
    let array = get_column_as(batch, column_name, &DataType::Utf8)?;
    let strings = downcast_array::<StringArray>(&array, column_name, "Utf8")?;

    Ok((0..strings.len())
        .map(|i| {
            if strings.is_null(i) {
                return RawField::Missing;
            }
            let text = strings.value(i);
            parse(text).map_or_else(|| RawField::Malformed(text.to_string()), RawField::Present)
        })
        .collect())
}

/// Extract a string column
///
/// Empty strings are kept as present values so that validation can name them.
pub fn extract_strings(batch: &RecordBatch, column_name: &str) -> Result<Vec<RawField<String>>> {
    collect_text(batch, column_name, |text| Some(text.to_string()))
}

/// Extract a date column stored as Date32, Date64, a timestamp or text
pub fn extract_dates(
    batch: &RecordBatch,
    column_name: &str,
    config: &DateFormatConfig,
) -> Result<Vec<RawField<NaiveDate>>> {
    let data_type = get_column(batch, column_name)?.data_type().clone();

    match data_type {
        DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => {
            let array = get_column_as(batch, column_name, &DataType::Date32)?;
            let dates = downcast_array::<Date32Array>(&array, column_name, "Date32")?;
            Ok((0..dates.len())
                .map(|i| {
                    if dates.is_null(i) {
                        RawField::Missing
                    } else {
                        dates.value_as_date(i).map_or_else(
                            || RawField::Malformed(dates.value(i).to_string()),
                            RawField::Present,
                        )
                    }
                })
                .collect())
        }
        _ => collect_text(batch, column_name, |text| {
            parse_date_string(text.trim(), config)
        }),
    }
}

/// Extract a timestamp column stored as a timestamp of any unit, a date or text
pub fn extract_timestamps(
    batch: &RecordBatch,
    column_name: &str,
    config: &DateFormatConfig,
) -> Result<Vec<RawField<NaiveDateTime>>> {
    let data_type = get_column(batch, column_name)?.data_type().clone();

    match data_type {
        DataType::Timestamp(_, _) | DataType::Date32 | DataType::Date64 => {
            let target = DataType::Timestamp(TimeUnit::Microsecond, None);
            let array = get_column_as(batch, column_name, &target)?;
            let timestamps =
                downcast_array::<TimestampMicrosecondArray>(&array, column_name, "Timestamp")?;
            Ok((0..timestamps.len())
                .map(|i| {
                    if timestamps.is_null(i) {
                        RawField::Missing
                    } else {
                        timestamps.value_as_datetime(i).map_or_else(
                            || RawField::Malformed(timestamps.value(i).to_string()),
                            RawField::Present,
                        )
                    }
                })
                .collect())
        }
        _ => collect_text(batch, column_name, |text| {
            parse_timestamp_string(text.trim(), config)
        }),
    }
}

fn decimal_from_f64(value: f64) -> Option<Decimal> {
    if value.is_finite() {
        parse_amount(&value.to_string())
    } else {
        None
    }
}

/// Extract a cost column stored as Decimal128, a float, an integer or text
///
/// Floats go through their shortest decimal representation, so `100.1`
/// becomes exactly `100.1`.
pub fn extract_costs(batch: &RecordBatch, column_name: &str) -> Result<Vec<RawField<Decimal>>> {
    let column = get_column(batch, column_name)?;

    match column.data_type().clone() {
        DataType::Decimal128(_, scale) => {
            let decimals = downcast_array::<Decimal128Array>(column, column_name, "Decimal128")?;
            Ok((0..decimals.len())
                .map(|i| {
                    if decimals.is_null(i) {
                        return RawField::Missing;
                    }
                    let value = decimals.value(i);
                    u32::try_from(scale)
                        .ok()
                        .and_then(|scale| Decimal::try_from_i128_with_scale(value, scale).ok())
                        .map_or_else(
                            || RawField::Malformed(decimals.value_as_string(i)),
                            RawField::Present,
                        )
                })
                .collect())
        }
        DataType::Float32 | DataType::Float64 => {
            let array = get_column_as(batch, column_name, &DataType::Float64)?;
            let floats = downcast_array::<Float64Array>(&array, column_name, "Float64")?;
            Ok((0..floats.len())
                .map(|i| {
                    if floats.is_null(i) {
                        return RawField::Missing;
                    }
                    let value = floats.value(i);
                    decimal_from_f64(value)
                        .map_or_else(|| RawField::Malformed(value.to_string()), RawField::Present)
                })
                .collect())
        }
        DataType::Int32 | DataType::Int64 => {
            let array = get_column_as(batch, column_name, &DataType::Int64)?;
            let ints = downcast_array::<Int64Array>(&array, column_name, "Int64")?;
            Ok((0..ints.len())
                .map(|i| {
                    if ints.is_null(i) {
                        RawField::Missing
                    } else {
                        RawField::Present(Decimal::from(ints.value(i)))
                    }
                })
                .collect())
        }
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => {
            collect_text(batch, column_name, |text| parse_amount(text.trim()))
        }
        other => Err(Error::Schema(format!(
            "column '{column_name}' has unsupported type {other}"
        ))),
    }
}
