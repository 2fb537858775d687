//! Parsing of dates, timestamps and amounts from text columns.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::config::DateFormatConfig;
use crate::models::RawField;

/// Parse a date string with multiple format attempts
#[must_use]
pub fn parse_date_string(s: &str, config: &DateFormatConfig) -> Option<NaiveDate> {
    config
        .date_formats
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
}

/// Parse a timestamp string
///
/// Tries the configured formats, then RFC 3339 (converted to UTC), then a
/// bare date taken as midnight.
#[must_use]
pub fn parse_timestamp_string(s: &str, config: &DateFormatConfig) -> Option<NaiveDateTime> {
    config
        .timestamp_formats
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.naive_utc())
        })
        .or_else(|| parse_date_string(s, config).and_then(|d| d.and_hms_opt(0, 0, 0)))
}

/// Parse a decimal amount such as `-20.00`
#[must_use]
pub fn parse_amount(s: &str) -> Option<Decimal> {
    Decimal::from_str(s).ok()
}

/// Interpret an optional text cell, keeping unparseable text for error reporting
pub fn parse_field<T>(value: Option<&str>, parse: impl Fn(&str) -> Option<T>) -> RawField<T> {
    match value.map(str::trim) {
        None | Some("") => RawField::Missing,
        Some(text) => parse(text).map_or_else(|| RawField::Malformed(text.to_string()), RawField::Present),
    }
}
