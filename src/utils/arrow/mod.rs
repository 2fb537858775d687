//! Arrow data handling utilities
//!
//! Column lookup and typed extraction of raw encounter fields from record
//! batches.

pub mod array_utils;
pub mod extractors;

// Re-export commonly used functions for convenience
pub use array_utils::{downcast_array, get_column, get_column_as};
pub use extractors::{extract_costs, extract_dates, extract_strings, extract_timestamps};
