//! Domain models for the encounter pipeline
//!
//! Raw and validated encounter records on the input side, monthly summary
//! rows and data quality flags on the output side.

pub mod encounter;
pub mod summary;

// Re-export commonly used types
pub use encounter::{EncounterRecord, RawEncounterRow, RawField};
pub use summary::{FlagReason, FlaggedRow, GroupKey, SummaryRow, YearMonth};
