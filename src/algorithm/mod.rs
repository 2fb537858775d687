//! Algorithm implementations for the encounter pipeline
//!
//! This module contains the input contract checks, the deduplicating
//! monthly summarizer, the data quality checks run on its output, and the
//! report built from both.

pub mod quality;
pub mod report;
pub mod summarize;
pub mod validation;
