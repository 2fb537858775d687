//! Deduplicate encounter versions and aggregate them into monthly summaries.
//!
//! The transformation runs in three steps:
//! 1. [`dedup`] keeps the latest version of every `encounter_id`
//! 2. [`bucket`] maps each canonical encounter to its
//!    `(patient_id, facility_id, year_month)` group
//! 3. [`aggregate`] counts, sums and sorts each group

pub mod aggregate;
pub mod bucket;
pub mod dedup;
pub mod parallel;

use std::time::Instant;

use log::{debug, warn};
use serde::Serialize;

use crate::config::DEFAULT_PARALLEL_DEDUP_THRESHOLD;
use crate::error::Result;
use crate::models::{EncounterRecord, SummaryRow};

pub use aggregate::aggregate;
pub use bucket::{group_key, year_month};
pub use dedup::{DedupOutcome, deduplicate, latest_wins};
pub use parallel::deduplicate_parallel;

/// Counters describing one summarization run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DedupStats {
    /// Raw records received
    pub raw_records: usize,
    /// Distinct `encounter_id`s kept
    pub canonical_encounters: usize,
    /// Older versions discarded
    pub superseded_versions: usize,
    /// Encounters whose latest version was ambiguous
    pub tied_encounters: Vec<String>,
}

/// Summary rows together with deduplication counters
#[derive(Debug, Clone, Default)]
pub struct Summary {
    pub rows: Vec<SummaryRow>,
    pub stats: DedupStats,
}

/// Configurable summarizer
#[derive(Debug, Clone)]
pub struct Summarizer {
    parallel_threshold: usize,
    shards: usize,
}

impl Default for Summarizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Summarizer {
    /// Create a summarizer with the default parallel threshold
    #[must_use]
    pub fn new() -> Self {
        Self {
            parallel_threshold: DEFAULT_PARALLEL_DEDUP_THRESHOLD,
            shards: parallel::default_shard_count(),
        }
    }

    /// Deduplicate in parallel once the input has at least `threshold` records
    #[must_use]
    pub const fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Number of shards used by the parallel path
    #[must_use]
    pub const fn with_shards(mut self, shards: usize) -> Self {
        self.shards = shards;
        self
    }

    /// Summarize validated encounter records
    ///
    /// # Errors
    /// Fails only when a group's `total_cost` overflows, which column limits rule out
    pub fn summarize(&self, records: &[EncounterRecord]) -> Result<Summary> {
        let start = Instant::now();

        let outcome = if records.len() >= self.parallel_threshold {
            debug!(
                "Deduplicating {} records across {} shards",
                records.len(),
                self.shards
            );
            deduplicate_parallel(records, self.shards)
        } else {
            deduplicate(records)
        };

        if let Some(first) = outcome.ties.first() {
            warn!(
                "{} encounter(s) have several versions sharing the latest updated_at (first: {first}); kept the smallest by content",
                outcome.ties.len()
            );
        }

        let rows = aggregate(outcome.canonical.iter().copied())?;

        debug!(
            "Summarized {} records into {} rows in {:?}",
            records.len(),
            rows.len(),
            start.elapsed()
        );

        let stats = DedupStats {
            raw_records: outcome.examined,
            canonical_encounters: outcome.canonical.len(),
            superseded_versions: outcome.superseded(),
            tied_encounters: outcome.ties,
        };

        Ok(Summary { rows, stats })
    }
}

/// Summarize with the default [`Summarizer`]
pub fn summarize(records: &[EncounterRecord]) -> Result<Vec<SummaryRow>> {
    Ok(Summarizer::new().summarize(records)?.rows)
}
