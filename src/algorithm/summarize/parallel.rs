//! Parallel deduplication for large inputs.
//!
//! Records are sharded by a hash of `encounter_id`, so every version of an
//! encounter lands in the same shard and shards never need merging. Each shard
//! runs the sequential fold on the rayon pool; the comparator is a total order,
//! so the winner does not depend on which worker handles a shard.

use std::hash::BuildHasher;

use rayon::prelude::*;
use rustc_hash::FxBuildHasher;

use super::dedup::{DedupOutcome, deduplicate};
use crate::models::EncounterRecord;

/// Number of shards used when none is given
#[must_use]
pub fn default_shard_count() -> usize {
    num_cpus::get().max(1) * 4
}

fn shard_of(encounter_id: &str, shards: usize) -> usize {
    (FxBuildHasher.hash_one(encounter_id) % shards as u64) as usize
}

/// Deduplicate on the rayon pool
///
/// Produces the same outcome as [`deduplicate`] for the same input.
#[must_use]
pub fn deduplicate_parallel(records: &[EncounterRecord], shards: usize) -> DedupOutcome<'_> {
    let shards = shards.max(1);
    let mut partitions: Vec<Vec<&EncounterRecord>> = vec![Vec::new(); shards];
    for record in records {
        partitions[shard_of(&record.encounter_id, shards)].push(record);
    }

    let outcomes: Vec<DedupOutcome<'_>> = partitions
        .into_par_iter()
        .map(|partition| deduplicate(partition))
        .collect();

    let mut merged = DedupOutcome::default();
    for outcome in outcomes {
        merged.canonical.extend(outcome.canonical);
        merged.ties.extend(outcome.ties);
        merged.examined += outcome.examined;
    }

    merged
        .canonical
        .par_sort_unstable_by(|a, b| a.encounter_id.cmp(&b.encounter_id));
    merged.ties.sort_unstable();
    merged
}
