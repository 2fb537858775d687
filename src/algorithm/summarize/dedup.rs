//! Latest-version selection per `encounter_id`.

use std::cmp::Ordering;

use rustc_hash::FxHashMap;

use crate::models::EncounterRecord;

/// Canonical encounters selected from a set of raw versions
#[derive(Debug, Clone, Default)]
pub struct DedupOutcome<'a> {
    /// One record per `encounter_id`, sorted by `encounter_id`
    pub canonical: Vec<&'a EncounterRecord>,
    /// Encounters whose latest `updated_at` was shared by versions with different content, sorted
    pub ties: Vec<String>,
    /// Number of records examined
    pub examined: usize,
}

impl DedupOutcome<'_> {
    /// Versions discarded because a later one exists
    #[must_use]
    pub fn superseded(&self) -> usize {
        self.examined - self.canonical.len()
    }
}

/// Rank two versions of the same encounter; `Greater` means `a` should be kept
///
/// Later `updated_at` wins. Versions with the same `updated_at` are ranked by
/// [`EncounterRecord::cmp_content`], the smaller content winning, so the
/// choice does not depend on input order.
#[must_use]
pub fn latest_wins(a: &EncounterRecord, b: &EncounterRecord) -> Ordering {
    a.updated_at
        .cmp(&b.updated_at)
        .then_with(|| b.cmp_content(a))
}

struct Candidate<'a> {
    best: &'a EncounterRecord,
    tied: bool,
}

impl<'a> Candidate<'a> {
    fn offer(&mut self, record: &'a EncounterRecord) {
        if record.updated_at == self.best.updated_at {
            self.tied |= record.cmp_content(self.best) != Ordering::Equal;
        } else if record.updated_at > self.best.updated_at {
            self.tied = false;
        }

        if latest_wins(record, self.best) == Ordering::Greater {
            self.best = record;
        }
    }
}

/// Keep the latest version of every encounter
///
/// A single pass folds each record into the current best candidate for its
/// `encounter_id`; older versions are never collected.
pub fn deduplicate<'a, I>(records: I) -> DedupOutcome<'a>
where
    I: IntoIterator<Item = &'a EncounterRecord>,
{
    let mut candidates: FxHashMap<&'a str, Candidate<'a>> = FxHashMap::default();
    let mut examined = 0;

    for record in records {
        examined += 1;
        candidates
            .entry(record.encounter_id.as_str())
            .and_modify(|candidate| candidate.offer(record))
            .or_insert(Candidate {
                best: record,
                tied: false,
            });
    }

    let mut ties = Vec::new();
    let mut canonical = Vec::with_capacity(candidates.len());
    for (encounter_id, candidate) in candidates {
        if candidate.tied {
            ties.push(encounter_id.to_string());
        }
        canonical.push(candidate.best);
    }

    canonical.sort_unstable_by(|a, b| a.encounter_id.cmp(&b.encounter_id));
    ties.sort_unstable();

    DedupOutcome {
        canonical,
        ties,
        examined,
    }
}
