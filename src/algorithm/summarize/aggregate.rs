//! Monthly aggregation of canonical encounters.

use itertools::Itertools;
use rust_decimal::Decimal;
use rustc_hash::{FxHashMap, FxHashSet};

use super::bucket::group_key;
use crate::error::{Error, Result};
use crate::models::{EncounterRecord, GroupKey, SummaryRow};

#[derive(Default)]
struct GroupAccumulator<'a> {
    total_encounters: u64,
    total_cost: Decimal,
    diagnoses: FxHashSet<&'a str>,
}

impl<'a> GroupAccumulator<'a> {
    fn add(&mut self, record: &'a EncounterRecord) -> Result<()> {
        self.total_cost = self.total_cost.checked_add(record.cost).ok_or_else(|| {
            Error::invalid_record(
                record.encounter_id.as_str(),
                "cost",
                format!(
                    "{} pushes the group total_cost past the decimal range",
                    record.cost
                ),
            )
        })?;
        self.total_encounters += 1;
        self.diagnoses.insert(record.diagnosis_code.as_str());
        Ok(())
    }

    fn into_row(self, key: GroupKey) -> SummaryRow {
        SummaryRow {
            patient_id: key.patient_id,
            facility_id: key.facility_id,
            year_month: key.year_month,
            total_encounters: self.total_encounters,
            total_cost: self.total_cost,
            distinct_diagnosis_count: self.diagnoses.len() as u64,
        }
    }
}

/// Aggregate canonical encounters into summary rows sorted by group key
///
/// Every record must be the only version of its `encounter_id`; the
/// encounter count is a plain count.
///
/// # Errors
/// Fails when a group's `total_cost` would overflow `Decimal`
pub fn aggregate<'a, I>(canonical: I) -> Result<Vec<SummaryRow>>
where
    I: IntoIterator<Item = &'a EncounterRecord>,
{
    let mut groups: FxHashMap<GroupKey, GroupAccumulator<'a>> = FxHashMap::default();

    for record in canonical {
        groups.entry(group_key(record)).or_default().add(record)?;
    }

    Ok(groups
        .into_iter()
        .sorted_unstable_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(key, accumulator)| accumulator.into_row(key))
        .collect_vec())
}
