use crate::utils::{at, date, dec, encounter, example_records};
use encounter_analytics::algorithm::summarize::{Summarizer, deduplicate, summarize};
use encounter_analytics::{EncounterRecord, Error, YearMonth};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

fn mixed_records() -> Vec<EncounterRecord> {
    let mut records = example_records();
    records.extend([
        encounter("E0003", "P002", "F001", date(2025, 1, 31), "C03", "75.50", at(2025, 2, 2, 9)),
        encounter("E0004", "P002", "F001", date(2025, 2, 1), "C03", "12.25", at(2025, 2, 1, 9)),
        encounter("E0004", "P002", "F001", date(2025, 2, 1), "D04", "18.75", at(2025, 2, 3, 9)),
        encounter("E0005", "P001", "F002", date(2025, 3, 10), "A01", "-5.00", at(2025, 3, 10, 9)),
        // Equal updated_at with different content
        encounter("E0006", "P003", "F003", date(2025, 3, 11), "B02", "40.00", at(2025, 3, 12, 9)),
        encounter("E0006", "P003", "F003", date(2025, 3, 11), "B02", "30.00", at(2025, 3, 12, 9)),
    ]);
    records
}

#[test]
fn test_example_scenario() {
    let rows = summarize(&example_records()).unwrap();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.patient_id, "P001");
    assert_eq!(row.facility_id, "F001");
    assert_eq!(row.year_month, YearMonth::new(2025, 1));
    assert_eq!(row.total_encounters, 2);
    assert_eq!(row.total_cost, dec("30.00"));
    assert_eq!(row.distinct_diagnosis_count, 2);
}

#[test]
fn test_empty_input() {
    assert!(summarize(&[]).unwrap().is_empty());
    let summary = Summarizer::new().summarize(&[]).unwrap();
    assert_eq!(summary.stats.raw_records, 0);
    assert!(summary.rows.is_empty());
}

#[test]
fn test_dedup_is_idempotent() {
    let records = mixed_records();
    let canonical: Vec<EncounterRecord> = deduplicate(&records)
        .canonical
        .into_iter()
        .cloned()
        .collect();
    assert_eq!(summarize(&canonical).unwrap(), summarize(&records).unwrap());

    let again: Vec<EncounterRecord> = deduplicate(&canonical)
        .canonical
        .into_iter()
        .cloned()
        .collect();
    assert_eq!(again, canonical);
}

#[test]
fn test_encounter_count_is_conserved() {
    let records = mixed_records();
    let rows = summarize(&records).unwrap();
    let total: u64 = rows.iter().map(|r| r.total_encounters).sum();
    assert_eq!(total, 6);
}

#[test]
fn test_negative_costs_are_kept() {
    let rows = summarize(&mixed_records()).unwrap();
    let refund = rows
        .iter()
        .find(|r| r.facility_id == "F002")
        .expect("row for P001/F002");
    assert_eq!(refund.total_cost, dec("-5.00"));
}

#[test]
fn test_grouping_by_calendar_month() {
    let rows = summarize(&mixed_records()).unwrap();
    let p002: Vec<_> = rows.iter().filter(|r| r.patient_id == "P002").collect();
    assert_eq!(p002.len(), 2);
    assert_eq!(p002[0].year_month, YearMonth::new(2025, 1));
    assert_eq!(p002[0].total_cost, dec("75.50"));
    // latest E0004 version carries D04 and 18.75
    assert_eq!(p002[1].year_month, YearMonth::new(2025, 2));
    assert_eq!(p002[1].total_cost, dec("18.75"));
    assert_eq!(p002[1].distinct_diagnosis_count, 1);
}

#[test]
fn test_rows_sorted_by_key() {
    let rows = summarize(&mixed_records()).unwrap();
    let keys: Vec<_> = rows.iter().map(|r| r.key()).collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
}

#[test]
fn test_equal_timestamps_resolve_to_smallest_content() {
    let summary = Summarizer::new().summarize(&mixed_records()).unwrap();
    let row = summary
        .rows
        .iter()
        .find(|r| r.patient_id == "P003")
        .expect("row for P003");
    assert_eq!(row.total_cost, dec("30.00"));
    assert_eq!(summary.stats.tied_encounters, vec!["E0006".to_string()]);
    assert_eq!(summary.stats.canonical_encounters, 6);
    assert_eq!(summary.stats.superseded_versions, 3);
}

#[test]
fn test_input_order_does_not_matter() {
    let records = mixed_records();
    let expected = summarize(&records).unwrap();

    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..20 {
        let mut shuffled = records.clone();
        shuffled.shuffle(&mut rng);
        assert_eq!(summarize(&shuffled).unwrap(), expected);
    }
}

#[test]
fn test_parallel_path_matches_sequential() {
    let records = mixed_records();
    let sequential = Summarizer::new()
        .with_parallel_threshold(usize::MAX)
        .summarize(&records)
        .unwrap();
    for shards in [1, 3, 16] {
        let parallel = Summarizer::new()
            .with_parallel_threshold(0)
            .with_shards(shards)
            .summarize(&records)
            .unwrap();
        assert_eq!(parallel.rows, sequential.rows);
        assert_eq!(parallel.stats, sequential.stats);
    }
}

#[test]
fn test_cost_scale_does_not_depend_on_input_order() {
    let short = encounter("E0007", "P004", "F001", date(2025, 1, 5), "A01", "100.1", at(2025, 1, 6, 9));
    let long = encounter("E0007", "P004", "F001", date(2025, 1, 5), "A01", "100.10", at(2025, 1, 6, 9));

    let forward = summarize(&[short.clone(), long.clone()]).unwrap();
    let backward = summarize(&[long, short]).unwrap();

    assert_eq!(forward, backward);
    assert_eq!(forward[0].total_cost.to_string(), backward[0].total_cost.to_string());
    assert_eq!(forward[0].total_cost.to_string(), "100.1");

    let summary = Summarizer::new()
        .summarize(&[
            encounter("E0007", "P004", "F001", date(2025, 1, 5), "A01", "100.10", at(2025, 1, 6, 9)),
            encounter("E0007", "P004", "F001", date(2025, 1, 5), "A01", "100.1", at(2025, 1, 6, 9)),
        ])
        .unwrap();
    assert_eq!(summary.stats.tied_encounters, vec!["E0007".to_string()]);
}

#[test]
fn test_overflowing_group_total_is_an_error() {
    let records = [
        encounter("E0008", "P005", "F001", date(2025, 1, 5), "A01", "50000000000000000000000000000", at(2025, 1, 6, 9)),
        encounter("E0009", "P005", "F001", date(2025, 1, 7), "A01", "50000000000000000000000000000", at(2025, 1, 8, 9)),
    ];
    for parallel_threshold in [0, usize::MAX] {
        let result = Summarizer::new()
            .with_parallel_threshold(parallel_threshold)
            .summarize(&records);
        assert!(matches!(result, Err(Error::InvalidRecord { field: "cost", .. })));
    }
}
