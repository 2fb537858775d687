//! Synthetic raw encounter tables with deliberate quality defects
//!
//! The generated table contains late-update versions of earlier encounters
//! and a small share of negative costs, which is what the summarizer and the
//! quality checks are meant to handle.

use std::path::Path;

use chrono::{Duration, NaiveDate, NaiveTime};
use log::info;
use rand::prelude::*;
use rand::seq::{SliceRandom, index};
use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::models::EncounterRecord;
use crate::utils::io::{write_encounters_csv, write_encounters_parquet};

/// Diagnosis codes drawn by the generator
pub const DIAGNOSIS_CODES: [&str; 10] = [
    "A09", "E11.9", "I10", "J06.9", "J45.909", "K21.9", "M54.5", "N39.0", "R51", "Z00.00",
];

/// Settings for a synthetic table
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Total rows, late updates included
    pub rows: usize,
    /// Patients `P001..`
    pub patients: usize,
    /// Facilities `F001..`
    pub facilities: usize,
    /// First possible encounter date
    pub start_date: NaiveDate,
    /// Last possible encounter date
    pub end_date: NaiveDate,
    /// Share of first versions with a negative cost
    pub negative_cost_ratio: f64,
    /// Share of rows that are later versions of an earlier encounter
    pub late_update_ratio: f64,
    /// Fixed seed; `None` draws one from the OS
    pub random_seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            rows: 1000,
            patients: 50,
            facilities: 5,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2025, 3, 31).unwrap_or_default(),
            negative_cost_ratio: 0.02,
            late_update_ratio: 0.10,
            random_seed: Some(42),
        }
    }
}

impl GeneratorConfig {
    /// Check that the settings describe a table that can be built
    pub fn validate(&self) -> Result<()> {
        if self.patients == 0 || self.facilities == 0 {
            return Err(Error::Config(
                "generator needs at least one patient and one facility".to_string(),
            ));
        }
        if self.patients > 999 || self.facilities > 999 {
            return Err(Error::Config(
                "generator supports at most 999 patients and 999 facilities".to_string(),
            ));
        }
        if self.end_date < self.start_date {
            return Err(Error::Config(format!(
                "generator end date {} is before start date {}",
                self.end_date, self.start_date
            )));
        }
        for (name, ratio) in [
            ("negative cost ratio", self.negative_cost_ratio),
            ("late update ratio", self.late_update_ratio),
        ] {
            if !(0.0..1.0).contains(&ratio) {
                return Err(Error::Config(format!(
                    "generator {name} must be within 0..1, got {ratio}"
                )));
            }
        }
        Ok(())
    }
}

fn random_cost(rng: &mut StdRng) -> Decimal {
    Decimal::new(rng.random_range(2_500..=250_000), 2)
}

fn first_version(
    rng: &mut StdRng,
    config: &GeneratorConfig,
    serial: usize,
    span_days: i64,
) -> EncounterRecord {
    let encounter_date = config.start_date + Duration::days(rng.random_range(0..=span_days));
    let updated_at = encounter_date.and_time(NaiveTime::MIN)
        + Duration::minutes(rng.random_range(8 * 60..=30 * 24 * 60));

    EncounterRecord::new(
        format!("E{serial:05}"),
        format!("P{:03}", rng.random_range(1..=config.patients)),
        format!("F{:03}", rng.random_range(1..=config.facilities)),
        encounter_date,
        DIAGNOSIS_CODES[rng.random_range(0..DIAGNOSIS_CODES.len())],
        random_cost(rng),
        updated_at,
    )
}

fn late_update(rng: &mut StdRng, original: &EncounterRecord) -> EncounterRecord {
    let mut update = original.clone();
    if rng.random_bool(0.5) {
        update.cost = random_cost(rng);
    } else {
        update.diagnosis_code = DIAGNOSIS_CODES[rng.random_range(0..DIAGNOSIS_CODES.len())].to_string();
    }
    update.updated_at = original.updated_at + Duration::hours(rng.random_range(1..=14 * 24));
    update
}

/// Generate a shuffled raw encounter table
///
/// The same config with a fixed seed always yields the same table.
pub fn generate_encounters(config: &GeneratorConfig) -> Result<Vec<EncounterRecord>> {
    config.validate()?;

    let mut rng = match config.random_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let updates = if config.rows > 1 {
        ((config.rows as f64 * config.late_update_ratio).round() as usize).min(config.rows - 1)
    } else {
        0
    };
    let originals = config.rows - updates;
    let negatives = (originals as f64 * config.negative_cost_ratio).round() as usize;
    let span_days = (config.end_date - config.start_date).num_days();

    let mut records: Vec<EncounterRecord> = (1..=originals)
        .map(|serial| first_version(&mut rng, config, serial, span_days))
        .collect();

    for i in index::sample(&mut rng, originals, negatives.min(originals)) {
        records[i].cost = -records[i].cost;
    }

    // Each update builds on the latest version of its encounter
    let mut latest: Vec<usize> = (0..originals).collect();
    for _ in 0..updates {
        let encounter = rng.random_range(0..originals);
        let update = late_update(&mut rng, &records[latest[encounter]]);
        latest[encounter] = records.len();
        records.push(update);
    }

    records.shuffle(&mut rng);

    info!(
        "Generated {} rows: {} encounters, {} late updates, {} negative costs",
        records.len(),
        originals,
        updates,
        negatives
    );
    Ok(records)
}

/// Write a generated table, choosing the format from the file extension
pub fn write_encounters(path: &Path, records: &[EncounterRecord]) -> Result<()> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => write_encounters_csv(path, records),
        Some(ext) if ext.eq_ignore_ascii_case("parquet") => write_encounters_parquet(path, records),
        _ => Err(Error::Config(format!(
            "unsupported output {}; expected a .parquet or .csv file",
            path.display()
        ))),
    }
}
