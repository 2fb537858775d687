//! Writes a synthetic `raw_encounters` table with late updates and negative costs.
//!
//! Usage: `generate-encounters [OUTPUT]` where OUTPUT ends in `.parquet` or `.csv`
//! (default `data/raw_encounters.parquet`). `GENERATOR_ROWS` and
//! `GENERATOR_SEED` override the row count and seed.

use std::path::PathBuf;

use anyhow::Context;
use encounter_analytics::GeneratorConfig;
use encounter_analytics::generator::{generate_encounters, write_encounters};
use log::info;

#[global_allocator]
static ALLOC: snmalloc_rs::SnMalloc = snmalloc_rs::SnMalloc;

fn env_number<T: std::str::FromStr>(name: &str) -> anyhow::Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| anyhow::anyhow!("{name} has an invalid value: {raw}")),
        Err(_) => Ok(None),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let output = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from("data/raw_encounters.parquet"), PathBuf::from);

    let mut config = GeneratorConfig::default();
    if let Some(rows) = env_number("GENERATOR_ROWS")? {
        config.rows = rows;
    }
    if let Some(seed) = env_number("GENERATOR_SEED")? {
        config.random_seed = Some(seed);
    }

    let records = generate_encounters(&config)?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    write_encounters(&output, &records)?;

    info!("Wrote {} rows to {}", records.len(), output.display());
    Ok(())
}
