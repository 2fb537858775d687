//! Async counterpart of the synchronous encounter loader

use std::path::Path;

use futures::stream::{self, StreamExt, TryStreamExt};

use super::batch_ops::read_parquet_async;
use super::file_ops::find_parquet_files_async;
use crate::config::{DateFormatConfig, PipelineConfig};
use crate::error::{Error, Result};
use crate::loader::{batch_to_raw_rows, read_encounters_csv};
use crate::models::RawEncounterRow;
use crate::schema::{RAW_COLUMNS, check_raw_schema};

/// Read a single parquet file of raw encounters asynchronously
pub async fn read_encounters_parquet_async(
    path: &Path,
    batch_size: usize,
    config: &DateFormatConfig,
) -> Result<Vec<RawEncounterRow>> {
    let (schema, batches) = read_parquet_async(path, &RAW_COLUMNS, batch_size).await?;
    check_raw_schema(&schema, &path.to_string_lossy()).into_result()?;

    let mut rows = Vec::new();
    for batch in &batches {
        let converted = batch_to_raw_rows(batch, rows.len(), config)?;
        rows.extend(converted);
    }
    Ok(rows)
}

async fn load_dir_async(
    dir: &Path,
    batch_size: usize,
    config: &DateFormatConfig,
) -> Result<Vec<RawEncounterRow>> {
    let files = find_parquet_files_async(dir).await?;

    // `buffered` keeps file order while reading up to num_cpus files at once
    let per_file: Vec<Vec<RawEncounterRow>> = stream::iter(files)
        .map(|path| async move { read_encounters_parquet_async(&path, batch_size, config).await })
        .buffered(num_cpus::get())
        .try_collect()
        .await?;

    let mut rows: Vec<RawEncounterRow> = per_file.into_iter().flatten().collect();
    for (row_index, row) in rows.iter_mut().enumerate() {
        row.row_index = row_index;
    }
    Ok(rows)
}

/// Load raw encounters from the configured input without blocking the runtime
///
/// CSV files are parsed on the blocking thread pool.
pub async fn load_encounters_async(config: &PipelineConfig) -> Result<Vec<RawEncounterRow>> {
    let path = config.input.clone();
    let dates = &config.date_format_config;

    if tokio::fs::metadata(&path).await.is_ok_and(|m| m.is_dir()) {
        return load_dir_async(&path, config.batch_size, dates).await;
    }

    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("parquet") => {
            read_encounters_parquet_async(&path, config.batch_size, dates).await
        }
        Some(ext) if ext.eq_ignore_ascii_case("csv") => {
            let dates = dates.clone();
            tokio::task::spawn_blocking(move || read_encounters_csv(&path, &dates))
                .await
                .map_err(|e| Error::Io(std::io::Error::other(e)))?
        }
        _ => Err(Error::Config(format!(
            "unsupported input {}; expected a .parquet or .csv file or a directory",
            path.display()
        ))),
    }
}
