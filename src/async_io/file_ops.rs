//! Async operations for locating parquet inputs

use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::Result;
use crate::utils::{log_operation_start, log_warning, validate_directory};

/// Find all Parquet files in a directory asynchronously, sorted by file name
///
/// # Errors
/// Returns an error if directory reading fails
pub async fn find_parquet_files_async(dir: &Path) -> Result<Vec<PathBuf>> {
    log_operation_start("Searching for parquet files asynchronously in", dir);
    validate_directory(dir)?;

    let mut parquet_files = Vec::<PathBuf>::new();
    let mut entries = fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let metadata = fs::metadata(&path).await?;
        if metadata.is_file() && path.extension().is_some_and(|ext| ext == "parquet") {
            parquet_files.push(path);
        }
    }
    parquet_files.sort();

    if parquet_files.is_empty() {
        log_warning("No Parquet files found in directory", Some(dir));
    } else {
        log::info!("Found {} parquet files in {}", parquet_files.len(), dir.display());
    }

    Ok(parquet_files)
}
