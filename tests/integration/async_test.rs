use encounter_analytics::async_io::{find_parquet_files_async, read_parquet_async};
use encounter_analytics::schema::RAW_COLUMNS;
use encounter_analytics::utils::io::write_encounters_parquet;
use encounter_analytics::{load_encounters, load_encounters_async, run_pipeline_async};
use tempfile::TempDir;

use crate::utils::{example_records, test_config};

/// Async reading of a single file returns its schema and rows
#[tokio::test]
async fn test_async_read() -> encounter_analytics::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("raw.parquet");
    write_encounters_parquet(&path, &example_records())?;

    let (schema, batches) = read_parquet_async(&path, &RAW_COLUMNS, 2).await?;
    assert_eq!(schema.fields().len(), RAW_COLUMNS.len());
    assert_eq!(batches.iter().map(|b| b.num_rows()).sum::<usize>(), 3);
    Ok(())
}

/// Async and blocking loaders agree on a directory input
#[tokio::test]
async fn test_async_directory_matches_sync() -> encounter_analytics::Result<()> {
    let dir = TempDir::new()?;
    let records = example_records();
    write_encounters_parquet(&dir.path().join("b.parquet"), &records[1..])?;
    write_encounters_parquet(&dir.path().join("a.parquet"), &records[..1])?;

    let files = find_parquet_files_async(dir.path()).await?;
    assert_eq!(files.len(), 2);
    assert!(files[0].ends_with("a.parquet"));

    let config = test_config(dir.path(), dir.path());
    let async_rows = load_encounters_async(&config).await?;
    let sync_rows = load_encounters(&config)?;
    assert_eq!(async_rows, sync_rows);
    Ok(())
}

/// The async pipeline produces the same summary as the example expects
#[tokio::test]
async fn test_async_pipeline() -> encounter_analytics::Result<()> {
    let dir = TempDir::new()?;
    let input = dir.path().join("raw.parquet");
    write_encounters_parquet(&input, &example_records())?;

    let outcome = run_pipeline_async(&test_config(&input, &dir.path().join("out"))).await?;
    assert_eq!(outcome.summary.rows.len(), 1);
    assert_eq!(outcome.summary.rows[0].total_encounters, 2);
    Ok(())
}
