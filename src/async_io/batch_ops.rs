//! Streaming reads of single parquet files

use std::path::Path;
use std::time::Instant;

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use futures::TryStreamExt;
use parquet::arrow::async_reader::ParquetRecordBatchStreamBuilder;
use tokio::fs::File;

use crate::error::Result;
use crate::utils::io::create_projection;
use crate::utils::{log_operation_complete, log_operation_start};

/// Read a Parquet file asynchronously into Arrow record batches
///
/// Returns the file schema alongside the batches so callers can check it
/// even when the file holds no rows.
///
/// # Errors
/// Returns an error if the file cannot be opened or decoded
pub async fn read_parquet_async(
    path: &Path,
    columns: &[&str],
    batch_size: usize,
) -> Result<(SchemaRef, Vec<RecordBatch>)> {
    let start = Instant::now();
    log_operation_start("Reading parquet file asynchronously", path);

    let file = File::open(path).await?;
    let mut builder = ParquetRecordBatchStreamBuilder::new(file)
        .await?
        .with_batch_size(batch_size);
    let schema = builder.schema().clone();

    if let Some(mask) = create_projection(columns, builder.schema(), builder.parquet_schema()) {
        builder = builder.with_projection(mask);
    }

    let batches = builder.build()?.try_collect::<Vec<_>>().await?;

    let rows = batches.iter().map(RecordBatch::num_rows).sum();
    log_operation_complete("read", path, rows, Some(start.elapsed()));

    Ok((schema, batches))
}
