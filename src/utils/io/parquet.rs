//! Utility functions for reading and writing Parquet files

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

use arrow::datatypes::{Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use itertools::Itertools;
use parquet::arrow::ArrowWriter;
use parquet::arrow::{ProjectionMask, arrow_reader::ParquetRecordBatchReaderBuilder};
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::error::{Error, Result};
use crate::utils::logging::{log_operation_complete, log_operation_start, log_warning};

/// Validates that a directory exists and is a directory
///
/// # Errors
/// Returns an error if the directory does not exist or is not a directory
pub fn validate_directory(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Directory does not exist: {}", dir.display()),
        )));
    }
    Ok(())
}

/// Build a projection mask selecting the named columns that exist in the file
///
/// Returns `None` when none of the columns exist, in which case every column is read.
#[must_use]
pub fn create_projection(
    columns: &[&str],
    file_schema: &Schema,
    parquet_schema: &parquet::schema::types::SchemaDescriptor,
) -> Option<ProjectionMask> {
    let projection = columns
        .iter()
        .filter_map(|name| file_schema.index_of(name).ok())
        .collect_vec();

    if projection.is_empty() {
        log_warning("No matching fields found in schema projection, reading all columns", None);
        None
    } else {
        Some(ProjectionMask::roots(parquet_schema, projection))
    }
}

/// Read a parquet file into Arrow record batches
///
/// # Arguments
/// * `path` - Path to the Parquet file
/// * `columns` - Columns to project; missing ones are skipped
/// * `batch_size` - Rows per record batch
pub fn read_parquet(path: &Path, columns: &[&str], batch_size: usize) -> Result<Vec<RecordBatch>> {
    let start = Instant::now();
    log_operation_start("Reading parquet file", path);

    let file = File::open(path).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to open file {}: {e}", path.display()),
        ))
    })?;

    let mut builder = ParquetRecordBatchReaderBuilder::try_new(file)?.with_batch_size(batch_size);
    if let Some(mask) = create_projection(columns, builder.schema(), builder.parquet_schema()) {
        builder = builder.with_projection(mask);
    }

    let batches = builder.build()?.collect::<std::result::Result<Vec<_>, _>>()?;

    let rows = batches.iter().map(RecordBatch::num_rows).sum();
    log_operation_complete("read", path, rows, Some(start.elapsed()));
    Ok(batches)
}

/// Read only the Arrow schema of a parquet file
pub fn read_parquet_schema(path: &Path) -> Result<SchemaRef> {
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    Ok(builder.schema().clone())
}

/// Find all Parquet files in a directory, sorted by file name
pub fn find_parquet_files(dir: &Path) -> Result<Vec<PathBuf>> {
    log_operation_start("Searching for parquet files in", dir);
    validate_directory(dir)?;

    let mut parquet_files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "parquet") {
            parquet_files.push(path);
        }
    }
    parquet_files.sort();

    if parquet_files.is_empty() {
        log_warning("No Parquet files found in directory", Some(dir));
    }

    Ok(parquet_files)
}

/// Write record batches to a Snappy-compressed parquet file
///
/// An empty slice writes a file holding only the schema.
pub fn write_parquet(path: &Path, schema: SchemaRef, batches: &[RecordBatch]) -> Result<()> {
    let file = File::create(path)?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, schema, Some(props))?;
    for batch in batches {
        writer.write(batch)?;
    }
    writer.close()?;

    let rows = batches.iter().map(RecordBatch::num_rows).sum();
    log_operation_complete("wrote", path, rows, None);
    Ok(())
}
