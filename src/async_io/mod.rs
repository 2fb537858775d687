//! Async encounter loading on tokio
//!
//! Mirrors [`crate::loader`] with non-blocking file access. Directory inputs
//! are streamed with up to one file in flight per CPU.

pub mod batch_ops;
pub mod file_ops;
pub mod loader;

pub use batch_ops::read_parquet_async;
pub use file_ops::find_parquet_files_async;
pub use loader::{load_encounters_async, read_encounters_parquet_async};
