//! Shared utilities: Arrow column access, file IO and logging helpers.

pub mod arrow;
pub mod io;
pub mod logging;

pub use io::{find_parquet_files, read_parquet, validate_directory};
pub use logging::{log_operation_complete, log_operation_start, log_warning};

/// Default batch size for Parquet reading
pub const DEFAULT_BATCH_SIZE: usize = 16384;
