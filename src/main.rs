use std::path::PathBuf;
use std::time::Instant;

use encounter_analytics::utils::logging::{print_flagged_rows, print_summary_preview};
use encounter_analytics::{PipelineConfig, run_pipeline_async};
use log::info;

#[global_allocator]
static ALLOC: snmalloc_rs::SnMalloc = snmalloc_rs::SnMalloc;

const PREVIEW_ROWS: usize = 10;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = PipelineConfig::from_env()?;
    if let Some(input) = std::env::args_os().nth(1) {
        config.input = PathBuf::from(input);
    }

    info!("Summarizing encounters from {}", config.input.display());
    let start = Instant::now();
    let outcome = run_pipeline_async(&config).await?;

    println!("{}", outcome.report);
    println!("\nSample analytics output:");
    print_summary_preview(&outcome.summary.rows, PREVIEW_ROWS);
    println!("\nFlagged records:");
    print_flagged_rows(&outcome.quality.flagged);

    info!(
        "Wrote outputs to {} in {:?}",
        config.output_dir.display(),
        start.elapsed()
    );
    Ok(())
}
