//! Builds the compiled control dataset: fetches (or reuses cached) source
//! documents, extracts, reconciles scoring and writes `build/output.json`.

use anyhow::Context;
use controls_core::pipeline::config::PipelineConfig;
use controls_core::pipeline::run::run_pipeline;
use controls_core::sources::fetcher::{CachedFetcher, HttpFetcher};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = PipelineConfig::from_env().context("building pipeline configuration")?;
    let http = HttpFetcher::new(config.allowlist.clone()).context("creating http fetcher")?;
    let fetcher = CachedFetcher::new(&config.build_dir, http);

    let report = run_pipeline(&config, &fetcher).context("compiling control dataset")?;
    println!(
        "compiled {} controls, {} objectives ({} flagged) into {}",
        report.control_count,
        report.objective_count,
        report.flagged_objective_count,
        report.output_path.display()
    );
    Ok(())
}
