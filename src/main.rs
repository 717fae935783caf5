use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;

mod cli;

use cli::{Args, Command};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match args.command {
        Command::Inspect(inspect) => {
            let config = inspect.into_config().context("Invalid inspect configuration")?;
            info!("=== Raster inspection ===");
            let reports = rasterprep::run_inspection(&config)?;
            let inconsistent = reports.iter().filter(|r| !r.consistent).count();
            info!(
                "Report written to {} ({} folder(s), {} inconsistent)",
                config.report_path.display(),
                reports.len(),
                inconsistent
            );
        }
        Command::Clip(clip) => {
            let config = clip.into_config().context("Invalid clip configuration")?;
            info!("=== Raster clipping ===");
            let summary = rasterprep::run_clipping(&config)
                .with_context(|| format!("Clipping with {} failed", config.boundary_path.display()))?;
            info!("Processed {} raster(s)", summary.processed());
        }
        Command::Fetch(fetch) => {
            let config = fetch.into_config().context("Invalid fetch configuration")?;
            info!("=== Corpus download ===");
            let summary = rasterprep::run_fetch(&config)
                .with_context(|| format!("Download of {} failed", config.url_list.display()))?;
            if summary.failed > 0 {
                log::warn!("{} download(s) failed; rerun to resume", summary.failed);
            }
        }
    }

    info!("=== Done! ===");
    Ok(())
}
