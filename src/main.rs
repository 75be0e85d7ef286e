mod analysis;
mod color;
mod data;
mod pipeline;
mod plot;
mod report;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueHint};
use log::{info, warn};

use pipeline::RunConfig;
use plot::PlotStyle;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Plots and metrics for PVT corner sweep results",
    long_about = None
)]
struct Cli {
    /// Directory holding `process_offset_temperature[_Iin]` result tables
    #[arg(long, default_value = "results", value_hint = ValueHint::DirPath)]
    results_dir: PathBuf,

    /// Directory receiving plots, the merged PDF and the metrics tables
    #[arg(long, default_value = "plots", value_hint = ValueHint::DirPath)]
    plots_dir: PathBuf,

    /// Plot width in pixels
    #[arg(long, default_value_t = 1200)]
    width: u32,

    /// Plot height in pixels
    #[arg(long, default_value_t = 800)]
    height: u32,

    /// Skip merging the plots into a single PDF
    #[arg(long)]
    no_pdf: bool,
}

impl Cli {
    fn into_config(self) -> RunConfig {
        RunConfig {
            results_dir: self.results_dir,
            plots_dir: self.plots_dir,
            style: PlotStyle {
                width: self.width,
                height: self.height,
                ..PlotStyle::default()
            },
            merge_pdf: !self.no_pdf,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Cli::parse().into_config();
    let report = pipeline::run(&config)?;

    if report.is_empty() {
        warn!(
            "No result files matched the corner naming scheme in {}",
            config.results_dir.display()
        );
        return Ok(());
    }

    info!(
        "Done: {} items succeeded, {} failed; outputs in {}",
        report.succeeded(),
        report.failed(),
        config.plots_dir.display()
    );
    for item in report.failures() {
        warn!("  {} / {} did not complete", item.stage, item.item);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_plain_invocation() {
        let config = Cli::parse_from(["pvt-report"]).into_config();
        assert_eq!(config.results_dir, PathBuf::from("results"));
        assert_eq!(config.plots_dir, PathBuf::from("plots"));
        assert_eq!(config.style, PlotStyle::default());
        assert!(config.merge_pdf);
    }

    #[test]
    fn flags_override_defaults() {
        let config = Cli::parse_from([
            "pvt-report",
            "--results-dir",
            "sim/out",
            "--width",
            "800",
            "--no-pdf",
        ])
        .into_config();
        assert_eq!(config.results_dir, PathBuf::from("sim/out"));
        assert_eq!(config.style.width, 800);
        assert!(!config.merge_pdf);
    }
}
