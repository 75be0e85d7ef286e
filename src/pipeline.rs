use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info, warn};

use crate::analysis::error_curve::{reduce_error_curve, trend_line, ErrorCurve, Trend};
use crate::analysis::metrics::{corner_metrics, sort_rows, CornerMetrics};
use crate::data::discover::{find_result_files, SourceFile};
use crate::data::loader::load_sweep_table;
use crate::data::model::{Corner, SplitExperiments, SweepTable};
use crate::data::split::{split_experiments, Split, SplitStrategy};
use crate::plot::combined::{plot_combined_trends, COMBINED_PLOT_NAME};
use crate::plot::error::plot_current_error;
use crate::plot::sweep::plot_voltage_sweep;
use crate::plot::PlotStyle;
use crate::report::outcome::{RunReport, Stage, RUN_REPORT_NAME};
use crate::report::pdf::{merge_plots_to_pdf, MERGED_PDF_NAME};
use crate::report::table::{
    format_metrics_table, write_metrics_csv, write_metrics_text, METRICS_CSV_NAME,
    METRICS_TXT_NAME,
};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Everything a run needs; built once in `main` and passed down.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Directory scanned for `process_offset_temperature[_Iin]` files.
    pub results_dir: PathBuf,
    /// Directory receiving every artifact; created if absent.
    pub plots_dir: PathBuf,
    pub style: PlotStyle,
    /// Merge the produced plots into `all_plots.pdf`.
    pub merge_pdf: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("results"),
            plots_dir: PathBuf::from("plots"),
            style: PlotStyle::default(),
            merge_pdf: true,
        }
    }
}

/// Name of the PNG rendered for a result file.
pub fn plot_file_name(source_name: &str) -> String {
    format!("{source_name}_plot.png")
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run the whole report: plots, merged PDF, metrics tables, run report.
///
/// Only failures that prevent any output (unreadable results directory,
/// uncreatable output directory) are returned as errors. Everything else is
/// recorded per item in the returned [`RunReport`].
pub fn run(config: &RunConfig) -> Result<RunReport> {
    std::fs::create_dir_all(&config.plots_dir)
        .with_context(|| format!("creating {}", config.plots_dir.display()))?;
    let found = find_result_files(&config.results_dir)?;
    info!(
        "Found {} regular files and {} _Iin files",
        found.voltage.len(),
        found.input_current.len()
    );

    let mut report = RunReport::default();
    let mut images: Vec<PathBuf> = Vec::new();

    // ---- Voltage sweeps: split + plot ----
    let mut splits: Vec<(&SourceFile, SplitExperiments)> = Vec::new();
    for file in &found.voltage {
        let split = match load_split(file) {
            Ok(split) => split,
            Err(e) => {
                report.fail(Stage::Load, &file.name, e);
                continue;
            }
        };

        let path = config.plots_dir.join(plot_file_name(&file.name));
        match plot_voltage_sweep(&split.experiments, &file.corner, &config.style, &path) {
            Ok(()) => {
                info!("Saved plot: {}", path.display());
                report.succeed(Stage::VoltagePlot, &file.name, vec![path.clone()]);
                images.push(path);
            }
            Err(e) => report.fail(Stage::VoltagePlot, &file.name, e),
        }
        for warning in split_warnings(&split) {
            warn!("{}: {warning}", file.name);
            report.warn_last(warning);
        }

        splits.push((file, split.experiments));
    }

    // ---- Input-current sweeps: error curve + trend + plot ----
    let mut trends: Vec<(Corner, Trend)> = Vec::new();
    let mut input_sweeps: BTreeMap<Corner, SweepTable> = BTreeMap::new();
    for file in &found.input_current {
        let table = match load_sweep_table(&file.path) {
            Ok(table) => table,
            Err(e) => {
                report.fail(Stage::Load, &file.name, e);
                continue;
            }
        };

        match error_trend(&table) {
            Ok((curve, trend)) => {
                let path = config.plots_dir.join(plot_file_name(&file.name));
                match plot_current_error(&curve, &trend, &file.corner, &config.style, &path) {
                    Ok(()) => {
                        info!("Saved plot: {}", path.display());
                        report.succeed(Stage::ErrorPlot, &file.name, vec![path.clone()]);
                        images.push(path);
                    }
                    Err(e) => report.fail(Stage::ErrorPlot, &file.name, e),
                }
                trends.push((file.corner, trend));
            }
            Err(e) => report.fail(Stage::ErrorPlot, &file.name, e),
        }

        input_sweeps.insert(file.corner, table);
    }

    if !trends.is_empty() {
        let path = config.plots_dir.join(COMBINED_PLOT_NAME);
        match plot_combined_trends(&trends, &config.style, &path) {
            Ok(()) => {
                info!("Saved combined error plot: {}", path.display());
                report.succeed(Stage::CombinedPlot, COMBINED_PLOT_NAME, vec![path.clone()]);
                images.push(path);
            }
            Err(e) => report.fail(Stage::CombinedPlot, COMBINED_PLOT_NAME, e),
        }
    }

    // ---- Merged PDF ----
    if config.merge_pdf && !images.is_empty() {
        let path = config.plots_dir.join(MERGED_PDF_NAME);
        match merge_plots_to_pdf(&images, &path) {
            Ok(summary) => {
                report.succeed(Stage::MergePdf, MERGED_PDF_NAME, vec![path]);
                if summary.used_fallback {
                    report.warn_last("primary merge failed, pages were resampled");
                }
                for skipped in &summary.skipped {
                    report.warn_last(format!("skipped unreadable {}", skipped.display()));
                }
            }
            Err(e) => report.fail(Stage::MergePdf, MERGED_PDF_NAME, e),
        }
    } else if config.merge_pdf {
        info!("No plot files to merge");
    }

    // ---- Metrics ----
    let mut rows: Vec<CornerMetrics> = Vec::new();
    for (file, split) in &splits {
        match corner_metrics(file.corner, split, input_sweeps.get(&file.corner)) {
            Ok(corner_rows) => {
                report.succeed(Stage::Metrics, &file.name, Vec::new());
                rows.extend(corner_rows);
            }
            Err(e) => report.fail(Stage::Metrics, &file.name, e),
        }
    }
    sort_rows(&mut rows);

    if !rows.is_empty() {
        write_tables(&rows, &config.plots_dir, &mut report);
    }

    let report_path = config.plots_dir.join(RUN_REPORT_NAME);
    if let Err(e) = report.write_json(&report_path) {
        warn!("{e:#}");
    }

    Ok(report)
}

fn load_split(file: &SourceFile) -> Result<Split> {
    let table = load_sweep_table(&file.path)?;
    Ok(split_experiments(&table))
}

fn error_trend(table: &SweepTable) -> Result<(ErrorCurve, Trend)> {
    let curve = reduce_error_curve(table)?;
    let trend = trend_line(&curve)?;
    Ok((curve, trend))
}

fn split_warnings(split: &Split) -> Vec<String> {
    let mut warnings = Vec::new();
    if split.strategy == SplitStrategy::EvenFallback {
        warnings.push("fewer than 3 sweep resets, rows split into equal thirds".to_string());
    }
    warnings.extend(split.anomalies.iter().map(ToString::to_string));
    warnings
}

fn write_tables(rows: &[CornerMetrics], dir: &Path, report: &mut RunReport) {
    let csv_path = dir.join(METRICS_CSV_NAME);
    match write_metrics_csv(rows, &csv_path) {
        Ok(()) => {
            info!("Metrics table saved to: {}", csv_path.display());
            report.succeed(Stage::MetricsTable, METRICS_CSV_NAME, vec![csv_path]);
        }
        Err(e) => report.fail(Stage::MetricsTable, METRICS_CSV_NAME, e),
    }

    let txt_path = dir.join(METRICS_TXT_NAME);
    match write_metrics_text(rows, &txt_path) {
        Ok(()) => {
            info!("Formatted table saved to: {}", txt_path.display());
            report.succeed(Stage::MetricsTable, METRICS_TXT_NAME, vec![txt_path]);
        }
        Err(e) => report.fail(Stage::MetricsTable, METRICS_TXT_NAME, e),
    }

    info!("Total rows in table: {}", rows.len());
    debug!("\n{}", format_metrics_table(rows));
}
