use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::analysis::metrics::CornerMetrics;

pub const METRICS_CSV_NAME: &str = "simulation_metrics.csv";
pub const METRICS_TXT_NAME: &str = "simulation_metrics.txt";

/// One formatted row of the metrics report, shared by the CSV and text
/// outputs so both carry identical cells.
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct MetricsRecord {
    #[serde(rename = "Process")]
    #[tabled(rename = "Process")]
    pub process: String,
    #[serde(rename = "V_DD")]
    #[tabled(rename = "V_DD")]
    pub vdd: String,
    #[serde(rename = "Temp")]
    #[tabled(rename = "Temp")]
    pub temp: String,
    #[serde(rename = "I_in")]
    #[tabled(rename = "I_in")]
    pub i_in: String,
    #[serde(rename = "V_out,min")]
    #[tabled(rename = "V_out,min")]
    pub v_out_min: String,
    #[serde(rename = "I_out @ V_out=0.9V")]
    #[tabled(rename = "I_out @ V_out=0.9V")]
    pub i_out_at_ref: String,
    #[serde(rename = "Power")]
    #[tabled(rename = "Power")]
    pub power: String,
    #[serde(rename = "Mirror error")]
    #[tabled(rename = "Mirror error")]
    pub mirror_error: String,
}

impl From<&CornerMetrics> for MetricsRecord {
    fn from(m: &CornerMetrics) -> Self {
        Self {
            process: m.corner.process.to_string(),
            vdd: m.corner.voltage.vdd_label(),
            temp: m.corner.temperature.to_string(),
            i_in: format!("{:.0}µA", m.target * 1e6),
            v_out_min: format!("{:.3}V", m.v_out_min),
            i_out_at_ref: format!("{:.2}µA", m.i_out_at_ref * 1e6),
            power: format!("{:.2}µW", m.power_uw),
            mirror_error: m
                .mirror_error_pct
                .map(|p| format!("{p:.2}%"))
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

fn records(rows: &[CornerMetrics]) -> Vec<MetricsRecord> {
    rows.iter().map(MetricsRecord::from).collect()
}

/// Write the metrics as comma-separated values with a header row.
pub fn write_metrics_csv(rows: &[CornerMetrics], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for record in records(rows) {
        writer.serialize(record).context("writing metrics row")?;
    }
    writer.flush().context("flushing metrics CSV")?;
    Ok(())
}

/// Render the metrics as a titled fixed-width table.
pub fn format_metrics_table(rows: &[CornerMetrics]) -> String {
    let simulations = rows.iter().map(|r| r.corner).collect::<BTreeSet<_>>().len();

    let mut table = Table::new(records(rows));
    table.with(Style::blank());

    format!(
        "Comprehensive Table: Key Metrics from All {simulations} Simulations\n{}\n\n{table}\n",
        "=".repeat(120)
    )
}

pub fn write_metrics_text(rows: &[CornerMetrics], path: &Path) -> Result<()> {
    std::fs::write(path, format_metrics_table(rows))
        .with_context(|| format!("writing {}", path.display()))
}
