use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::error;
use serde::Serialize;

pub const RUN_REPORT_NAME: &str = "run_report.json";

/// Pipeline step an item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Load,
    VoltagePlot,
    ErrorPlot,
    CombinedPlot,
    Metrics,
    MetricsTable,
    MergePdf,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Load => "load",
            Stage::VoltagePlot => "voltage plot",
            Stage::ErrorPlot => "error plot",
            Stage::CombinedPlot => "combined plot",
            Stage::Metrics => "metrics",
            Stage::MetricsTable => "metrics table",
            Stage::MergePdf => "PDF merge",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Ok { artifacts: Vec<PathBuf> },
    Failed { reason: String },
}

/// Result of one per-file or per-corner operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemOutcome {
    pub stage: Stage,
    /// Input file name or artifact name the operation was about.
    pub item: String,
    #[serde(flatten)]
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ItemOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, Outcome::Ok { .. })
    }
}

/// Every item the run attempted, in order.
///
/// An empty report means no input matched; a report with only failures means
/// inputs were found but none could be processed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub items: Vec<ItemOutcome>,
}

impl RunReport {
    pub fn succeed(&mut self, stage: Stage, item: impl Into<String>, artifacts: Vec<PathBuf>) {
        self.items.push(ItemOutcome {
            stage,
            item: item.into(),
            outcome: Outcome::Ok { artifacts },
            warnings: Vec::new(),
        });
    }

    /// Record a failure and log it; the run carries on.
    pub fn fail(&mut self, stage: Stage, item: impl Into<String>, reason: impl fmt::Display) {
        let item = item.into();
        // `{:#}` keeps the whole anyhow context chain on one line.
        let reason = format!("{reason:#}");
        error!("{stage} failed for {item}: {reason}");
        self.items.push(ItemOutcome {
            stage,
            item,
            outcome: Outcome::Failed { reason },
            warnings: Vec::new(),
        });
    }

    /// Attach a warning to the most recently recorded item.
    pub fn warn_last(&mut self, warning: impl Into<String>) {
        if let Some(last) = self.items.last_mut() {
            last.warnings.push(warning.into());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|i| i.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.items.len() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.items.iter().filter(|i| !i.is_ok())
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self).context("serializing run report")?;
        std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value as JsonValue;

    #[test]
    fn counts_successes_and_failures() {
        let mut report = RunReport::default();
        assert!(report.is_empty());

        report.succeed(Stage::VoltagePlot, "tt_0_27", vec!["tt_0_27_plot.png".into()]);
        report.warn_last("experiment lengths truncated");
        report.fail(Stage::Load, "ss_0_0", anyhow::anyhow!("bad row").context("parsing"));

        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
        let failure = report.failures().next().unwrap();
        assert_eq!(failure.item, "ss_0_0");
        assert_eq!(
            failure.outcome,
            Outcome::Failed {
                reason: "parsing: bad row".to_string()
            }
        );
        assert_eq!(report.items[0].warnings.len(), 1);
    }

    #[test]
    fn json_is_flat_per_item() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(RUN_REPORT_NAME);
        let mut report = RunReport::default();
        report.succeed(Stage::MergePdf, "all_plots.pdf", vec!["plots/all_plots.pdf".into()]);
        report.fail(Stage::ErrorPlot, "ff_10_50_Iin", "too short");
        report.write_json(&path).unwrap();

        let json: JsonValue =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let items = json["items"].as_array().unwrap();
        assert_eq!(items[0]["stage"], "merge_pdf");
        assert_eq!(items[0]["status"], "ok");
        assert_eq!(items[0]["artifacts"][0], "plots/all_plots.pdf");
        assert!(items[0].get("warnings").is_none());
        assert_eq!(items[1]["status"], "failed");
        assert_eq!(items[1]["reason"], "too short");
    }
}
