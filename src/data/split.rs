use std::fmt;

use super::model::{SplitExperiments, SweepTable};

/// A sweep value below this magnitude marks the start of a new experiment.
pub const RESET_TOLERANCE: f64 = 1e-10;

/// Number of experiments stacked in one voltage-sweep file.
pub const EXPERIMENTS: usize = 3;

// ---------------------------------------------------------------------------
// Split diagnostics
// ---------------------------------------------------------------------------

/// How the experiment boundaries were chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitStrategy {
    /// Boundaries taken from rows where the sweep returns to zero.
    Resets,
    /// Too few resets: the rows were divided into equal thirds.
    EvenFallback,
}

/// Something about the split that deserves a second look.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitAnomaly {
    /// More experiment starts than expected; only the first three were used.
    ExtraResets { starts: usize },
    /// Experiments differ in length and were truncated to the shortest.
    UnequalLengths { lengths: [usize; EXPERIMENTS] },
    /// At least one experiment has no samples.
    EmptyExperiment,
}

impl fmt::Display for SplitAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitAnomaly::ExtraResets { starts } => {
                write!(f, "found {starts} experiment starts, using the first {EXPERIMENTS}")
            }
            SplitAnomaly::UnequalLengths { lengths } => {
                write!(f, "experiment lengths {lengths:?} truncated to the shortest")
            }
            SplitAnomaly::EmptyExperiment => write!(f, "an experiment has no samples"),
        }
    }
}

/// Result of splitting a voltage-sweep table.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub experiments: SplitExperiments,
    pub strategy: SplitStrategy,
    pub anomalies: Vec<SplitAnomaly>,
}

// ---------------------------------------------------------------------------
// Splitter
// ---------------------------------------------------------------------------

/// Row indices at which an experiment starts.
///
/// Row 0 always starts the first experiment; every later row whose sweep value
/// is (numerically) zero starts another.
pub fn experiment_starts(sweep: &[f64]) -> Vec<usize> {
    let mut starts = vec![0];
    starts.extend(
        sweep
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, v)| v.abs() < RESET_TOLERANCE)
            .map(|(i, _)| i),
    );
    starts
}

/// Split a voltage-sweep table into three experiments of equal length.
///
/// The sweep axis is taken from the first experiment. When fewer than three
/// starts are found the rows are divided evenly; the third experiment always
/// runs to the end of the table.
pub fn split_experiments(table: &SweepTable) -> Split {
    let n = table.len();
    let detected = experiment_starts(&table.sweep);
    let mut anomalies = Vec::new();

    let (starts, strategy) = if detected.len() < EXPERIMENTS {
        let per = n / EXPERIMENTS;
        ([0, per, 2 * per], SplitStrategy::EvenFallback)
    } else {
        if detected.len() > EXPERIMENTS {
            anomalies.push(SplitAnomaly::ExtraResets {
                starts: detected.len(),
            });
        }
        ([detected[0], detected[1], detected[2]], SplitStrategy::Resets)
    };

    let ranges = [
        starts[0]..starts[1],
        starts[1]..starts[2],
        starts[2]..n,
    ];
    let lengths = ranges.clone().map(|r| r.len());
    let shortest = lengths.iter().copied().min().unwrap_or(0);

    if lengths.iter().any(|&l| l != shortest) {
        anomalies.push(SplitAnomaly::UnequalLengths { lengths });
    }
    if shortest == 0 {
        anomalies.push(SplitAnomaly::EmptyExperiment);
    }

    let take = |r: &std::ops::Range<usize>| table.current[r.start..r.start + shortest].to_vec();
    let experiments = SplitExperiments {
        sweep: table.sweep[ranges[0].start..ranges[0].start + shortest].to_vec(),
        currents: [take(&ranges[0]), take(&ranges[1]), take(&ranges[2])],
    };

    Split {
        experiments,
        strategy,
        anomalies,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with_resets(lengths: &[usize]) -> SweepTable {
        let mut table = SweepTable::default();
        for (exp, &len) in lengths.iter().enumerate() {
            for i in 0..len {
                table.sweep.push(i as f64 * 0.01);
                table.current.push((exp * 1000 + i) as f64);
            }
        }
        table
    }

    #[test]
    fn splits_on_resets() {
        let split = split_experiments(&table_with_resets(&[30, 30, 30]));
        assert_eq!(split.strategy, SplitStrategy::Resets);
        assert!(split.anomalies.is_empty());
        assert_eq!(split.experiments.len(), 30);
        assert_eq!(split.experiments.currents[1][0], 1000.0);
        assert_eq!(split.experiments.currents[2][29], 2029.0);
    }

    #[test]
    fn truncates_to_shortest_experiment() {
        let split = split_experiments(&table_with_resets(&[30, 20, 25]));
        assert_eq!(split.experiments.len(), 20);
        for currents in &split.experiments.currents {
            assert_eq!(currents.len(), 20);
        }
        assert_eq!(
            split.anomalies,
            vec![SplitAnomaly::UnequalLengths {
                lengths: [30, 20, 25]
            }]
        );
    }

    #[test]
    fn flags_extra_resets() {
        let split = split_experiments(&table_with_resets(&[10, 10, 10, 10]));
        assert_eq!(split.strategy, SplitStrategy::Resets);
        // Third experiment absorbs the fourth.
        assert!(split
            .anomalies
            .contains(&SplitAnomaly::ExtraResets { starts: 4 }));
        assert_eq!(split.experiments.len(), 10);
    }

    #[test]
    fn falls_back_to_even_thirds_without_resets() {
        let table = SweepTable {
            sweep: (1..=91).map(|i| i as f64).collect(),
            current: (1..=91).map(|i| i as f64).collect(),
        };
        let split = split_experiments(&table);
        assert_eq!(split.strategy, SplitStrategy::EvenFallback);
        assert_eq!(split.experiments.len(), 30);
        assert_eq!(split.experiments.currents[1][0], 31.0);
        assert_eq!(split.experiments.currents[2][0], 61.0);
    }

    #[test]
    fn exact_thirds_when_row_count_divides() {
        let table = SweepTable {
            sweep: vec![1.0; 90],
            current: (0..90).map(|i| i as f64).collect(),
        };
        let split = split_experiments(&table);
        assert_eq!(split.strategy, SplitStrategy::EvenFallback);
        assert!(split.anomalies.is_empty());
        assert_eq!(split.experiments.len(), 30);
    }

    #[test]
    fn tiny_tables_yield_empty_experiments() {
        let table = SweepTable {
            sweep: vec![1.0, 2.0],
            current: vec![1.0, 2.0],
        };
        let split = split_experiments(&table);
        assert!(split.experiments.is_empty());
        assert!(split.anomalies.contains(&SplitAnomaly::EmptyExperiment));
    }

    #[test]
    fn starts_ignore_row_zero_value() {
        assert_eq!(experiment_starts(&[0.0, 0.5, 0.0, 1e-12, 2.0]), vec![0, 2, 3]);
        assert_eq!(experiment_starts(&[]), vec![0]);
    }
}
