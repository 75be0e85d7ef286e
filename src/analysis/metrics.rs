use super::AnalysisError;
use crate::data::model::{Corner, SplitExperiments, SweepTable};
use crate::data::split::RESET_TOLERANCE;

/// Input currents of the three stacked experiments, in amperes.
pub const TARGET_CURRENTS: [f64; 3] = [40e-6, 45e-6, 50e-6];
/// Relative band within which the output is said to track the input.
pub const TRACKING_TOLERANCE: f64 = 0.01;
/// Output voltage at which the output current is reported.
pub const REFERENCE_VOLTAGE: f64 = 0.9;
/// Fixed bias branches of the circuit under test, in µA.
pub const BIAS_CURRENTS_UA: [f64; 2] = [50.0, 35.0];
/// Supply assumed by the power estimate, in volts.
pub const POWER_SUPPLY_V: f64 = 0.9;

// ---------------------------------------------------------------------------
// Scalar metrics
// ---------------------------------------------------------------------------

/// Lowest sweep voltage at which `current` first falls within 1% of `target`.
///
/// Falls back to the sample closest to `target` when no sample is in band.
pub fn v_out_min(voltage: &[f64], current: &[f64], target: f64) -> Option<f64> {
    let lo = (1.0 - TRACKING_TOLERANCE) * target;
    let hi = (1.0 + TRACKING_TOLERANCE) * target;

    let idx = current
        .iter()
        .position(|&c| c >= lo && c <= hi)
        .or_else(|| closest_index(current, target))?;
    voltage.get(idx).copied()
}

/// Linear interpolation of `y` at `target` over an ascending `x`.
///
/// Targets before the first sample return the first `y`, targets past the
/// last sample return the last `y`, and a target equal to a sample returns
/// that sample exactly.
pub fn interpolate(x: &[f64], y: &[f64], target: f64) -> Option<f64> {
    let n = x.len().min(y.len());
    if n == 0 {
        return None;
    }
    let x = &x[..n];

    let idx = x.partition_point(|&v| v < target);
    if idx == 0 {
        return Some(y[0]);
    }
    if idx >= n {
        return Some(y[n - 1]);
    }
    if x[idx] == target {
        return Some(y[idx]);
    }

    let (x1, x2) = (x[idx - 1], x[idx]);
    let (y1, y2) = (y[idx - 1], y[idx]);
    Some(y1 + (y2 - y1) * (target - x1) / (x2 - x1))
}

/// Estimated power in µW given the output current at the reference voltage.
pub fn estimated_power_uw(i_out_ua: f64) -> f64 {
    (BIAS_CURRENTS_UA.iter().sum::<f64>() + i_out_ua) * POWER_SUPPLY_V
}

/// Relative mirror error `|Iin - Iout| / Iin` in percent, taken at the
/// input-current sample closest to `target`.
///
/// Returns 0 when that sample's input current is (numerically) zero.
pub fn mirror_error_percent(table: &SweepTable, target: f64) -> Option<f64> {
    let idx = closest_index(&table.sweep, target)?;
    let iin = table.sweep[idx];
    let iout = *table.current.get(idx)?;
    if iin.abs() > RESET_TOLERANCE {
        Some(((iin - iout) / iin).abs() * 100.0)
    } else {
        Some(0.0)
    }
}

fn closest_index(values: &[f64], target: f64) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (*a - target).abs().total_cmp(&(*b - target).abs()))
        .map(|(i, _)| i)
}

// ---------------------------------------------------------------------------
// Per-corner rows
// ---------------------------------------------------------------------------

/// Derived metrics for one corner at one target input current.
#[derive(Debug, Clone, PartialEq)]
pub struct CornerMetrics {
    pub corner: Corner,
    /// Target input current in amperes.
    pub target: f64,
    pub v_out_min: f64,
    /// Output current at [`REFERENCE_VOLTAGE`], in amperes.
    pub i_out_at_ref: f64,
    pub power_uw: f64,
    /// Mirror error from the matching `_Iin` sweep, when one exists.
    pub mirror_error_pct: Option<f64>,
}

/// Compute one row per target current for a split voltage-sweep file.
pub fn corner_metrics(
    corner: Corner,
    split: &SplitExperiments,
    input_sweep: Option<&SweepTable>,
) -> Result<Vec<CornerMetrics>, AnalysisError> {
    if split.is_empty() {
        return Err(AnalysisError::EmptySeries);
    }

    TARGET_CURRENTS
        .iter()
        .zip(split.currents.iter())
        .map(|(&target, current)| {
            let v_out_min =
                v_out_min(&split.sweep, current, target).ok_or(AnalysisError::EmptySeries)?;
            let i_out_at_ref = interpolate(&split.sweep, current, REFERENCE_VOLTAGE)
                .ok_or(AnalysisError::EmptySeries)?;
            Ok(CornerMetrics {
                corner,
                target,
                v_out_min,
                i_out_at_ref,
                power_uw: estimated_power_uw(i_out_at_ref * 1e6),
                mirror_error_pct: input_sweep.and_then(|t| mirror_error_percent(t, target)),
            })
        })
        .collect()
}

/// Order rows by process, supply, temperature, then target current.
pub fn sort_rows(rows: &mut [CornerMetrics]) {
    rows.sort_by(|a, b| {
        a.corner
            .cmp(&b.corner)
            .then(a.target.total_cmp(&b.target))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::split::split_experiments;
    use approx::assert_relative_eq;

    fn corner(name: &str) -> Corner {
        Corner::parse_file_name(name).unwrap().0
    }

    const STEP: f64 = 100e-6 / 30.0;

    /// 90 rows, sweep resets at 0/30/60, current ramps up by 100/30 µA per row
    /// within each experiment.
    fn synthetic_table() -> SweepTable {
        let mut table = SweepTable::default();
        for _ in 0..3 {
            for i in 0..30 {
                table.sweep.push(i as f64 * 0.05);
                table.current.push(i as f64 * STEP);
            }
        }
        table
    }

    #[test]
    fn v_out_min_is_first_sample_in_band() {
        let table = synthetic_table();
        let split = split_experiments(&table).experiments;

        let first_in_band = split.currents[0]
            .iter()
            .position(|&c| (39.6e-6..=40.4e-6).contains(&c))
            .unwrap();
        assert_eq!(first_in_band, 12);

        let rows = corner_metrics(corner("tt_0_27"), &split, None).unwrap();
        assert_eq!(rows[0].v_out_min, split.sweep[first_in_band]);
        assert_eq!(rows[2].v_out_min, split.sweep[15]);
    }

    #[test]
    fn v_out_min_prefers_band_over_closest() {
        let v = [0.1, 0.2, 0.3, 0.4];
        let i = [10e-6, 39.7e-6, 40.0e-6, 40.1e-6];
        assert_eq!(v_out_min(&v, &i, 40e-6), Some(0.2));
    }

    #[test]
    fn v_out_min_falls_back_to_closest() {
        let v = [0.1, 0.2, 0.3];
        let i = [10e-6, 30e-6, 60e-6];
        assert_eq!(v_out_min(&v, &i, 40e-6), Some(0.2));
        assert_eq!(v_out_min(&[], &[], 40e-6), None);
    }

    #[test]
    fn interpolation_hits_samples_and_clamps() {
        let x = [0.0, 0.5, 1.0, 1.5];
        let y = [1.0, 3.3, 7.7, 9.1];
        assert_eq!(interpolate(&x, &y, 1.0), Some(7.7));
        assert_eq!(interpolate(&x, &y, 0.0), Some(1.0));
        assert_eq!(interpolate(&x, &y, 1.5), Some(9.1));
        assert_eq!(interpolate(&x, &y, -2.0), Some(1.0));
        assert_eq!(interpolate(&x, &y, 4.0), Some(9.1));
        assert_relative_eq!(interpolate(&x, &y, 0.75).unwrap(), 5.5, max_relative = 1e-12);
        assert_eq!(interpolate(&[], &[], 0.9), None);
    }

    #[test]
    fn power_formula() {
        assert_eq!(estimated_power_uw(10.0), 85.5);
        assert_eq!(estimated_power_uw(0.0), 76.5);
    }

    #[test]
    fn mirror_error_at_closest_sample() {
        let table = SweepTable {
            sweep: vec![0.0, 40e-6, 45e-6, 50e-6],
            current: vec![1e-9, 39e-6, 45e-6, 51e-6],
        };
        assert_relative_eq!(mirror_error_percent(&table, 40e-6).unwrap(), 2.5, epsilon = 1e-9);
        assert_relative_eq!(mirror_error_percent(&table, 50e-6).unwrap(), 2.0, epsilon = 1e-9);
        assert_eq!(mirror_error_percent(&table, 1e-12), Some(0.0));
    }

    #[test]
    fn three_rows_per_corner_with_reference_current() {
        let table = synthetic_table();
        let split = split_experiments(&table).experiments;
        let rows = corner_metrics(corner("ss_01_0"), &split, None).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows.iter().map(|r| r.target).collect::<Vec<_>>(), TARGET_CURRENTS);
        // 0.9 V is sample 18 exactly.
        assert_relative_eq!(rows[0].i_out_at_ref, 18.0 * STEP, max_relative = 1e-12);
        assert_relative_eq!(rows[0].power_uw, (85.0 + 60.0) * 0.9, max_relative = 1e-12);
        assert!(rows[0].mirror_error_pct.is_none());
    }

    #[test]
    fn empty_split_is_an_error() {
        let split = SplitExperiments {
            sweep: Vec::new(),
            currents: [Vec::new(), Vec::new(), Vec::new()],
        };
        assert_eq!(
            corner_metrics(corner("tt_0_27"), &split, None),
            Err(AnalysisError::EmptySeries)
        );
    }

    #[test]
    fn rows_sort_by_corner_then_target() {
        let split = split_experiments(&synthetic_table()).experiments;
        let mut rows = Vec::new();
        for name in ["ff_0_27", "ss_10_0", "ss_01_50", "tt_0_0"] {
            rows.extend(corner_metrics(corner(name), &split, None).unwrap());
        }
        rows.reverse();
        sort_rows(&mut rows);

        let order: Vec<String> = rows
            .iter()
            .step_by(3)
            .map(|r| r.corner.file_stem())
            .collect();
        assert_eq!(order, ["ss_01_50", "ss_10_0", "tt_0_0", "ff_0_27"]);
        assert!(rows[..3].windows(2).all(|w| w[0].target < w[1].target));
    }
}
