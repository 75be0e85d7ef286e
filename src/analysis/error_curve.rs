use nalgebra::{DMatrix, DVector};

use super::AnalysisError;
use crate::data::model::SweepTable;

/// Consecutive drain-current samples averaged into one error point.
pub const CHUNK_SIZE: usize = 10;
/// Degree of the least-squares trend polynomial.
pub const TREND_DEGREE: usize = 2;
/// Points at which the trend is evaluated for drawing.
pub const TREND_POINTS: usize = 200;

/// Singular values below this are treated as zero in the fit.
const FIT_EPS: f64 = 1e-12;

// ---------------------------------------------------------------------------
// Reduced error curve
// ---------------------------------------------------------------------------

/// `|Iin - Iout|` against input current, one point per chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorCurve {
    pub sweep: Vec<f64>,
    pub error: Vec<f64>,
}

/// Average the drain current in chunks of [`CHUNK_SIZE`] and pair each average
/// with the input current at the chunk's first sample.
///
/// A trailing partial chunk is dropped.
pub fn reduce_error_curve(table: &SweepTable) -> Result<ErrorCurve, AnalysisError> {
    let n_chunks = table.current.len() / CHUNK_SIZE;
    if n_chunks == 0 {
        return Err(AnalysisError::NotEnoughSamples {
            needed: CHUNK_SIZE,
            found: table.current.len(),
        });
    }

    let (sweep, error) = table
        .current
        .chunks_exact(CHUNK_SIZE)
        .zip(table.sweep.iter().step_by(CHUNK_SIZE))
        .map(|(chunk, &iin)| {
            let mean = chunk.iter().sum::<f64>() / CHUNK_SIZE as f64;
            (iin, (iin - mean).abs())
        })
        .unzip();

    Ok(ErrorCurve { sweep, error })
}

// ---------------------------------------------------------------------------
// Polynomial trend
// ---------------------------------------------------------------------------

/// Least-squares polynomial in a normalised variable `t = (x - center) / scale`.
///
/// Sweep currents are in the micro-amp range, so fitting on raw `x` would
/// leave the high-order columns numerically invisible.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    /// Coefficients in ascending powers of `t`.
    pub coefficients: Vec<f64>,
    pub center: f64,
    pub scale: f64,
}

impl Polynomial {
    pub fn eval(&self, x: f64) -> f64 {
        let t = (x - self.center) / self.scale;
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, &c| acc * t + c)
    }
}

/// Fit a polynomial of the given degree through `(x, y)`.
pub fn fit_polynomial(x: &[f64], y: &[f64], degree: usize) -> Result<Polynomial, AnalysisError> {
    if x.is_empty() || x.len() != y.len() {
        return Err(AnalysisError::EmptySeries);
    }

    let (lo, hi) = min_max(x);
    let center = (lo + hi) / 2.0;
    let half_span = (hi - lo) / 2.0;
    let scale = if half_span > 0.0 { half_span } else { 1.0 };

    let a = DMatrix::from_fn(x.len(), degree + 1, |i, j| {
        ((x[i] - center) / scale).powi(j as i32)
    });
    let b = DVector::from_column_slice(y);
    let solution = a
        .svd(true, true)
        .solve(&b, FIT_EPS)
        .map_err(|e| AnalysisError::FitFailed(e.to_string()))?;

    Ok(Polynomial {
        coefficients: solution.iter().copied().collect(),
        center,
        scale,
    })
}

/// `n` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Smooth trend of an error curve, ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct Trend {
    pub polynomial: Polynomial,
    pub sweep: Vec<f64>,
    pub value: Vec<f64>,
}

/// Fit the degree-2 trend and evaluate it over the observed sweep range.
pub fn trend_line(curve: &ErrorCurve) -> Result<Trend, AnalysisError> {
    let polynomial = fit_polynomial(&curve.sweep, &curve.error, TREND_DEGREE)?;
    let (lo, hi) = min_max(&curve.sweep);
    let sweep = linspace(lo, hi, TREND_POINTS);
    let value = sweep.iter().map(|&x| polynomial.eval(x)).collect();
    Ok(Trend {
        polynomial,
        sweep,
        value,
    })
}

fn min_max(v: &[f64]) -> (f64, f64) {
    v.iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
            (lo.min(x), hi.max(x))
        })
}
