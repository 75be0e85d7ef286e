//! Derived quantities: the reduced mirror-error curve with its trend, and the
//! per-corner performance metrics.

pub mod error_curve;
pub mod metrics;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("need at least {needed} samples, found {found}")]
    NotEnoughSamples { needed: usize, found: usize },
    #[error("series is empty")]
    EmptySeries,
    #[error("trend fit failed: {0}")]
    FitFailed(String),
}
