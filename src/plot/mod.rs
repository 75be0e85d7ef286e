//! PNG renderers for the corner report.
//!
//! Every renderer is a pure function of its data plus an explicit
//! [`PlotStyle`]; nothing is configured globally.

pub mod combined;
pub mod error;
pub mod sweep;

use std::ops::Range;

use plotters::style::{FontDesc, FontFamily, FontStyle};
use thiserror::Error;

/// Errors that can occur during plot generation
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Failed to configure chart: {0}")]
    ChartConfig(String),

    #[error("Failed to draw chart elements: {0}")]
    Drawing(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

type Result<T> = core::result::Result<T, PlotError>;

fn drawing_error<E: std::fmt::Display>(e: E) -> PlotError {
    PlotError::Drawing(e.to_string())
}

fn config_error<E: std::fmt::Display>(e: E) -> PlotError {
    PlotError::ChartConfig(e.to_string())
}

// ---------------------------------------------------------------------------
// Style
// ---------------------------------------------------------------------------

/// Figure size, fonts and strokes shared by all renderers.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub font_family: String,
    pub title_size: u32,
    pub label_size: u32,
    pub tick_size: u32,
    pub legend_size: u32,
    pub line_width: u32,
    pub margin: u32,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
            font_family: "sans-serif".to_string(),
            title_size: 28,
            label_size: 22,
            tick_size: 18,
            legend_size: 18,
            line_width: 2,
            margin: 20,
        }
    }
}

impl PlotStyle {
    /// Same style on a canvas `factor` times larger in each dimension.
    pub fn enlarged(&self, factor: f64) -> Self {
        Self {
            width: (self.width as f64 * factor).round() as u32,
            height: (self.height as f64 * factor).round() as u32,
            ..self.clone()
        }
    }

    fn font(&self, size: u32) -> FontDesc<'_> {
        FontDesc::new(
            FontFamily::Name(&self.font_family),
            size as f64,
            FontStyle::Normal,
        )
    }

    fn title_font(&self) -> FontDesc<'_> {
        FontDesc::new(
            FontFamily::Name(&self.font_family),
            self.title_size as f64,
            FontStyle::Bold,
        )
    }
}

// ---------------------------------------------------------------------------
// Axis helpers
// ---------------------------------------------------------------------------

/// Tick label in scientific notation, e.g. `4.0e-5`.
fn sci_label(v: &f64) -> String {
    format!("{v:.1e}")
}

/// Range covering all values with 5% headroom on each side.
///
/// Degenerate or non-finite inputs still produce a drawable, non-empty range.
fn padded_range<'a>(values: impl IntoIterator<Item = &'a f64>) -> Range<f64> {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() {
        return 0.0..1.0;
    }
    let span = hi - lo;
    let pad = if span > 0.0 {
        span * 0.05
    } else if lo != 0.0 {
        lo.abs() * 0.05
    } else {
        1.0
    };
    (lo - pad)..(hi + pad)
}
