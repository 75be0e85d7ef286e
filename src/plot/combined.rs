use std::collections::BTreeSet;
use std::path::Path;

use plotters::prelude::*;

use super::{config_error, drawing_error, padded_range, sci_label, PlotError, PlotStyle, Result};
use crate::analysis::error_curve::Trend;
use crate::color::CornerColors;
use crate::data::model::Corner;

/// File name of the cross-corner trend overlay.
pub const COMBINED_PLOT_NAME: &str = "combined_error_trendlines.png";

/// Canvas growth relative to the per-corner plots; the overlay carries a long
/// legend.
const ENLARGE: f64 = 7.0 / 6.0;

/// Overlay the fitted error trends of every corner, one colour each.
///
/// Raw error data is not drawn.
pub fn plot_combined_trends(
    trends: &[(Corner, Trend)],
    style: &PlotStyle,
    output_path: &Path,
) -> Result<()> {
    if trends.is_empty() {
        return Err(PlotError::InvalidData("no trends to combine".to_string()));
    }

    let style = style.enlarged(ENLARGE);
    let corners: BTreeSet<Corner> = trends.iter().map(|(c, _)| *c).collect();
    let colors = CornerColors::new(&corners);

    let x_range = padded_range(trends.iter().flat_map(|(_, t)| t.sweep.iter()));
    let y_range = padded_range(trends.iter().flat_map(|(_, t)| t.value.iter()));

    let root = BitMapBackend::new(output_path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE).map_err(drawing_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Current Error = |Iin - Iout| - Combined Trendlines",
            style.title_font(),
        )
        .margin(style.margin)
        .x_label_area_size(70)
        .y_label_area_size(110)
        .build_cartesian_2d(x_range, y_range)
        .map_err(config_error)?;

    chart
        .configure_mesh()
        .x_desc("Input Current [A]")
        .y_desc("Absolute Error [A]")
        .axis_desc_style(style.font(style.label_size))
        .label_style(style.font(style.tick_size))
        .x_label_formatter(&sci_label)
        .y_label_formatter(&sci_label)
        .light_line_style(WHITE.mix(0.0))
        .bold_line_style(BLACK.mix(0.1))
        .draw()
        .map_err(drawing_error)?;

    let width = style.line_width;
    for (corner, trend) in trends {
        let color = colors.color_for(corner);
        chart
            .draw_series(LineSeries::new(
                trend.sweep.iter().copied().zip(trend.value.iter().copied()),
                color.mix(0.85).stroke_width(width),
            ))
            .map_err(drawing_error)?
            .label(corner.to_string())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 24, y)], color.stroke_width(width))
            });
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .label_font(style.font(style.legend_size.saturating_sub(2)))
        .background_style(WHITE.mix(0.9))
        .border_style(BLACK.mix(0.4))
        .draw()
        .map_err(drawing_error)?;

    root.present().map_err(drawing_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_to_combine_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(COMBINED_PLOT_NAME);
        let err = plot_combined_trends(&[], &PlotStyle::default(), &path).unwrap_err();
        assert!(matches!(err, PlotError::InvalidData(_)));
    }
}
