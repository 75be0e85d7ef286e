use std::path::Path;

use plotters::prelude::*;

use super::{config_error, drawing_error, padded_range, sci_label, PlotError, PlotStyle, Result};
use crate::analysis::error_curve::{ErrorCurve, Trend};
use crate::data::model::Corner;

const DATA_COLOR: RGBColor = RGBColor(214, 39, 40);
const TREND_COLOR: RGBColor = RGBColor(31, 80, 200);

/// Draw one corner's reduced mirror-error curve with its fitted trend.
pub fn plot_current_error(
    curve: &ErrorCurve,
    trend: &Trend,
    corner: &Corner,
    style: &PlotStyle,
    output_path: &Path,
) -> Result<()> {
    if curve.sweep.is_empty() {
        return Err(PlotError::InvalidData("error curve is empty".to_string()));
    }

    let x_range = padded_range(&curve.sweep);
    let y_range = padded_range(curve.error.iter().chain(trend.value.iter()));

    let root = BitMapBackend::new(output_path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE).map_err(drawing_error)?;

    let title = format!("Current Error |Iin - Iout| - {}", corner.title());
    let mut chart = ChartBuilder::on(&root)
        .caption(title, style.title_font())
        .margin(style.margin)
        .x_label_area_size(70)
        .y_label_area_size(110)
        .build_cartesian_2d(x_range, y_range)
        .map_err(config_error)?;

    chart
        .configure_mesh()
        .x_desc("Input Current [A]")
        .y_desc("Absolute Error")
        .axis_desc_style(style.font(style.label_size))
        .label_style(style.font(style.tick_size))
        .x_label_formatter(&sci_label)
        .y_label_formatter(&sci_label)
        .light_line_style(WHITE.mix(0.0))
        .bold_line_style(BLACK.mix(0.1))
        .draw()
        .map_err(drawing_error)?;

    chart
        .draw_series(LineSeries::new(
            curve.sweep.iter().copied().zip(curve.error.iter().copied()),
            DATA_COLOR.mix(0.8).stroke_width(1),
        ))
        .map_err(drawing_error)?
        .label("Data")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 24, y)], DATA_COLOR.stroke_width(1)));

    let trend_width = style.line_width + 1;
    chart
        .draw_series(LineSeries::new(
            trend.sweep.iter().copied().zip(trend.value.iter().copied()),
            TREND_COLOR.stroke_width(trend_width),
        ))
        .map_err(drawing_error)?
        .label("Trendline")
        .legend(move |(x, y)| {
            PathElement::new(vec![(x, y), (x + 24, y)], TREND_COLOR.stroke_width(trend_width))
        });

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .label_font(style.font(style.legend_size))
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
    use crate::analysis::error_curve::Polynomial;

    #[test]
    fn empty_curve_is_rejected_before_drawing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tt_0_27_Iin_plot.png");
        let curve = ErrorCurve {
            sweep: Vec::new(),
            error: Vec::new(),
        };
        let trend = Trend {
            polynomial: Polynomial {
                coefficients: vec![0.0],
                center: 0.0,
                scale: 1.0,
            },
            sweep: Vec::new(),
            value: Vec::new(),
        };
        let (corner, _) = Corner::parse_file_name("tt_0_27_Iin").unwrap();

        let err = plot_current_error(&curve, &trend, &corner, &PlotStyle::default(), &path)
            .unwrap_err();
        assert!(matches!(err, PlotError::InvalidData(_)));
        assert!(!path.exists());
    }
}
