use std::ops::Range;
use std::path::Path;

use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;

use super::{config_error, drawing_error, padded_range, sci_label, PlotError, PlotStyle, Result};
use crate::analysis::metrics::TARGET_CURRENTS;
use crate::data::model::{Corner, SplitExperiments};

/// Line colours of the three experiments.
const EXPERIMENT_COLORS: [RGBColor; 3] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
];

const REFERENCE_COLOR: RGBColor = RGBColor(150, 150, 150);
/// Pixels between dots on the reference lines.
const REFERENCE_DOT_SPACING: i32 = 8;

/// Draw the three experiments of a voltage-sweep file with horizontal
/// reference lines at the target currents, and save as PNG.
pub fn plot_voltage_sweep(
    split: &SplitExperiments,
    corner: &Corner,
    style: &PlotStyle,
    output_path: &Path,
) -> Result<()> {
    if split.is_empty() {
        return Err(PlotError::InvalidData(
            "voltage sweep has no samples".to_string(),
        ));
    }

    let x_range = padded_range(&split.sweep);
    let y_range = padded_range(split.currents.iter().flatten().chain(TARGET_CURRENTS.iter()));

    let root = BitMapBackend::new(output_path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE).map_err(drawing_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(corner.title(), style.title_font())
        .margin(style.margin)
        .x_label_area_size(70)
        .y_label_area_size(110)
        .build_cartesian_2d(x_range.clone(), y_range)
        .map_err(config_error)?;

    chart
        .configure_mesh()
        .x_desc("Voltage sweep [V]")
        .y_desc("Drain current M1 [A]")
        .axis_desc_style(style.font(style.label_size))
        .label_style(style.font(style.tick_size))
        .x_label_formatter(&|v| format!("{v:.2}"))
        .y_label_formatter(&sci_label)
        .light_line_style(WHITE.mix(0.0))
        .bold_line_style(BLACK.mix(0.1))
        .draw()
        .map_err(drawing_error)?;

    // Reference lines sit behind the data.
    draw_reference_lines(&mut chart, &x_range)?;

    let width = style.line_width;
    for ((current, &target), color) in split
        .currents
        .iter()
        .zip(TARGET_CURRENTS.iter())
        .zip(EXPERIMENT_COLORS)
    {
        chart
            .draw_series(LineSeries::new(
                split.sweep.iter().copied().zip(current.iter().copied()),
                color.stroke_width(width),
            ))
            .map_err(drawing_error)?
            .label(format!("Iin = {:.0} µA", target * 1e6))
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 24, y)], color.stroke_width(width))
            });
    }

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

type SweepChart<'a, 'b> =
    ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Horizontal dotted grey line at each target current.
fn draw_reference_lines(chart: &mut SweepChart<'_, '_>, x_range: &Range<f64>) -> Result<()> {
    for &target in &TARGET_CURRENTS {
        chart
            .draw_series(DottedLineSeries::new(
                [(x_range.start, target), (x_range.end, target)],
                0,
                REFERENCE_DOT_SPACING,
                |c: (i32, i32)| Circle::new(c, 1, REFERENCE_COLOR.mix(0.7).filled()),
            ))
            .map_err(drawing_error)?;
    }
    Ok(())
}
