use std::collections::{BTreeMap, BTreeSet};

use palette::{Hsl, IntoColor, Srgb};
use plotters::style::RGBColor;

use crate::data::model::Corner;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<RGBColor> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.45);
            let rgb: Srgb = hsl.into_color();
            RGBColor(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: corner → RGBColor
// ---------------------------------------------------------------------------

/// Assigns each corner in a set its own colour, in corner order.
#[derive(Debug, Clone)]
pub struct CornerColors {
    mapping: BTreeMap<Corner, RGBColor>,
    default_color: RGBColor,
}

impl CornerColors {
    pub fn new(corners: &BTreeSet<Corner>) -> Self {
        let palette = generate_palette(corners.len());
        let mapping = corners.iter().copied().zip(palette).collect();

        CornerColors {
            mapping,
            default_color: RGBColor(128, 128, 128),
        }
    }

    /// Look up the colour for a corner; unknown corners are grey.
    pub fn color_for(&self, corner: &Corner) -> RGBColor {
        self.mapping
            .get(corner)
            .copied()
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_colours_are_distinct() {
        let colours = generate_palette(9);
        assert_eq!(colours.len(), 9);
        for (i, a) in colours.iter().enumerate() {
            for b in &colours[i + 1..] {
                assert_ne!((a.0, a.1, a.2), (b.0, b.1, b.2));
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn unknown_corner_is_grey() {
        let known: BTreeSet<Corner> = ["tt_0_27", "ff_10_50"]
            .iter()
            .map(|n| Corner::parse_file_name(n).unwrap().0)
            .collect();
        let colours = CornerColors::new(&known);
        let (other, _) = Corner::parse_file_name("ss_01_0").unwrap();
        let grey = colours.color_for(&other);
        assert_eq!((grey.0, grey.1, grey.2), (128, 128, 128));
        let tt = colours.color_for(known.iter().next().unwrap());
        assert_ne!((tt.0, tt.1, tt.2), (128, 128, 128));
    }
}
