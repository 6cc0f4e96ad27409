use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use greenhouse_dashboard::data::model::Measure;

use crate::ui::plot::CHARTED;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.65, 0.50);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: charted measure → Color32
// ---------------------------------------------------------------------------

/// One distinct line colour per charted measure.
#[derive(Debug, Clone)]
pub struct SeriesColors {
    mapping: BTreeMap<Measure, Color32>,
    default_color: Color32,
}

impl SeriesColors {
    pub fn new(measures: &[Measure]) -> Self {
        let mapping = measures
            .iter()
            .copied()
            .zip(generate_palette(measures.len()))
            .collect();

        SeriesColors {
            mapping,
            default_color: Color32::LIGHT_BLUE,
        }
    }

    pub fn for_charts() -> Self {
        SeriesColors::new(&CHARTED)
    }

    pub fn color_for(&self, measure: Measure) -> Color32 {
        self.mapping
            .get(&measure)
            .copied()
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_colours_are_distinct() {
        let palette = generate_palette(8);
        assert_eq!(palette.len(), 8);
        for (i, a) in palette.iter().enumerate() {
            for b in &palette[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn uncharted_measures_fall_back() {
        let colors = SeriesColors::new(&[Measure::Energy]);
        assert_ne!(colors.color_for(Measure::Energy), Color32::LIGHT_BLUE);
        assert_eq!(colors.color_for(Measure::Humidity), Color32::LIGHT_BLUE);
    }
}
