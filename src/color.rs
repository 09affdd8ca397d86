use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::Property;

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
            let hue = (i as f32 / n as f32) * 300.0;
            let hsl = Hsl::new(hue, 0.70, 0.55);
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
// Color mapping: bedroom count → Color32
// ---------------------------------------------------------------------------

/// Maps each bedroom count present in the data to a distinct colour.
/// Hues run from red (fewest beds) toward violet (most).
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    mapping: BTreeMap<i64, Color32>,
}

impl ColorMap {
    pub fn from_listings(listings: &[Property]) -> Self {
        let beds: BTreeSet<i64> = listings.iter().map(|p| p.beds).collect();
        let palette = generate_palette(beds.len());
        ColorMap {
            mapping: beds.into_iter().zip(palette).collect(),
        }
    }

    pub fn color_for(&self, beds: i64) -> Color32 {
        self.mapping.get(&beds).copied().unwrap_or(Color32::GRAY)
    }

    /// Bedroom counts in ascending order with their colours.
    pub fn entries(&self) -> impl Iterator<Item = (i64, Color32)> + '_ {
        self.mapping.iter().map(|(b, c)| (*b, *c))
    }
}
