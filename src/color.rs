use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::{CellValue, Field};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// `n` distinct colours. Hues advance by the golden angle and lightness
/// alternates between two bands.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    const GOLDEN_ANGLE: f32 = 137.507_76;
    (0..n)
        .map(|i| {
            let lightness = if i % 2 == 0 { 0.55 } else { 0.42 };
            let hsl = Hsl::new((i as f32 * GOLDEN_ANGLE) % 360.0, 0.7, lightness);
            let rgb: Srgb = hsl.into_color();
            let rgb: Srgb<u8> = rgb.into_format();
            Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
        })
        .collect()
}

/// Blend from a pale tint to `base` as `t` goes from 0 to 1, for heat-map cells.
pub fn shade(base: Color32, t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    let mix = |c: u8| (255.0 + (c as f32 - 255.0) * t) as u8;
    Color32::from_rgb(mix(base.r()), mix(base.g()), mix(base.b()))
}

// ---------------------------------------------------------------------------
// Color mapping: category label → Color32
// ---------------------------------------------------------------------------

/// Maps the categories of one field to distinct colours, keyed by the
/// category's display label so chart series can look them up by name.
#[derive(Debug, Clone)]
pub struct ColorMap {
    pub field: Field,
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map for a field from its distinct values.
    pub fn new(field: Field, unique_values: &BTreeSet<CellValue>) -> Self {
        let palette = generate_palette(unique_values.len());
        let mapping = unique_values
            .iter()
            .zip(palette)
            .map(|(v, c)| (v.to_string(), c))
            .collect();

        ColorMap {
            field,
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a category label.
    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Return the legend entries (value label → colour) for the UI.
    pub fn legend_entries(&self) -> Vec<(String, Color32)> {
        self.mapping
            .iter()
            .map(|(v, c)| (v.clone(), *c))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        let p = generate_palette(4);
        assert_eq!(p.len(), 4);
        assert_ne!(p[0], p[2]);
    }

    #[test]
    fn unknown_labels_fall_back_to_gray() {
        let values = BTreeSet::from([
            CellValue::Text("Apartment".into()),
            CellValue::Text("Villa".into()),
        ]);
        let map = ColorMap::new(Field::PropertyType, &values);
        assert_ne!(map.color_for("Villa"), Color32::GRAY);
        assert_eq!(map.color_for("Castle"), Color32::GRAY);
        assert_eq!(map.legend_entries().len(), 2);
    }

    #[test]
    fn shade_spans_white_to_base() {
        let base = Color32::from_rgb(0, 100, 0);
        assert_eq!(shade(base, 0.0), Color32::WHITE);
        assert_eq!(shade(base, 1.0), base);
    }
}
