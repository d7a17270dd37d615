use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};
use serde::{Deserialize, Serialize};

use crate::data::model::Value;

// ---------------------------------------------------------------------------
// Colour maps
// ---------------------------------------------------------------------------

/// Continuous colour maps available to the visualizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorMapKind {
    /// Google's "turbo" rainbow map.
    #[default]
    Turbo,
    /// Evenly spaced hues at fixed saturation and lightness.
    Hsl,
}

fn to_color32(rgb: Srgb) -> Color32 {
    let rgb: Srgb<u8> = Srgb::new(
        rgb.red.clamp(0.0, 1.0),
        rgb.green.clamp(0.0, 1.0),
        rgb.blue.clamp(0.0, 1.0),
    )
    .into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

/// Polynomial approximation of turbo (Mikhailov, 2019).
fn turbo(t: f32) -> Srgb {
    let t = t.clamp(0.0, 1.0);
    let r = 0.135_721_38
        + t * (4.615_392_6 + t * (-42.660_322 + t * (132.131_08 + t * (-152.942_39 + t * 59.286_38))));
    let g = 0.091_402_61
        + t * (2.194_188_4 + t * (4.842_966_6 + t * (-14.185_033 + t * (4.277_298_6 + t * 2.829_566))));
    let b = 0.106_673_3
        + t * (12.641_946 + t * (-60.582_05 + t * (110.362_77 + t * (-89.903_11 + t * 27.348_25))));
    Srgb::new(r, g, b)
}

fn hsl(t: f32) -> Srgb {
    let hsl = Hsl::new(t.clamp(0.0, 1.0) * 300.0, 0.75, 0.55);
    hsl.into_color()
}

impl ColorMapKind {
    /// Colour at position `t` in `[0, 1]`; values outside are clamped.
    pub fn sample(self, t: f32) -> Color32 {
        match self {
            ColorMapKind::Turbo => to_color32(turbo(t)),
            ColorMapKind::Hsl => to_color32(hsl(t)),
        }
    }

    /// `n` distinct colours for categorical data.
    ///
    /// Sequential maps are sampled at `i / (n + 1)` for `i` in `1..=n`, which
    /// keeps clear of the very dark ends the way seaborn does.
    pub fn palette(self, n: usize) -> Vec<Color32> {
        match self {
            ColorMapKind::Turbo => (1..=n)
                .map(|i| self.sample(i as f32 / (n + 1) as f32))
                .collect(),
            ColorMapKind::Hsl => generate_palette(n),
        }
    }
}

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
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: categorical value → Color32
// ---------------------------------------------------------------------------

/// Maps unique values of a chosen column to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    pub column: String,
    mapping: BTreeMap<Value, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map for the given column from its unique values.
    pub fn new(column: &str, unique_values: &BTreeSet<Value>, kind: ColorMapKind) -> Self {
        let palette = kind.palette(unique_values.len());
        let mapping: BTreeMap<Value, Color32> = unique_values
            .iter()
            .zip(palette)
            .map(|(v, c)| (v.clone(), c))
            .collect();

        ColorMap {
            column: column.to_string(),
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given value.
    pub fn color_for(&self, value: &Value) -> Color32 {
        self.mapping
            .get(value)
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Legend entries (value label → colour), in value order.
    pub fn legend_entries(&self) -> Vec<(String, Color32)> {
        self.mapping
            .iter()
            .map(|(v, c)| (v.to_string(), *c))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Color mapping: numeric value → Color32
// ---------------------------------------------------------------------------

/// Linear normalisation of a numeric range onto a colour map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContinuousColorMap {
    pub kind: ColorMapKind,
    pub min: f64,
    pub max: f64,
}

impl ContinuousColorMap {
    /// Range spans the finite values; `None` when there are none.
    pub fn from_values(values: &[f64], kind: ColorMapKind) -> Option<Self> {
        let finite = values.iter().copied().filter(|v| v.is_finite());
        let min = finite.clone().fold(f64::INFINITY, f64::min);
        let max = finite.fold(f64::NEG_INFINITY, f64::max);
        (min <= max).then_some(Self { kind, min, max })
    }

    /// Position of `value` in `[0, 1]`; a degenerate range maps to 0.
    pub fn normalize(&self, value: f64) -> f32 {
        let range = self.max - self.min;
        if range.abs() < f64::EPSILON {
            return 0.0;
        }
        ((value - self.min) / range).clamp(0.0, 1.0) as f32
    }

    pub fn color_for(&self, value: f64) -> Color32 {
        self.kind.sample(self.normalize(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turbo_runs_dark_to_green_to_red() {
        let start = ColorMapKind::Turbo.sample(0.0);
        let mid = ColorMapKind::Turbo.sample(0.5);
        let end = ColorMapKind::Turbo.sample(1.0);
        assert!(start.r() < 60 && start.g() < 60 && start.b() < 60);
        assert!(mid.g() > mid.r() && mid.g() > mid.b());
        assert!(end.r() > 100 && end.r() > end.b());
    }

    #[test]
    fn palette_sizes_and_distinctness() {
        for kind in [ColorMapKind::Turbo, ColorMapKind::Hsl] {
            assert!(kind.palette(0).is_empty());
            let p = kind.palette(5);
            assert_eq!(p.len(), 5);
            for i in 0..p.len() {
                for j in i + 1..p.len() {
                    assert_ne!(p[i], p[j]);
                }
            }
        }
    }

    #[test]
    fn categorical_map_falls_back_to_gray() {
        let values: BTreeSet<Value> = [Value::from("a"), Value::from("b")].into_iter().collect();
        let cm = ColorMap::new("lith", &values, ColorMapKind::Turbo);
        assert_eq!(cm.legend_entries().len(), 2);
        assert_eq!(cm.color_for(&Value::from("zzz")), Color32::GRAY);
        assert_ne!(cm.color_for(&Value::from("a")), cm.color_for(&Value::from("b")));
    }

    #[test]
    fn continuous_extremes_hit_map_ends() {
        let cm = ContinuousColorMap::from_values(&[3.0, f64::NAN, 1.0, 2.0], ColorMapKind::Turbo).unwrap();
        assert_eq!((cm.min, cm.max), (1.0, 3.0));
        assert_eq!(cm.color_for(1.0), ColorMapKind::Turbo.sample(0.0));
        assert_eq!(cm.color_for(3.0), ColorMapKind::Turbo.sample(1.0));
        assert_eq!(cm.normalize(2.0), 0.5);
    }

    #[test]
    fn empty_or_degenerate_ranges() {
        assert!(ContinuousColorMap::from_values(&[f64::NAN], ColorMapKind::Turbo).is_none());
        let flat = ContinuousColorMap::from_values(&[2.0, 2.0], ColorMapKind::Hsl).unwrap();
        assert_eq!(flat.normalize(2.0), 0.0);
    }
}
