use eframe::egui::Color32;

use crate::color::ColorMapKind;

/// Camera angles in degrees, matplotlib's `view_init(elev, azim)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewAngles {
    pub elevation: f64,
    pub azimuth: f64,
}

/// Fractions of the figure reserved for the main axes (`subplots_adjust`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            left: 0.125,
            right: 0.9,
            bottom: 0.11,
            top: 0.88,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PointColors {
    Uniform(Color32),
    PerPoint(Vec<Color32>),
}

impl PointColors {
    pub fn color_at(&self, i: usize) -> Color32 {
        match self {
            PointColors::Uniform(c) => *c,
            PointColors::PerPoint(cs) => cs.get(i).copied().unwrap_or(Color32::GRAY),
        }
    }
}

/// One `scatter` call: points sharing a label.
#[derive(Debug, Clone, PartialEq)]
pub struct Series<P> {
    pub label: Option<String>,
    pub points: Vec<P>,
    pub colors: PointColors,
    /// Marker area in pt², as matplotlib's `s`.
    pub marker_size: f32,
}

pub type Series3d = Series<[f64; 3]>;
pub type Series2d = Series<[f64; 2]>;

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: Color32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    pub entries: Vec<LegendEntry>,
    pub font_size: f32,
    pub marker_scale: f32,
}

/// Colour scale shown beside a continuously coloured plot.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorBar {
    pub label: String,
    pub min: f64,
    pub max: f64,
    pub colormap: ColorMapKind,
    /// `[left, bottom, width, height]` in figure fractions.
    pub rect: [f32; 4],
}

#[derive(Debug, Clone, PartialEq)]
pub struct Axes3d {
    pub labels: [String; 3],
    pub view: ViewAngles,
    pub label_pad: f32,
    pub series: Vec<Series3d>,
}

/// A 3-D scatter figure; a new value is produced by every plot call.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    /// Width and height in inches.
    pub size: [f32; 2],
    pub title: Option<String>,
    pub font_size: f32,
    pub axes: Axes3d,
    pub legend: Option<Legend>,
    pub colorbar: Option<ColorBar>,
    pub layout: Layout,
}

impl Figure {
    pub fn point_count(&self) -> usize {
        self.axes.series.iter().map(|s| s.points.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series2d>,
}

/// A row of 2-D projection panels sharing one hue.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionFigure {
    pub suptitle: String,
    pub size: [f32; 2],
    pub panels: Vec<Panel>,
    pub legend: Option<Legend>,
    pub colorbar: Option<ColorBar>,
}
