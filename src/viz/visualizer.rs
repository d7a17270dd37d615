use eframe::egui::Color32;
use serde::{Deserialize, Serialize};

use super::figure::{
    Axes3d, ColorBar, Figure, Layout, Legend, LegendEntry, Panel, PointColors, ProjectionFigure,
    Series, Series3d, ViewAngles,
};
use crate::color::{ColorMap, ColorMapKind, ContinuousColorMap};
use crate::data::filter::group_indices;
use crate::data::DataFrame;
use crate::error::{DeminError, Result};

/// matplotlib's first cycle colour, used for uncoloured scatters.
const DEFAULT_COLOR: Color32 = Color32::from_rgb(31, 119, 180);
const EXPAND_SIZE: [f32; 2] = [20.0, 6.0];
const EXPAND_MARKER_SIZE: f32 = 40.0;

/// How a colouring variable is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableKind {
    /// One colour per distinct value, with a legend.
    Discrete,
    /// Values mapped through a continuous colour map, with a colour bar.
    Continuous,
}

/// Presentation settings of a [`Visualizer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerOptions {
    /// Square figure side, in inches.
    pub figsize: f32,
    pub font_size: f32,
    /// Marker area in pt².
    pub marker_size: f32,
    pub elevation: f64,
    pub azimuth: f64,
    pub label_pad: f32,
    pub colormap: ColorMapKind,
    pub colorbar: bool,
}

impl Default for VisualizerOptions {
    fn default() -> Self {
        Self {
            figsize: 8.0,
            font_size: 15.0,
            marker_size: 30.0,
            elevation: 30.0,
            azimuth: -75.0,
            label_pad: 10.0,
            colormap: ColorMapKind::Turbo,
            colorbar: true,
        }
    }
}

/// Builds scatter figures of samples located by three spatial columns.
#[derive(Debug, Clone)]
pub struct Visualizer {
    data: DataFrame,
    subset: [String; 3],
    options: VisualizerOptions,
}

impl Visualizer {
    /// Rows missing any of the `subset` columns are dropped here.
    pub fn new(data: &DataFrame, subset: [&str; 3], options: VisualizerOptions) -> Result<Self> {
        let kept = data.drop_na(&subset)?;
        for column in subset {
            // Reject text coordinates up front rather than at plot time.
            kept.numeric_column(column)?;
        }
        let dropped = data.len() - kept.len();
        if dropped > 0 {
            log::debug!("dropped {dropped} rows with missing {subset:?}");
        }
        Ok(Self {
            data: kept,
            subset: subset.map(str::to_string),
            options,
        })
    }

    pub fn with_defaults(data: &DataFrame, subset: [&str; 3]) -> Result<Self> {
        Self::new(data, subset, VisualizerOptions::default())
    }

    pub fn data(&self) -> &DataFrame {
        &self.data
    }

    pub fn subset(&self) -> &[String; 3] {
        &self.subset
    }

    pub fn options(&self) -> &VisualizerOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut VisualizerOptions {
        &mut self.options
    }

    fn points(&self, frame: &DataFrame) -> Result<Vec<[f64; 3]>> {
        let [x, y, z] = [0, 1, 2].map(|k| frame.numeric_column(&self.subset[k]));
        let (x, y, z) = (x?, y?, z?);
        Ok((0..frame.len()).map(|i| [x[i], y[i], z[i]]).collect())
    }

    fn empty_figure(&self, title: Option<&str>) -> Figure {
        Figure {
            size: [self.options.figsize, self.options.figsize],
            title: title.map(str::to_string),
            font_size: self.options.font_size,
            axes: Axes3d {
                labels: self.subset.clone(),
                view: ViewAngles {
                    elevation: self.options.elevation,
                    azimuth: self.options.azimuth,
                },
                label_pad: self.options.label_pad,
                series: Vec::new(),
            },
            legend: None,
            colorbar: None,
            layout: Layout::default(),
        }
    }

    fn legend(&self, entries: Vec<LegendEntry>) -> Legend {
        Legend {
            entries,
            font_size: self.options.font_size * 0.75,
            marker_scale: 2.0,
        }
    }

    /// 3-D scatter of the samples.
    ///
    /// With `kind == None` the variable is ignored and a plain, untitled
    /// scatter is produced.  Otherwise rows missing `variable` are dropped
    /// and points are coloured by it.
    pub fn plot(&self, variable: Option<&str>, kind: Option<VariableKind>) -> Result<Figure> {
        let Some(kind) = kind else {
            let mut figure = self.empty_figure(None);
            figure.axes.series.push(Series {
                label: None,
                points: self.points(&self.data)?,
                colors: PointColors::Uniform(DEFAULT_COLOR),
                marker_size: self.options.marker_size,
            });
            return Ok(figure);
        };
        let variable = variable.ok_or_else(|| {
            DeminError::InvalidInput(format!("{kind:?} plots need a colouring variable"))
        })?;

        let frame = self.data.drop_na(&[variable])?;
        let points = self.points(&frame)?;
        let mut figure = self.empty_figure(Some(variable));

        match kind {
            VariableKind::Discrete => {
                let groups = group_indices(&frame, variable)?;
                let palette = self.options.colormap.palette(groups.len());
                let mut entries = Vec::with_capacity(groups.len());
                for ((value, rows), color) in groups.iter().zip(palette) {
                    let label = value.to_string();
                    figure.axes.series.push(Series {
                        label: Some(label.clone()),
                        points: rows.iter().map(|&r| points[r]).collect(),
                        colors: PointColors::Uniform(color),
                        marker_size: self.options.marker_size,
                    });
                    entries.push(LegendEntry { label, color });
                }
                figure.legend = Some(self.legend(entries));
            }
            VariableKind::Continuous => {
                let values = frame.numeric_column(variable)?;
                let cmap = ContinuousColorMap::from_values(&values, self.options.colormap);
                let colors = match &cmap {
                    Some(cm) => values.iter().map(|&v| cm.color_for(v)).collect(),
                    None => Vec::new(),
                };
                figure.axes.series.push(Series3d {
                    label: None,
                    points,
                    colors: PointColors::PerPoint(colors),
                    marker_size: self.options.marker_size,
                });
                if let (true, Some(cm)) = (self.options.colorbar, cmap) {
                    figure.layout = Layout {
                        left: 0.0,
                        right: 0.8,
                        bottom: 0.0,
                        top: 1.0,
                    };
                    figure.colorbar = Some(ColorBar {
                        label: variable.to_string(),
                        min: cm.min,
                        max: cm.max,
                        colormap: cm.kind,
                        rect: [0.85, 0.15, 0.05, 0.6],
                    });
                }
            }
        }
        log::debug!(
            "plotted {} points in {} series coloured by '{variable}'",
            figure.point_count(),
            figure.axes.series.len()
        );
        Ok(figure)
    }

    /// The three pairwise 2-D projections, each coloured by `hue`.
    ///
    /// A numeric `hue` gets a continuous colour scale, anything else one
    /// colour per value.
    pub fn expand(&self, hue: &str) -> Result<ProjectionFigure> {
        let frame = self.data.drop_na(&[hue])?;
        let points = self.points(&frame)?;
        let pairs = [(0, 1), (0, 2), (1, 2)];
        let marker_size = EXPAND_MARKER_SIZE;

        let project = |rows: &mut dyn Iterator<Item = usize>, a: usize, b: usize| -> Vec<[f64; 2]> {
            rows.map(|r| [points[r][a], points[r][b]]).collect()
        };

        let mut legend = None;
        let mut colorbar = None;
        let panels = if frame.is_numeric_column(hue)? {
            let values = frame.numeric_column(hue)?;
            let cmap = ContinuousColorMap::from_values(&values, self.options.colormap);
            let colors: Vec<Color32> = match &cmap {
                Some(cm) => values.iter().map(|&v| cm.color_for(v)).collect(),
                None => Vec::new(),
            };
            if let Some(cm) = cmap {
                colorbar = Some(ColorBar {
                    label: hue.to_string(),
                    min: cm.min,
                    max: cm.max,
                    colormap: cm.kind,
                    rect: [0.92, 0.15, 0.01, 0.7],
                });
            }
            pairs
                .iter()
                .map(|&(a, b)| Panel {
                    x_label: self.subset[a].clone(),
                    y_label: self.subset[b].clone(),
                    series: vec![Series {
                        label: None,
                        points: project(&mut (0..frame.len()), a, b),
                        colors: PointColors::PerPoint(colors.clone()),
                        marker_size,
                    }],
                })
                .collect()
        } else {
            let cmap = ColorMap::new(hue, &frame.unique_values(hue)?, self.options.colormap);
            let groups = group_indices(&frame, hue)?;
            legend = Some(self.legend(
                cmap.legend_entries()
                    .into_iter()
                    .map(|(label, color)| LegendEntry { label, color })
                    .collect(),
            ));
            pairs
                .iter()
                .map(|&(a, b)| Panel {
                    x_label: self.subset[a].clone(),
                    y_label: self.subset[b].clone(),
                    series: groups
                        .iter()
                        .map(|(value, rows)| Series {
                            label: Some(value.to_string()),
                            points: project(&mut rows.iter().copied(), a, b),
                            colors: PointColors::Uniform(cmap.color_for(value)),
                            marker_size,
                        })
                        .collect(),
                })
                .collect()
        };

        Ok(ProjectionFigure {
            suptitle: format!("Geospatial Visualization: {hue}"),
            size: EXPAND_SIZE,
            panels,
            legend,
            colorbar,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Value;

    fn frame() -> DataFrame {
        DataFrame::from_columns([
            ("X", vec![0.0, 1.0, 2.0, 3.0].into_iter().map(Value::Float).collect()),
            ("Y", vec![Value::Float(0.0), Value::Float(1.0), Value::Null, Value::Float(3.0)]),
            ("Z", vec![0.0, -1.0, -2.0, -3.0].into_iter().map(Value::Float).collect()),
            (
                "Lith",
                vec![Value::from("b"), Value::from("a"), Value::from("a"), Value::Null],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn options_default_to_matplotlib_setup() {
        let o = VisualizerOptions::default();
        assert_eq!((o.figsize, o.font_size, o.marker_size), (8.0, 15.0, 30.0));
        assert_eq!((o.elevation, o.azimuth), (30.0, -75.0));
        assert!(o.colorbar);
    }

    #[test]
    fn construction_drops_incomplete_rows() {
        let viz = Visualizer::with_defaults(&frame(), ["X", "Y", "Z"]).unwrap();
        assert_eq!(viz.data().len(), 3);
    }

    #[test]
    fn plain_plot_has_no_title() {
        let viz = Visualizer::with_defaults(&frame(), ["X", "Y", "Z"]).unwrap();
        let fig = viz.plot(Some("Lith"), None).unwrap();
        assert_eq!(fig.title, None);
        assert_eq!(fig.point_count(), 3);
        assert!(fig.legend.is_none());
    }

    #[test]
    fn kind_without_variable_is_rejected() {
        let viz = Visualizer::with_defaults(&frame(), ["X", "Y", "Z"]).unwrap();
        assert!(matches!(
            viz.plot(None, Some(VariableKind::Discrete)),
            Err(DeminError::InvalidInput(_))
        ));
    }

    #[test]
    fn text_coordinates_are_rejected() {
        assert!(matches!(
            Visualizer::with_defaults(&frame(), ["X", "Lith", "Z"]),
            Err(DeminError::NonNumeric { .. })
        ));
    }

    #[test]
    fn expand_with_text_hue_uses_legend() {
        let viz = Visualizer::with_defaults(&frame(), ["X", "Y", "Z"]).unwrap();
        let fig = viz.expand("Lith").unwrap();
        assert_eq!(fig.suptitle, "Geospatial Visualization: Lith");
        assert_eq!(fig.panels.len(), 3);
        assert_eq!((fig.panels[1].x_label.as_str(), fig.panels[1].y_label.as_str()), ("X", "Z"));
        assert_eq!(fig.legend.as_ref().map(|l| l.entries.len()), Some(2));
        assert_eq!(fig.panels[0].series.len(), 2);
        assert!(fig.colorbar.is_none());
    }
}
