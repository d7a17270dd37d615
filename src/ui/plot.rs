use std::collections::HashMap;

use eframe::egui::{self, Color32, Pos2, Rect, RichText, Sense, Ui};
use egui_plot::{Legend, Line, MarkerShape, Plot, PlotPoint, PlotPoints, PlotUi, Points, Text};

use demin::viz::figure::{ColorBar, PointColors, Series};
use demin::viz::{Figure, Projector, ProjectionFigure};

use crate::state::AppState;

const COLORBAR_STEPS: usize = 64;
const COLORBAR_WIDTH: f32 = 18.0;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the active figure in the central panel.
pub fn central_plot(ui: &mut Ui, state: &AppState) {
    if let Some(fig) = &state.projections {
        projection_plot(ui, fig);
    } else if let Some(fig) = &state.figure {
        figure_plot(ui, fig);
    } else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No figure to show");
        });
    }
}

/// matplotlib's `s` is a marker area in pt²; egui wants a radius.
fn marker_radius(size: f32, scale: f32) -> f32 {
    size.max(1.0).sqrt() * 0.5 * scale
}

/// Draw one series, splitting per-point colours into one item per colour.
fn draw_series<P: Copy>(
    plot_ui: &mut PlotUi,
    series: &Series<P>,
    to_screen: impl Fn(P) -> [f64; 2],
) {
    let radius = marker_radius(series.marker_size, 0.5);
    match &series.colors {
        PointColors::Uniform(color) => {
            let pts: PlotPoints = series.points.iter().map(|&p| to_screen(p)).collect();
            let mut item = Points::new(pts)
                .shape(MarkerShape::Circle)
                .filled(true)
                .radius(radius)
                .color(*color);
            if let Some(label) = &series.label {
                item = item.name(label);
            }
            plot_ui.points(item);
        }
        PointColors::PerPoint(_) => {
            let mut by_color: HashMap<Color32, Vec<[f64; 2]>> = HashMap::new();
            for (i, &p) in series.points.iter().enumerate() {
                by_color
                    .entry(series.colors.color_at(i))
                    .or_default()
                    .push(to_screen(p));
            }
            for (color, pts) in by_color {
                plot_ui.points(
                    Points::new(PlotPoints::new(pts))
                        .shape(MarkerShape::Circle)
                        .filled(true)
                        .radius(radius)
                        .color(color),
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// 3-D figure
// ---------------------------------------------------------------------------

/// Render a 3-D scatter figure through an orthographic projection.
pub fn figure_plot(ui: &mut Ui, figure: &Figure) {
    if let Some(title) = &figure.title {
        ui.vertical_centered(|ui: &mut Ui| {
            ui.label(RichText::new(title).size(figure.font_size).strong());
        });
    }

    let projector = Projector::for_axes(&figure.axes);
    let axes = &figure.axes;
    let pad = f64::from(axes.label_pad) / 100.0;

    let width = ui.available_width();
    let plot_width = match &figure.colorbar {
        Some(_) => width * figure.layout.right,
        None => width,
    };

    ui.horizontal(|ui: &mut Ui| {
        let mut plot = Plot::new("figure_plot")
            .width(plot_width)
            .data_aspect(1.0)
            .show_axes(false)
            .show_grid(false)
            .allow_boxed_zoom(true)
            .allow_drag(true)
            .allow_scroll(true)
            .allow_zoom(true);
        if figure.legend.as_ref().is_some_and(|l| !l.entries.is_empty()) {
            plot = plot.legend(Legend::default());
        }

        let response = plot.show(ui, |plot_ui| {
            for [a, b] in projector.box_edges() {
                plot_ui.line(
                    Line::new(PlotPoints::new(vec![a, b]))
                        .color(Color32::from_gray(150))
                        .width(0.5),
                );
            }
            for (k, label) in axes.labels.iter().enumerate() {
                let [u, v] = projector.label_anchor(k, pad);
                plot_ui.text(Text::new(
                    PlotPoint::new(u, v),
                    RichText::new(label).size(figure.font_size),
                ));
            }

            // Back-to-front within each series so nearer points overlap farther ones.
            for series in &axes.series {
                let mut order: Vec<usize> = (0..series.points.len()).collect();
                order.sort_by(|&i, &j| {
                    projector
                        .depth(series.points[i])
                        .total_cmp(&projector.depth(series.points[j]))
                });
                let sorted = Series {
                    label: series.label.clone(),
                    points: order.iter().map(|&i| series.points[i]).collect(),
                    colors: match &series.colors {
                        PointColors::Uniform(c) => PointColors::Uniform(*c),
                        PointColors::PerPoint(_) => PointColors::PerPoint(
                            order.iter().map(|&i| series.colors.color_at(i)).collect(),
                        ),
                    },
                    marker_size: series.marker_size,
                };
                draw_series(plot_ui, &sorted, |p| projector.project(p));
            }
        });

        if let Some(cb) = &figure.colorbar {
            colorbar(ui, cb, response.response.rect.height() * cb.rect[3]);
        }
    });
}

// ---------------------------------------------------------------------------
// Projection panels
// ---------------------------------------------------------------------------

/// Render the 1×3 projection panels side by side.
pub fn projection_plot(ui: &mut Ui, figure: &ProjectionFigure) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(&figure.suptitle);
    });

    let height = ui.available_height() - 24.0;
    ui.horizontal(|ui: &mut Ui| {
        let bar = if figure.colorbar.is_some() { COLORBAR_WIDTH + 48.0 } else { 0.0 };
        let n = figure.panels.len().max(1) as f32;
        let panel_width = (ui.available_width() - bar) / n - ui.spacing().item_spacing.x;

        for (i, panel) in figure.panels.iter().enumerate() {
            let mut plot = Plot::new(("projection", i))
                .width(panel_width)
                .height(height)
                .x_axis_label(panel.x_label.as_str())
                .y_axis_label(panel.y_label.as_str());
            // One legend is enough for the whole row.
            if i + 1 == figure.panels.len() && figure.legend.is_some() {
                plot = plot.legend(Legend::default());
            }
            plot.show(ui, |plot_ui| {
                for series in &panel.series {
                    draw_series(plot_ui, series, |p| p);
                }
            });
        }

        if let Some(cb) = &figure.colorbar {
            colorbar(ui, cb, height * cb.rect[3]);
        }
    });
}

// ---------------------------------------------------------------------------
// Colour bar
// ---------------------------------------------------------------------------

fn colorbar(ui: &mut Ui, cb: &ColorBar, height: f32) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(format!("{:.2}", cb.max)).small());
        let (rect, _) =
            ui.allocate_exact_size(egui::vec2(COLORBAR_WIDTH, height.max(40.0)), Sense::hover());
        let painter = ui.painter_at(rect);
        let step = rect.height() / COLORBAR_STEPS as f32;
        for i in 0..COLORBAR_STEPS {
            let t = i as f32 / (COLORBAR_STEPS - 1) as f32;
            let bottom = rect.bottom() - i as f32 * step;
            let cell = Rect::from_min_max(
                Pos2::new(rect.left(), bottom - step - 0.5),
                Pos2::new(rect.right(), bottom),
            );
            painter.rect_filled(cell, 0.0, cb.colormap.sample(t));
        }
        ui.label(RichText::new(format!("{:.2}", cb.min)).small());
        ui.label(RichText::new(&cb.label).strong());
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_radius_grows_with_area() {
        assert!(marker_radius(40.0, 1.0) > marker_radius(30.0, 1.0));
        assert_eq!(marker_radius(0.0, 1.0), 0.5);
    }
}
