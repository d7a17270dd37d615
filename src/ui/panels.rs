use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use demin::color::ColorMapKind;
use demin::data::DataFrame;
use demin::viz::VariableKind;

use crate::state::{AppState, ViewMode};

// ---------------------------------------------------------------------------
// Left side panel – plot settings
// ---------------------------------------------------------------------------

/// Render the left settings panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Plot");
    ui.separator();

    if state.visualizer.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    let columns = state.columns.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- View selector ----
            ui.strong("View");
            ui.horizontal(|ui: &mut Ui| {
                for (mode, label) in [
                    (ViewMode::Scatter3d, "3-D"),
                    (ViewMode::Projections, "Projections"),
                ] {
                    if ui.selectable_label(state.view_mode == mode, label).clicked() {
                        state.set_view_mode(mode);
                    }
                }
            });
            ui.separator();

            // ---- Colour-by selector ----
            ui.strong("Color by");
            let current = state.variable.clone().unwrap_or_default();
            egui::ComboBox::from_id_salt("color_by")
                .selected_text(&current)
                .show_ui(ui, |ui: &mut Ui| {
                    for col in &columns {
                        if ui.selectable_label(current == *col, col).clicked() {
                            state.set_variable(col.clone());
                        }
                    }
                });

            if state.view_mode == ViewMode::Scatter3d {
                ui.horizontal(|ui: &mut Ui| {
                    for (kind, label) in [
                        (None, "None"),
                        (Some(VariableKind::Discrete), "Discrete"),
                        (Some(VariableKind::Continuous), "Continuous"),
                    ] {
                        if ui.selectable_label(state.kind == kind, label).clicked() {
                            state.set_kind(kind);
                        }
                    }
                });
            }
            ui.separator();

            settings(ui, state);
        });
}

/// Camera and colour options of the visualizer.
fn settings(ui: &mut Ui, state: &mut AppState) {
    let Some(viz) = state.visualizer.as_mut() else {
        return;
    };
    let opts = viz.options_mut();
    let mut changed = false;

    egui::CollapsingHeader::new(RichText::new("Settings").strong())
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            egui::Grid::new("settings_grid").num_columns(2).show(ui, |ui: &mut Ui| {
                ui.label("Elevation");
                changed |= ui
                    .add(egui::DragValue::new(&mut opts.elevation).range(-90.0..=90.0).suffix("°"))
                    .changed();
                ui.end_row();

                ui.label("Azimuth");
                changed |= ui
                    .add(egui::DragValue::new(&mut opts.azimuth).range(-180.0..=180.0).suffix("°"))
                    .changed();
                ui.end_row();

                ui.label("Marker size");
                changed |= ui
                    .add(egui::DragValue::new(&mut opts.marker_size).range(1.0..=400.0))
                    .changed();
                ui.end_row();

                ui.label("Colormap");
                egui::ComboBox::from_id_salt("colormap")
                    .selected_text(format!("{:?}", opts.colormap))
                    .show_ui(ui, |ui: &mut Ui| {
                        for kind in [ColorMapKind::Turbo, ColorMapKind::Hsl] {
                            changed |= ui
                                .selectable_value(&mut opts.colormap, kind, format!("{kind:?}"))
                                .changed();
                        }
                    });
                ui.end_row();
            });
            changed |= ui.checkbox(&mut opts.colorbar, "Colour bar").changed();
        });

    if changed {
        state.replot();
    }
}

// ---------------------------------------------------------------------------
// Right side panel – chemistry tables
// ---------------------------------------------------------------------------

/// Render the composition table and the fit summary.
pub fn chemistry_panel(ui: &mut Ui, state: &AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Compositions (wt%)");
            ui.separator();
            match &state.composition_table {
                Some(table) => frame_table(ui, "composition_table", table),
                None => {
                    ui.label("No compositions.");
                }
            }

            ui.add_space(12.0);
            ui.heading("Mineral fit");
            ui.separator();
            match &state.fit_summary {
                Some(summary) => {
                    frame_table(ui, "fit_comparison", &summary.comparison);
                    ui.add_space(6.0);
                    frame_table(ui, "fit_minerals", &summary.minerals);
                }
                None => {
                    ui.label("No fit.");
                }
            }

            if let Some(elemental) = &state.elemental {
                ui.add_space(12.0);
                ui.label(format!(
                    "Elemental dataset: {} rows × {} columns",
                    elemental.len(),
                    elemental.ncols()
                ));
            }
        });
}

/// A data frame as a striped table, index first.
fn frame_table(ui: &mut Ui, id: &str, frame: &DataFrame) {
    let columns = frame.column_names();
    ui.push_id(id, |ui: &mut Ui| {
        ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .column(Column::auto().at_least(80.0))
                .columns(Column::auto().at_least(56.0), columns.len())
                .header(20.0, |mut header| {
                    header.col(|ui| {
                        ui.strong(frame.index_name().unwrap_or(""));
                    });
                    for name in columns {
                        header.col(|ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|mut body| {
                    for (row, label) in frame.index().iter().enumerate() {
                        body.row(18.0, |mut cells| {
                            cells.col(|ui| {
                                ui.label(label);
                            });
                            for name in columns {
                                cells.col(|ui| {
                                    let text = frame
                                        .value(row, name)
                                        .map(|v| v.to_string())
                                        .unwrap_or_default();
                                    ui.label(text);
                                });
                            }
                        });
                    }
                });
        });
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("View", |ui: &mut Ui| {
            if ui.button("Reset camera").clicked() {
                if let Some(viz) = state.visualizer.as_mut() {
                    let defaults = demin::viz::VisualizerOptions::default();
                    let opts = viz.options_mut();
                    opts.elevation = defaults.elevation;
                    opts.azimuth = defaults.azimuth;
                }
                state.replot();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(viz) = &state.visualizer {
            let shown = state.figure.as_ref().map_or(viz.data().len(), |f| f.point_count());
            ui.label(format!(
                "{} samples, {} shown",
                viz.data().len(),
                shown
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}
