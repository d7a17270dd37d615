use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DeminApp {
    pub state: AppState,
}

impl DeminApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for DeminApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: plot settings ----
        egui::SidePanel::left("plot_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Right side panel: compositions and fit ----
        egui::SidePanel::right("chemistry_panel")
            .default_width(360.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::chemistry_panel(ui, &self.state);
            });

        // ---- Central panel: figure ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::central_plot(ui, &self.state);
        });
    }
}
