mod app;
mod state;
mod ui;

use anyhow::Context;
use app::DeminApp;
use demin::data::synthetic::{drillholes, mineral_catalog};
use eframe::egui;
use state::AppState;

const SEED: u64 = 42;
const HOLES: usize = 12;
const SAMPLES_PER_HOLE: usize = 40;
const SPATIAL: [&str; 3] = ["X", "Y", "Z"];

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let dataset = drillholes(SEED, HOLES, SAMPLES_PER_HOLE).context("generating drill holes")?;
    log::info!(
        "Generated {} samples with columns {:?}",
        dataset.len(),
        dataset.column_names()
    );

    let mut state = AppState::default();
    state.set_dataset(&dataset, SPATIAL);
    state.set_compositions(mineral_catalog(), &dataset);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 850.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Demin – Drill Hole Viewer",
        options,
        Box::new(|_cc| Ok(Box::new(DeminApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
