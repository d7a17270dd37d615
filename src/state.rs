use std::collections::BTreeMap;

use anyhow::{Context, Result};

use demin::chem::{calculate_compositions, fragmentate, Compositions};
use demin::data::synthetic::mixture_assay;
use demin::data::DataFrame;
use demin::fit::{Bounds, CompositionFitter, FitSummary};
use demin::viz::{Figure, ProjectionFigure, VariableKind, Visualizer};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Scatter3d,
    Projections,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Visualizer over the loaded dataset (None until a dataset is set).
    pub visualizer: Option<Visualizer>,

    /// Columns offered for colouring (everything but the spatial ones).
    pub columns: Vec<String>,

    /// Which column is used for colouring.
    pub variable: Option<String>,

    /// How the colouring column is interpreted; None means plain scatter.
    pub kind: Option<VariableKind>,

    pub view_mode: ViewMode,

    /// Figures rebuilt whenever a setting changes.
    pub figure: Option<Figure>,
    pub projections: Option<ProjectionFigure>,

    /// Mineral formulas and their elemental percentage table.
    pub compositions: Compositions,
    pub composition_table: Option<DataFrame>,

    /// Dataset with the bulk mineral columns split into elements.
    pub elemental: Option<DataFrame>,

    /// Mineral proportions fitted to the first sample's assay.
    pub fit_summary: Option<FitSummary>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            visualizer: None,
            columns: Vec::new(),
            variable: None,
            kind: None,
            view_mode: ViewMode::Scatter3d,
            figure: None,
            projections: None,
            compositions: Compositions::new(),
            composition_table: None,
            elemental: None,
            fit_summary: None,
            status_message: None,
        }
    }
}

impl AppState {
    fn report<T>(&mut self, result: Result<T>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                log::error!("{e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
                None
            }
        }
    }

    /// Ingest a dataset, pick a default colouring column and plot it.
    pub fn set_dataset(&mut self, dataset: &DataFrame, subset: [&str; 3]) {
        let visualizer = Visualizer::with_defaults(dataset, subset)
            .with_context(|| format!("building visualizer over {subset:?}"));
        let Some(visualizer) = self.report(visualizer) else {
            return;
        };

        log::info!(
            "dataset: {} rows, {} usable after dropping incomplete coordinates",
            dataset.len(),
            visualizer.data().len()
        );
        self.columns = dataset
            .column_names()
            .iter()
            .filter(|c| !subset.contains(&c.as_str()))
            .cloned()
            .collect();
        self.visualizer = Some(visualizer);
        self.status_message = None;

        let default = self
            .columns
            .iter()
            .find(|c| c.as_str() == "Lithology")
            .or_else(|| self.columns.first())
            .cloned();
        match default {
            Some(col) => self.set_variable(col),
            None => self.replot(),
        }
    }

    /// Colour by `column`, guessing discrete vs continuous from its cells.
    pub fn set_variable(&mut self, column: String) {
        let numeric = self
            .visualizer
            .as_ref()
            .and_then(|v| v.data().is_numeric_column(&column).ok())
            .unwrap_or(false);
        self.kind = Some(if numeric {
            VariableKind::Continuous
        } else {
            VariableKind::Discrete
        });
        self.variable = Some(column);
        self.replot();
    }

    pub fn set_kind(&mut self, kind: Option<VariableKind>) {
        self.kind = kind;
        self.replot();
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
        self.replot();
    }

    /// Rebuild the figure for the current settings.
    pub fn replot(&mut self) {
        self.figure = None;
        self.projections = None;
        let Some(viz) = &self.visualizer else {
            return;
        };

        let result = match (self.view_mode, self.variable.as_deref()) {
            (ViewMode::Projections, Some(hue)) => viz
                .expand(hue)
                .map(|fig| (None, Some(fig)))
                .with_context(|| format!("projecting by '{hue}'")),
            _ => viz
                .plot(self.variable.as_deref(), self.kind)
                .map(|fig| (Some(fig), None))
                .context("building 3-D figure"),
        };
        if let Some((figure, projections)) = self.report(result) {
            self.figure = figure;
            self.projections = projections;
            self.status_message = None;
        }
    }

    /// Tabulate the formulas, split the dataset's bulk mineral columns into
    /// elements, and fit the first sample's assay back to mineral proportions.
    pub fn set_compositions(&mut self, compositions: Compositions, dataset: &DataFrame) {
        self.compositions = compositions;

        let table = calculate_compositions(&self.compositions).context("tabulating compositions");
        self.composition_table = self.report(table);

        let present: Compositions = self
            .compositions
            .iter()
            .filter(|(name, _)| dataset.has_column(name))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let elemental = fragmentate(dataset, &present).context("splitting bulk mineral columns");
        self.elemental = self.report(elemental);

        let summary = fit_first_sample(&self.compositions, &present, dataset);
        self.fit_summary = self.report(summary);
    }
}

/// Fit all catalogue minerals to the elemental assay of sample 0, whose true
/// make-up is given by its bulk mineral columns.
fn fit_first_sample(
    catalog: &Compositions,
    present: &Compositions,
    dataset: &DataFrame,
) -> Result<FitSummary> {
    let mut proportions = BTreeMap::new();
    for name in present.keys() {
        let value = dataset.value(0, name)?.as_f64().unwrap_or(0.0);
        proportions.insert(name.clone(), value / 100.0);
    }

    let (x, y) = mixture_assay(catalog, &proportions, 0.002, 7).context("building assay")?;
    let mut fitter = CompositionFitter::new(&x, &y)?;
    fitter.solve(Bounds::default(), true).context("fitting mineral proportions")?;
    let summary = fitter.summary()?;
    log::info!("fit summary:\n{summary}");
    Ok(summary)
}
