use std::collections::BTreeSet;
use std::fmt;

use nalgebra::{DMatrix, DVector};

use super::solver::{validate_problem, BoundedLeastSquares, Bounds, ProjectedNewton, SolverOptions, SolverStats};
use crate::data::model::round_to;
use crate::data::DataFrame;
use crate::error::{DeminError, Result};

pub const TRUE_ROW: &str = "FRX_true";
pub const PRED_ROW: &str = "FRX_pred";
pub const PERCENT_ROW: &str = "Predicted(%)";
pub const SUM_COLUMN: &str = "[SUM]";

/// Fits non-negative mineral proportions `w` so that `X w` reproduces an
/// observed elemental assay `y`.
///
/// `X` has one row per measured quantity (typically an element) and one
/// column per candidate mineral.
#[derive(Debug, Clone)]
pub struct CompositionFitter {
    features: Vec<String>,
    samples: Vec<String>,
    x: DMatrix<f64>,
    y: DVector<f64>,
    weights: Option<DVector<f64>>,
    stats: Option<SolverStats>,
}

/// The two tables returned by [`CompositionFitter::summary`].
#[derive(Debug, Clone, PartialEq)]
pub struct FitSummary {
    /// Rows `FRX_true` / `FRX_pred`, one column per sample plus `[SUM]`.
    pub comparison: DataFrame,
    /// Row `Predicted(%)`, one column per mineral plus `[SUM]`.
    pub minerals: DataFrame,
}

impl fmt::Display for FitSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.comparison)?;
        write!(f, "{}", self.minerals)
    }
}

impl CompositionFitter {
    /// Every column of `x` is a feature; its row index labels the samples.
    /// Sample labels become summary columns, so they must be unique.
    pub fn new(x: &DataFrame, y: &[f64]) -> Result<Self> {
        let mut seen = BTreeSet::new();
        if let Some(dup) = x.index().iter().find(|label| !seen.insert(label.as_str())) {
            return Err(DeminError::InvalidInput(format!(
                "sample label '{dup}' appears more than once"
            )));
        }
        let features = x.column_names().to_vec();
        let matrix = x.to_matrix(&features)?;
        let y = DVector::from_column_slice(y);
        validate_problem(&matrix, &y)?;
        Ok(Self {
            features,
            samples: x.index().to_vec(),
            x: matrix,
            y,
            weights: None,
            stats: None,
        })
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// Fitted weights, once [`solve`](Self::solve) has succeeded.
    pub fn weights(&self) -> Option<&DVector<f64>> {
        self.weights.as_ref()
    }

    pub fn stats(&self) -> Option<&SolverStats> {
        self.stats.as_ref()
    }

    /// Fit with the built-in [`ProjectedNewton`] solver.
    pub fn solve(&mut self, bounds: Bounds, verbose: bool) -> Result<&SolverStats> {
        let options = SolverOptions {
            verbose,
            ..SolverOptions::default()
        };
        self.solve_with(&ProjectedNewton, bounds, &options)
    }

    /// Fit with any bounded least-squares solver.  Weights are always kept
    /// non-negative.  On failure the previous weights, if any, are kept.
    pub fn solve_with<S: BoundedLeastSquares + ?Sized>(
        &mut self,
        solver: &S,
        bounds: Bounds,
        options: &SolverOptions,
    ) -> Result<&SolverStats> {
        let bounds = bounds.validate()?.non_negative();
        let solution = solver.solve(&self.x, &self.y, bounds, options)?;
        if solution.weights.len() != self.features.len() {
            return Err(DeminError::DimensionMismatch {
                expected: self.features.len(),
                got: solution.weights.len(),
            });
        }
        log::info!(
            "fitted {} minerals to {} samples: {:?}, cost {:.3e}",
            self.features.len(),
            self.samples.len(),
            solution.stats.status,
            solution.stats.cost
        );
        self.weights = Some(solution.weights);
        Ok(self.stats.insert(solution.stats))
    }

    /// `X · w` for the fitted weights.
    pub fn predict(&self) -> Result<DVector<f64>> {
        let w = self.weights.as_ref().ok_or(DeminError::NotSolved)?;
        Ok(&self.x * w)
    }

    /// True vs predicted values and fitted mineral percentages.
    pub fn summary(&self) -> Result<FitSummary> {
        let w = self.weights.as_ref().ok_or(DeminError::NotSolved)?;
        let predicted = self.predict()?;

        let mut comparison = DataFrame::from_numeric_columns(
            self.samples
                .iter()
                .enumerate()
                .map(|(i, s)| (s.clone(), vec![self.y[i], predicted[i]])),
        )?
        .with_index([TRUE_ROW, PRED_ROW])?
        .round(2);
        let sums = comparison.row_sums().into_iter().map(|s| round_to(s, 2)).collect();
        comparison.insert_numeric_column(SUM_COLUMN, sums)?;

        let mut minerals = DataFrame::from_numeric_columns(
            self.features
                .iter()
                .zip(w.iter())
                .map(|(name, &wj)| (name.clone(), vec![round_to(wj, 3) * 100.0])),
        )?
        .with_index([PERCENT_ROW])?
        .with_index_name("Mineral");
        let sums = minerals.row_sums().into_iter().map(|s| round_to(s, 2)).collect();
        minerals.insert_numeric_column(SUM_COLUMN, sums)?;

        Ok(FitSummary {
            comparison,
            minerals,
        })
    }
}
