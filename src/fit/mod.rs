//! Mineral proportion fitting by box-constrained least squares.

mod fitter;
pub mod solver;

pub use fitter::{CompositionFitter, FitSummary, PERCENT_ROW, PRED_ROW, SUM_COLUMN, TRUE_ROW};
pub use solver::{
    BoundedLeastSquares, Bounds, ProjectedNewton, Solution, SolveStatus, SolverError, SolverOptions,
    SolverStats,
};
