use thiserror::Error;

use crate::fit::solver::SolverError;

/// Errors raised by the data, chemistry, fitting and visualization layers.
#[derive(Debug, Error)]
pub enum DeminError {
    #[error("unknown element symbol: '{0}'")]
    UnknownElement(String),

    #[error("composition '{0}' has no mass")]
    EmptyComposition(String),

    #[error("column '{0}' not found")]
    MissingColumn(String),

    #[error("column '{column}' row {row}: '{value}' is not numeric")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },

    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("no weights available, call solve() first")]
    NotSolved,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error("CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Arrow: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

pub type Result<T> = std::result::Result<T, DeminError>;
