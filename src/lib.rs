//! Exploratory tools for geochemical assay data.
//!
//! - [`viz`]: 3-D scatter figures of drill-hole samples coloured by a
//!   categorical or continuous variable, plus 2-D projections.
//! - [`fit`]: non-negative mineral proportions reproducing an elemental
//!   assay, by box-constrained least squares.
//! - [`chem`]: elemental mass percentages of mineral formulas and the
//!   decomposition of bulk mineral columns into element columns.
//!
//! Example:
//! ```rust,no_run
//! use demin::chem::{calculate_compositions, compositions_from_json};
//!
//! let compositions = compositions_from_json(r#"{"Quartz": {"Si": 1, "O": 2}}"#)?;
//! let table = calculate_compositions(&compositions)?;
//! println!("{table}");
//! # Ok::<(), demin::DeminError>(())
//! ```

pub mod chem;
pub mod color;
pub mod data;
pub mod error;
pub mod fit;
pub mod viz;

pub use error::{DeminError, Result};
