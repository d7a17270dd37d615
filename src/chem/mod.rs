//! Elemental decomposition of mineral formulas.

pub mod composition;
pub mod elements;

pub use composition::{
    calculate_compositions, compositions_from_json, fragmentate, mass_percentage_distribution,
    Composition, Compositions, PercentageDistribution,
};
pub use elements::{atomic_mass, element, Element};
