/// Data layer: core types, parsing, and row filtering.
///
/// Architecture:
/// ```text
///  CSV reader / JSON records / Arrow batch
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse → DataFrame
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ DataFrame │  named columns of Value cells + row index
///   └───────────┘
///        │
///        ├──▶ filter   drop-NA rows, group rows by value
///        └──▶ export   Arrow batch, pretty-printed table
/// ```
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod synthetic;

pub use model::{DataFrame, Value};
