//! Scatter figures of spatially located samples.
//!
//! ```text
//!  DataFrame ──▶ Visualizer ──plot()───▶ Figure (3-D axes, legend, colour bar)
//!                          └─expand()─▶ ProjectionFigure (1×3 panels)
//! ```
//!
//! Figures are plain values; `view::Projector` turns 3-D axes into 2-D
//! coordinates for the plotting backend.

pub mod figure;
pub mod view;
mod visualizer;

pub use figure::{Figure, ProjectionFigure};
pub use view::Projector;
pub use visualizer::{VariableKind, Visualizer, VisualizerOptions};
