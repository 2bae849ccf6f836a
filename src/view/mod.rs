//! View math: viewport transforms and the adaptive grid/snap engine.

pub mod coords;
pub mod grid;

pub use coords::{CoordinateSystem, Viewport};
pub use grid::{GridLine, GridLineKind, GridSnap, RulerLabel, SnapMode};
