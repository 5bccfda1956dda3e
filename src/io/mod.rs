//! Visualization output.

pub mod svg;

pub use svg::{SvgColorScheme, SvgConfig, SvgVisualizer};
