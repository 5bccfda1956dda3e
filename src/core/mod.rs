//! Core value types shared across the crate.

mod types;

pub use types::{Bounds, Estimate, Point2D, Velocity2D};
