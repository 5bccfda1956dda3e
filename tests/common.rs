//! Shared fixtures for the localization integration tests.

#![allow(dead_code)]

use bathynav::sim::maps;
use bathynav::{BathymetricGrid, Point2D};

/// A 2x2 grid with constant depth -10: depth carries no position information.
pub fn uniform_lake() -> BathymetricGrid {
    BathymetricGrid::new(
        vec![0.0, 100.0],
        vec![0.0, 100.0],
        vec![-10.0; 4],
    )
    .unwrap()
}

/// Center of the trench in [`trench_lake`]. Deliberately off-center so a
/// uniform particle cloud's mean starts well away from it.
pub const TRENCH_CENTER: Point2D = Point2D { x: 85.0, y: 35.0 };

/// A shallow lake with one deep trench as the only distinguishing feature.
pub fn trench_lake() -> BathymetricGrid {
    maps::trench_lake(25, 5.0, -5.0, -40.0, TRENCH_CENTER, 10.0)
}

/// A sounding that is only consistent with the inside of the trench.
pub const TRENCH_SOUNDING: f32 = -38.0;
