//! Synthetic bathymetric maps for tests, benches and demos.
//!
//! Every builder produces an `n x n` grid with uniform node spacing
//! starting at the origin.

use crate::bathymetry::BathymetricGrid;
use crate::core::Point2D;

fn axis(n: usize, spacing: f32) -> Vec<f32> {
    (0..n).map(|i| i as f32 * spacing).collect()
}

/// A basin with the same depth everywhere.
///
/// Depth alone carries no positional information here; useful for testing
/// that likelihood without map structure cannot localize.
pub fn constant_basin(n: usize, spacing: f32, depth: f32) -> BathymetricGrid {
    BathymetricGrid::new(axis(n, spacing), axis(n, spacing), vec![depth; n * n])
        .expect("valid synthetic map")
}

/// A flat bed with a single distinguishing Gaussian trench.
///
/// The trench reaches `trench_depth` at `center` and decays with the given
/// radius (its e^-1/2 width). A sounding taken inside the trench is
/// inconsistent with the surrounding bed, so a filter should concentrate
/// mass there quickly.
pub fn trench_lake(
    n: usize,
    spacing: f32,
    bed_depth: f32,
    trench_depth: f32,
    center: Point2D,
    radius: f32,
) -> BathymetricGrid {
    let xs = axis(n, spacing);
    let ys = axis(n, spacing);
    let mut depths = Vec::with_capacity(n * n);
    for &x in &xs {
        for &y in &ys {
            let d2 = Point2D::new(x, y).distance_squared(&center);
            let dip = (trench_depth - bed_depth) * (-0.5 * d2 / (radius * radius)).exp();
            depths.push(bed_depth + dip);
        }
    }
    BathymetricGrid::new(xs, ys, depths).expect("valid synthetic map")
}

/// A bed sloping linearly from `shallow` at x = 0 to `deep` at the far edge.
///
/// Localizable in x but not in y.
pub fn sloped_bed(n: usize, spacing: f32, shallow: f32, deep: f32) -> BathymetricGrid {
    let xs = axis(n, spacing);
    let ys = axis(n, spacing);
    let extent = (n - 1) as f32 * spacing;
    let mut depths = Vec::with_capacity(n * n);
    for &x in &xs {
        let depth = shallow + (deep - shallow) * (x / extent);
        for _ in &ys {
            depths.push(depth);
        }
    }
    BathymetricGrid::new(xs, ys, depths).expect("valid synthetic map")
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_constant_basin_is_flat() {
        let field = constant_basin(5, 10.0, -12.0);
        assert_eq!(field.dimensions(), (5, 5));
        assert_relative_eq!(field.depth_at(17.3, 31.9).unwrap(), -12.0, epsilon = 1e-5);
    }

    #[test]
    fn test_trench_deepest_at_center() {
        let center = Point2D::new(40.0, 40.0);
        let field = trench_lake(9, 10.0, -5.0, -30.0, center, 8.0);

        let at_center = field.depth_at(center.x, center.y).unwrap();
        let at_edge = field.depth_at(0.0, 0.0).unwrap();
        assert_relative_eq!(at_center, -30.0, epsilon = 0.1);
        assert!(at_edge > -6.0, "bed near edge should stay shallow: {}", at_edge);
    }

    #[test]
    fn test_sloped_bed_gradient() {
        let field = sloped_bed(6, 10.0, -2.0, -22.0);
        assert_relative_eq!(field.depth_at(0.0, 25.0).unwrap(), -2.0, epsilon = 1e-5);
        assert_relative_eq!(field.depth_at(50.0, 25.0).unwrap(), -22.0, epsilon = 1e-5);
        assert_relative_eq!(field.depth_at(25.0, 0.0).unwrap(), -12.0, epsilon = 1e-4);
    }
}
