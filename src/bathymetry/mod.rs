//! Bathymetric depth field with bilinear interpolation.
//!
//! Turns a sparse depth grid (two coordinate axes plus a depth sample at
//! every axis crossing) into a continuous measurement function over the
//! map's extent. Depths follow the crate-wide sign convention: negative
//! underwater, 0 at the surface.
//!
//! Interpolation is a hard-boundary operation. A query outside the grid
//! extent is an error, never a clamp or an extrapolation: a silently
//! clamped depth would corrupt the likelihood computation downstream.

use thiserror::Error;

use crate::core::{Bounds, Point2D};

/// Errors from depth field construction and lookup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    /// Axis lengths do not match the depth grid shape.
    #[error("depth grid shape mismatch: {x_len}x{y_len} axes vs {cells} depth values")]
    ShapeMismatch {
        /// X axis length
        x_len: usize,
        /// Y axis length
        y_len: usize,
        /// Number of depth values supplied
        cells: usize,
    },

    /// A coordinate axis is not strictly increasing or has fewer than two entries.
    #[error("coordinate axes must be strictly increasing with at least two entries")]
    NonMonotonicAxis,

    /// The query point lies outside the grid extent.
    #[error("query point ({x}, {y}) lies outside the grid extent")]
    OutOfBounds {
        /// Query x
        x: f32,
        /// Query y
        y: f32,
    },

    /// The four enclosing grid points do not form an axis-aligned rectangle.
    ///
    /// Cannot occur for a grid that passed construction validation, but the
    /// interpolation checks it anyway.
    #[error("enclosing grid points do not form an axis-aligned rectangle")]
    DegenerateRectangle,
}

/// A known depth map over a rectangular domain.
///
/// Depth values are stored row-major with x as the slow index:
/// `depths[ix * y_len + iy]` is the depth at `(x_axis[ix], y_axis[iy])`.
/// Immutable after construction; the estimators borrow it.
#[derive(Debug, Clone)]
pub struct BathymetricGrid {
    x_axis: Vec<f32>,
    y_axis: Vec<f32>,
    depths: Vec<f32>,
}

impl BathymetricGrid {
    /// Build a depth field from its axes and depth samples.
    ///
    /// Fails fast on non-monotonic axes or a shape mismatch; these are
    /// configuration errors and are never silently corrected.
    pub fn new(x_axis: Vec<f32>, y_axis: Vec<f32>, depths: Vec<f32>) -> Result<Self, GridError> {
        if !is_strictly_increasing(&x_axis) || !is_strictly_increasing(&y_axis) {
            return Err(GridError::NonMonotonicAxis);
        }
        if depths.len() != x_axis.len() * y_axis.len() {
            return Err(GridError::ShapeMismatch {
                x_len: x_axis.len(),
                y_len: y_axis.len(),
                cells: depths.len(),
            });
        }
        Ok(Self {
            x_axis,
            y_axis,
            depths,
        })
    }

    /// X axis sample coordinates.
    pub fn x_axis(&self) -> &[f32] {
        &self.x_axis
    }

    /// Y axis sample coordinates.
    pub fn y_axis(&self) -> &[f32] {
        &self.y_axis
    }

    /// Grid dimensions as (x_len, y_len).
    pub fn dimensions(&self) -> (usize, usize) {
        (self.x_axis.len(), self.y_axis.len())
    }

    /// Total number of grid nodes.
    pub fn cell_count(&self) -> usize {
        self.depths.len()
    }

    /// Depth sample at a grid node.
    #[inline]
    pub fn depth(&self, ix: usize, iy: usize) -> f32 {
        self.depths[ix * self.y_axis.len() + iy]
    }

    /// World position of a grid node.
    #[inline]
    pub fn node_position(&self, ix: usize, iy: usize) -> Point2D {
        Point2D::new(self.x_axis[ix], self.y_axis[iy])
    }

    /// The rectangular extent covered by the grid.
    pub fn bounds(&self) -> Bounds {
        Bounds::new(
            Point2D::new(self.x_axis[0], self.y_axis[0]),
            Point2D::new(
                self.x_axis[self.x_axis.len() - 1],
                self.y_axis[self.y_axis.len() - 1],
            ),
        )
    }

    /// Interpolated depth at a continuous position.
    ///
    /// Locates the enclosing grid cell by binary search on each axis, then
    /// applies the four-corner bilinear formula, area-weighted by the cell
    /// rectangle. Queries on grid nodes return the stored sample exactly.
    ///
    /// Fails with [`GridError::OutOfBounds`] outside the grid extent and
    /// [`GridError::DegenerateRectangle`] if the enclosing cell has no area.
    pub fn depth_at(&self, x: f32, y: f32) -> Result<f32, GridError> {
        let ix = lower_cell(&self.x_axis, x).ok_or(GridError::OutOfBounds { x, y })?;
        let iy = lower_cell(&self.y_axis, y).ok_or(GridError::OutOfBounds { x, y })?;

        let (x1, x2) = (self.x_axis[ix], self.x_axis[ix + 1]);
        let (y1, y2) = (self.y_axis[iy], self.y_axis[iy + 1]);

        let area = (x2 - x1) * (y2 - y1);
        if area <= 0.0 {
            return Err(GridError::DegenerateRectangle);
        }

        let q11 = self.depth(ix, iy);
        let q21 = self.depth(ix + 1, iy);
        let q12 = self.depth(ix, iy + 1);
        let q22 = self.depth(ix + 1, iy + 1);

        Ok((q11 * (x2 - x) * (y2 - y)
            + q21 * (x - x1) * (y2 - y)
            + q12 * (x2 - x) * (y - y1)
            + q22 * (x - x1) * (y - y1))
            / area)
    }
}

fn is_strictly_increasing(axis: &[f32]) -> bool {
    axis.len() >= 2 && axis.windows(2).all(|w| w[0] < w[1])
}

/// Index of the cell `[axis[i], axis[i+1]]` containing `v`.
///
/// A query equal to the last axis value maps into the last cell, so the
/// upper extent edge is inside the domain.
fn lower_cell(axis: &[f32], v: f32) -> Option<usize> {
    if v.is_nan() || v < axis[0] || v > axis[axis.len() - 1] {
        return None;
    }
    let i = axis.partition_point(|&a| a <= v);
    Some((i - 1).min(axis.len() - 2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn corner_grid() -> BathymetricGrid {
        // Corners (10,4)=100, (20,4)=200, (10,6)=150, (20,6)=300
        BathymetricGrid::new(
            vec![10.0, 20.0],
            vec![4.0, 6.0],
            vec![100.0, 150.0, 200.0, 300.0],
        )
        .unwrap()
    }

    #[test]
    fn test_interpolation_example() {
        let grid = corner_grid();
        assert_relative_eq!(grid.depth_at(12.0, 5.5).unwrap(), 165.0);
    }

    #[test]
    fn test_corners_exact() {
        let grid = corner_grid();
        assert_eq!(grid.depth_at(10.0, 4.0).unwrap(), 100.0);
        assert_eq!(grid.depth_at(20.0, 4.0).unwrap(), 200.0);
        assert_eq!(grid.depth_at(10.0, 6.0).unwrap(), 150.0);
        assert_eq!(grid.depth_at(20.0, 6.0).unwrap(), 300.0);
    }

    #[test]
    fn test_out_of_bounds_never_extrapolates() {
        let grid = corner_grid();
        for (x, y) in [(9.9, 5.0), (20.1, 5.0), (15.0, 3.9), (15.0, 6.1)] {
            assert!(matches!(
                grid.depth_at(x, y),
                Err(GridError::OutOfBounds { .. })
            ));
        }
    }

    #[test]
    fn test_nan_query_is_out_of_bounds() {
        let grid = corner_grid();
        assert!(grid.depth_at(f32::NAN, 5.0).is_err());
    }

    #[test]
    fn test_upper_edge_inside_domain() {
        let grid = BathymetricGrid::new(
            vec![0.0, 1.0, 2.0],
            vec![0.0, 1.0, 2.0],
            vec![-1.0; 9],
        )
        .unwrap();
        // The far corner is part of the domain, served by the last cell.
        assert_relative_eq!(grid.depth_at(2.0, 2.0).unwrap(), -1.0);
    }

    #[test]
    fn test_non_monotonic_axis_rejected() {
        let result = BathymetricGrid::new(
            vec![0.0, 2.0, 1.0],
            vec![0.0, 1.0],
            vec![-1.0; 6],
        );
        assert_eq!(result.unwrap_err(), GridError::NonMonotonicAxis);

        // Single-entry axes have no interpolation cell.
        let result = BathymetricGrid::new(vec![0.0], vec![0.0, 1.0], vec![-1.0; 2]);
        assert_eq!(result.unwrap_err(), GridError::NonMonotonicAxis);
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let result = BathymetricGrid::new(vec![0.0, 1.0], vec![0.0, 1.0], vec![-1.0; 5]);
        assert_eq!(
            result.unwrap_err(),
            GridError::ShapeMismatch {
                x_len: 2,
                y_len: 2,
                cells: 5
            }
        );
    }

    #[test]
    fn test_bounds_match_extent() {
        let grid = corner_grid();
        let bounds = grid.bounds();
        assert_eq!(bounds.min, Point2D::new(10.0, 4.0));
        assert_eq!(bounds.max, Point2D::new(20.0, 6.0));
    }

    #[test]
    fn test_interpolation_between_nodes_is_linear() {
        let grid = BathymetricGrid::new(
            vec![0.0, 10.0],
            vec![0.0, 10.0],
            vec![0.0, 0.0, -10.0, -10.0],
        )
        .unwrap();
        // Depth varies linearly in x only.
        assert_relative_eq!(grid.depth_at(5.0, 3.0).unwrap(), -5.0);
        assert_relative_eq!(grid.depth_at(2.5, 9.0).unwrap(), -2.5);
    }
}
