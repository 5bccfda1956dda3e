//! Steering policies: estimated position in, velocity command out.
//!
//! The estimators treat steering as an opaque collaborator; any
//! `policy(position) -> velocity` works. Two simple policies are provided
//! for the demo driver, both aiming at a fixed target (the harbour).

use crate::core::{Point2D, Velocity2D};

/// A steering policy consuming position estimates.
pub trait SteeringPolicy {
    /// Velocity command for the current estimated position.
    fn velocity(&mut self, position: Point2D) -> Velocity2D;
}

/// Steer straight at the target, as if by compass bearing.
#[derive(Debug, Clone)]
pub struct Compass {
    target: Point2D,
}

impl Compass {
    /// Create a compass policy toward a target.
    pub fn new(target: Point2D) -> Self {
        Self { target }
    }
}

impl SteeringPolicy for Compass {
    fn velocity(&mut self, position: Point2D) -> Velocity2D {
        Velocity2D::new(self.target.x - position.x, self.target.y - position.y)
    }
}

/// Steer by correcting the heading of the last observed displacement.
///
/// Rotates the previous displacement by the angle between the current
/// heading and the bearing to the target. Useful when the commanded and
/// realized velocities differ (currents, drift): the correction is applied
/// to what the vehicle actually did, not what it was told.
#[derive(Debug, Clone)]
pub struct HeadingPolicy {
    target: Point2D,
    prev_position: Point2D,
}

impl HeadingPolicy {
    /// Create a heading-correction policy toward a target.
    pub fn new(target: Point2D) -> Self {
        Self {
            target,
            prev_position: Point2D::default(),
        }
    }
}

impl SteeringPolicy for HeadingPolicy {
    fn velocity(&mut self, position: Point2D) -> Velocity2D {
        let dx = position.x - self.prev_position.x;
        let dy = position.y - self.prev_position.y;
        self.prev_position = position;

        // No usable heading yet; fall back to the compass bearing.
        if dx * dx + dy * dy < 1e-12 {
            return Velocity2D::new(self.target.x - position.x, self.target.y - position.y);
        }

        let heading = dy.atan2(dx);
        let bearing = (self.target.y - position.y).atan2(self.target.x - position.x);
        let correction = bearing - heading;

        let (sin, cos) = correction.sin_cos();
        Velocity2D::new(cos * dx - sin * dy, sin * dx + cos * dy)
    }
}

/// Scale a velocity down to a maximum speed.
///
/// Commands at or below the limit pass through unchanged; a zero command
/// stays zero.
pub fn limit_speed(v: Velocity2D, max_speed: f32) -> Velocity2D {
    let magnitude = v.magnitude();
    if magnitude > max_speed && magnitude > 0.0 {
        let scale = max_speed / magnitude;
        Velocity2D::new(v.vx * scale, v.vy * scale)
    } else {
        v
    }
}
