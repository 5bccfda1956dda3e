//! Stochastic motion model for particle propagation.
//!
//! Position advances by the commanded velocity over the time step, plus
//! independent zero-mean Gaussian process noise per axis scaled by the
//! square root of the time step (a discretized random walk). The result is
//! clamped into the map bounds; the vehicle cannot leave the surveyed area.
//!
//! The sample is a pure function of the inputs and the generator state;
//! particles are conditionally independent given the previous resampled
//! cloud, so this is the natural data-parallel point of the filter.

use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::core::{Bounds, Point2D, Velocity2D};
use crate::localization::ConfigError;

/// Configuration for the motion model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MotionModelConfig {
    /// Process noise standard deviation per axis (m/√s).
    ///
    /// Scales with √dt. Typical: 0.5-2.0 for a drifting surface vehicle.
    #[serde(default = "default_process_sigma")]
    pub process_sigma: f32,
}

fn default_process_sigma() -> f32 {
    1.0
}

impl Default for MotionModelConfig {
    fn default() -> Self {
        Self {
            process_sigma: default_process_sigma(),
        }
    }
}

impl MotionModelConfig {
    /// Low-drift configuration (calm water, good dead reckoning).
    pub fn low_noise() -> Self {
        Self { process_sigma: 0.25 }
    }

    /// High-drift configuration (currents, poor dead reckoning).
    pub fn high_noise() -> Self {
        Self { process_sigma: 2.0 }
    }
}

/// Samples new particle positions from control input plus process noise.
#[derive(Debug, Clone)]
pub struct MotionModel {
    config: MotionModelConfig,
}

impl MotionModel {
    /// Create a motion model, validating the noise parameter.
    pub fn new(config: MotionModelConfig) -> Result<Self, ConfigError> {
        if !(config.process_sigma > 0.0) || !config.process_sigma.is_finite() {
            return Err(ConfigError::NonPositiveSigma(config.process_sigma));
        }
        Ok(Self { config })
    }

    /// Get the configuration.
    pub fn config(&self) -> &MotionModelConfig {
        &self.config
    }

    /// Sample a propagated position.
    ///
    /// `position + control*dt + N(0, sigma*sqrt(dt))` per axis, clamped into
    /// `bounds`. Two standard-normal draws are consumed from `rng` per call.
    pub fn sample<R: Rng>(
        &self,
        position: Point2D,
        control: Velocity2D,
        dt: f32,
        bounds: Bounds,
        rng: &mut R,
    ) -> Point2D {
        let scale = self.config.process_sigma * dt.sqrt();
        let nx: f32 = rng.sample(StandardNormal);
        let ny: f32 = rng.sample(StandardNormal);
        bounds.clamp(Point2D::new(
            position.x + control.vx * dt + nx * scale,
            position.y + control.vy * dt + ny * scale,
        ))
    }
}
