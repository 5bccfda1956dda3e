//! Truth-state simulation for tests, benches and the demo driver.
//!
//! Provides a seeded noise generator, a simulated vehicle that random-walks
//! under control input and sounds the depth beneath it, and synthetic map
//! builders. None of this is consumed by the estimators; it exists to
//! exercise them.

pub mod maps;

use rand::prelude::*;
use rand::rngs::SmallRng;
use rand_distr::{Distribution, StandardNormal, Uniform};

use crate::bathymetry::{BathymetricGrid, GridError};
use crate::core::{Bounds, Point2D, Velocity2D};
use crate::localization::{validate_uncertainty, ConfigError};

/// Noise generator with configurable seed for reproducibility.
#[derive(Clone)]
pub struct NoiseGenerator {
    rng: SmallRng,
}

impl NoiseGenerator {
    /// Create a new noise generator.
    ///
    /// If seed is 0, uses random entropy for non-deterministic behavior.
    /// Otherwise, uses the provided seed for reproducible results.
    pub fn new(seed: u64) -> Self {
        let rng = if seed == 0 {
            SmallRng::from_entropy()
        } else {
            SmallRng::seed_from_u64(seed)
        };
        Self { rng }
    }

    /// Generate Gaussian noise with given standard deviation.
    #[inline]
    pub fn gaussian(&mut self, stddev: f32) -> f32 {
        if stddev == 0.0 {
            return 0.0;
        }
        let n: f32 = self.rng.sample(StandardNormal);
        n * stddev
    }

    /// Generate uniform random in [0, 1).
    #[inline]
    pub fn uniform(&mut self) -> f32 {
        Uniform::new(0.0f32, 1.0).sample(&mut self.rng)
    }

    /// Generate uniform random in [-1, 1).
    #[inline]
    pub fn signed_uniform(&mut self) -> f32 {
        2.0 * (self.uniform() - 0.5)
    }
}

/// Configuration for the simulated vehicle.
#[derive(Debug, Clone, Copy)]
pub struct VehicleConfig {
    /// Process noise standard deviation of the true motion (m/√s).
    pub process_sigma: f32,
    /// Relative sounding error bound, in (0, 1). A sounding is the true
    /// depth times a uniform factor in [1 - level, 1 + level).
    pub noise_level: f32,
    /// Random seed (0 for entropy).
    pub seed: u64,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            process_sigma: 1.0,
            noise_level: 0.15,
            seed: 0,
        }
    }
}

/// Simulated vehicle: the hidden true state the estimators try to recover.
pub struct Vehicle {
    position: Point2D,
    config: VehicleConfig,
    noise: NoiseGenerator,
}

impl Vehicle {
    /// Place a vehicle at an initial position.
    pub fn new(initial_position: Point2D, config: VehicleConfig) -> Result<Self, ConfigError> {
        if !(config.process_sigma > 0.0) || !config.process_sigma.is_finite() {
            return Err(ConfigError::NonPositiveSigma(config.process_sigma));
        }
        validate_uncertainty(config.noise_level)?;
        Ok(Self {
            position: initial_position,
            config,
            noise: NoiseGenerator::new(config.seed),
        })
    }

    /// True position (hidden from the estimators).
    pub fn position(&self) -> Point2D {
        self.position
    }

    /// Advance the true state: control plus process noise, clamped.
    ///
    /// Same kinematics as the filters' motion model, so a well-tuned filter
    /// tracks an honestly simulated vehicle.
    pub fn step(&mut self, control: Velocity2D, dt: f32, bounds: Bounds) {
        let scale = self.config.process_sigma * dt.sqrt();
        self.position = bounds.clamp(Point2D::new(
            self.position.x + control.vx * dt + self.noise.gaussian(scale),
            self.position.y + control.vy * dt + self.noise.gaussian(scale),
        ));
    }

    /// Take a noisy depth sounding at the current position.
    ///
    /// The error is relative: true depth scaled by a uniform factor in
    /// `[-noise_level, +noise_level)`, matching the fractional-uncertainty
    /// model the filters assume.
    pub fn sounding(&mut self, field: &BathymetricGrid) -> Result<f32, GridError> {
        let depth = field.depth_at(self.position.x, self.position.y)?;
        Ok(depth + self.config.noise_level * depth * self.noise.signed_uniform())
    }
}
