//! Sequential Monte Carlo position estimator.
//!
//! Maintains a cloud of hypothesized positions. Each step every particle is
//! propagated through the motion model, weighted by the depth-interval
//! likelihood at its new position, and the cloud is resampled with
//! replacement in proportion to the weights (multinomial resampling).
//!
//! The only expected runtime degeneracy is the all-zero-weight step: no
//! particle's predicted depth falls inside the admissible interval. The
//! filter recovers by resetting to uniform weights and records the event in
//! its diagnostics state rather than failing.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::bathymetry::BathymetricGrid;
use crate::core::{Bounds, Estimate, Point2D, Velocity2D};

use super::depth_model::DepthInterval;
use super::motion_model::{MotionModel, MotionModelConfig};
use super::{
    validate_dt, validate_observation, validate_uncertainty, ConfigError, FilterError, Localizer,
};

/// A single particle: a hypothesized position with an importance weight.
///
/// The weight is transient per-step state, not part of the particle's
/// identity; resampling discards it.
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    /// Hypothesized vehicle position.
    pub position: Point2D,
    /// Importance weight (normalized after the weighting pass).
    pub weight: f64,
}

impl Particle {
    /// Create a particle with placeholder unit weight.
    pub fn new(position: Point2D) -> Self {
        Self {
            position,
            weight: 1.0,
        }
    }
}

/// Configuration for the particle filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticleFilterConfig {
    /// Number of particles. Fixed for the filter's lifetime.
    #[serde(default = "default_num_particles")]
    pub num_particles: usize,

    /// Fractional depth measurement uncertainty, in (0, 1).
    /// Typical: 0.1-0.2 for a single-beam echo sounder.
    #[serde(default = "default_uncertainty")]
    pub uncertainty: f32,

    /// Motion model configuration.
    #[serde(default)]
    pub motion: MotionModelConfig,

    /// Random seed for deterministic behavior (0 for entropy).
    #[serde(default)]
    pub seed: u64,
}

fn default_num_particles() -> usize {
    1000
}

fn default_uncertainty() -> f32 {
    0.15
}

impl Default for ParticleFilterConfig {
    fn default() -> Self {
        Self {
            num_particles: default_num_particles(),
            uncertainty: default_uncertainty(),
            motion: MotionModelConfig::default(),
            seed: 0,
        }
    }
}

impl ParticleFilterConfig {
    /// Configuration for global localization over a large map.
    pub fn global_localization() -> Self {
        Self {
            num_particles: 10_000,
            ..Default::default()
        }
    }

    /// Configuration for tracking a roughly known position.
    pub fn tracking() -> Self {
        Self {
            num_particles: 500,
            motion: MotionModelConfig::low_noise(),
            ..Default::default()
        }
    }
}

/// Diagnostics state of the particle filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParticleFilterState {
    /// Total steps processed.
    pub steps: u64,
    /// Steps where no particle matched the observation.
    pub degenerate_steps: u64,
    /// Whether the most recent step was degenerate.
    pub last_degenerate: bool,
}

/// Monte Carlo depth localizer.
#[derive(Debug)]
pub struct ParticleFilter {
    config: ParticleFilterConfig,
    particles: Vec<Particle>,
    motion_model: MotionModel,
    bounds: Bounds,
    rng: SmallRng,
    state: ParticleFilterState,
}

impl ParticleFilter {
    /// Create a filter with particles drawn uniformly inside `bounds`.
    ///
    /// `bounds` should be the depth field's extent
    /// ([`BathymetricGrid::bounds`]); a particle outside the field makes
    /// every subsequent depth lookup fail.
    pub fn new(config: ParticleFilterConfig, bounds: Bounds) -> Result<Self, ConfigError> {
        if config.num_particles == 0 {
            return Err(ConfigError::ZeroParticles);
        }
        validate_uncertainty(config.uncertainty)?;
        let motion_model = MotionModel::new(config.motion)?;

        let mut rng = if config.seed == 0 {
            SmallRng::from_entropy()
        } else {
            SmallRng::seed_from_u64(config.seed)
        };
        let particles = Self::scatter(config.num_particles, bounds, &mut rng);

        Ok(Self {
            config,
            particles,
            motion_model,
            bounds,
            rng,
            state: ParticleFilterState::default(),
        })
    }

    fn scatter(n: usize, bounds: Bounds, rng: &mut SmallRng) -> Vec<Particle> {
        (0..n)
            .map(|_| {
                let x = rng.gen_range(bounds.min.x..=bounds.max.x);
                let y = rng.gen_range(bounds.min.y..=bounds.max.y);
                Particle::new(Point2D::new(x, y))
            })
            .collect()
    }

    /// Get the configuration.
    pub fn config(&self) -> &ParticleFilterConfig {
        &self.config
    }

    /// Current particles (for visualization).
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Current diagnostics state.
    pub fn state(&self) -> &ParticleFilterState {
        &self.state
    }

    /// Number of particles.
    pub fn num_particles(&self) -> usize {
        self.particles.len()
    }

    /// Re-scatter all particles uniformly over the bounds.
    ///
    /// For recovery after sustained localization failure (the kidnapped
    /// vehicle problem).
    pub fn global_reinitialize(&mut self) {
        self.particles = Self::scatter(self.config.num_particles, self.bounds, &mut self.rng);
        self.state = ParticleFilterState::default();
    }

    /// Advance the filter one time step.
    ///
    /// 1. Propagate every particle through the motion model and weight it by
    ///    the admissible-interval likelihood of the field depth at its new
    ///    position.
    /// 2. Normalize weights. A zero weight sum means total localization
    ///    failure for this step; the filter falls back to uniform weights
    ///    and records the degeneracy instead of failing.
    /// 3. Resample the cloud with replacement (multinomial).
    pub fn step(
        &mut self,
        field: &BathymetricGrid,
        observation: f32,
        control: Velocity2D,
        dt: f32,
    ) -> Result<(), FilterError> {
        validate_dt(dt)?;
        validate_observation(observation)?;
        let interval = DepthInterval::new(observation, self.config.uncertainty)?;

        self.state.steps += 1;
        self.state.last_degenerate = false;

        for particle in &mut self.particles {
            let position =
                self.motion_model
                    .sample(particle.position, control, dt, self.bounds, &mut self.rng);
            let depth = field.depth_at(position.x, position.y)?;
            particle.position = position;
            particle.weight = interval.weight(depth);
        }

        if self.normalize() {
            log::warn!(
                "no particle depth inside admissible interval [{}, {}]; resetting to uniform weights",
                interval.low(),
                interval.high()
            );
            self.state.degenerate_steps += 1;
            self.state.last_degenerate = true;
        }

        self.resample();
        Ok(())
    }

    /// Normalize weights to sum 1.
    ///
    /// Returns true for the degenerate all-zero case, where the weights are
    /// reset to the uniform distribution instead.
    fn normalize(&mut self) -> bool {
        let total: f64 = self.particles.iter().map(|p| p.weight).sum();
        if total == 0.0 {
            let uniform = 1.0 / self.particles.len() as f64;
            for particle in &mut self.particles {
                particle.weight = uniform;
            }
            return true;
        }
        for particle in &mut self.particles {
            particle.weight /= total;
        }
        false
    }

    /// Multinomial resampling with replacement.
    ///
    /// Draws n positions from the current cloud with the normalized weights
    /// as selection probabilities. Output particles carry placeholder unit
    /// weight; weights are recomputed next step.
    fn resample(&mut self) {
        let n = self.particles.len();

        let mut cumulative = Vec::with_capacity(n);
        let mut sum = 0.0;
        for p in &self.particles {
            sum += p.weight;
            cumulative.push(sum);
        }

        let mut new_particles = Vec::with_capacity(n);
        for _ in 0..n {
            let r = self.rng.gen::<f64>() * sum;
            let idx = cumulative.partition_point(|&c| c <= r).min(n - 1);
            new_particles.push(Particle::new(self.particles[idx].position));
        }

        self.particles = new_particles;
    }

    /// Current estimate: particle mean plus mean radial distance.
    ///
    /// Particles are unweighted after resampling, so the mean is the plain
    /// average. The spread is the mean Euclidean distance of the particles
    /// from that mean, one radial scalar rather than per-axis deviations.
    pub fn estimate(&self) -> Estimate {
        let n = self.particles.len() as f32;
        let mut mean = Point2D::default();
        for p in &self.particles {
            mean.x += p.position.x;
            mean.y += p.position.y;
        }
        mean.x /= n;
        mean.y /= n;

        let spread = self
            .particles
            .iter()
            .map(|p| p.position.distance(&mean))
            .sum::<f32>()
            / n;

        Estimate::new(mean, spread)
    }
}

impl Localizer for ParticleFilter {
    fn step(
        &mut self,
        field: &BathymetricGrid,
        observation: f32,
        control: Velocity2D,
        dt: f32,
    ) -> Result<(), FilterError> {
        ParticleFilter::step(self, field, observation, control, dt)
    }

    fn estimate(&self, _field: &BathymetricGrid) -> Estimate {
        ParticleFilter::estimate(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn flat_field(depth: f32) -> BathymetricGrid {
        BathymetricGrid::new(
            vec![0.0, 50.0, 100.0],
            vec![0.0, 50.0, 100.0],
            vec![depth; 9],
        )
        .unwrap()
    }

    fn seeded_config(n: usize) -> ParticleFilterConfig {
        ParticleFilterConfig {
            num_particles: n,
            seed: 42,
            ..Default::default()
        }
    }

    #[test]
    fn test_creation_scatters_inside_bounds() {
        let field = flat_field(-10.0);
        let filter = ParticleFilter::new(seeded_config(200), field.bounds()).unwrap();

        assert_eq!(filter.num_particles(), 200);
        for p in filter.particles() {
            assert!(field.bounds().contains(p.position));
        }
    }

    #[test]
    fn test_zero_particles_rejected() {
        let field = flat_field(-10.0);
        let config = ParticleFilterConfig {
            num_particles: 0,
            ..Default::default()
        };
        assert_eq!(
            ParticleFilter::new(config, field.bounds()).unwrap_err(),
            ConfigError::ZeroParticles
        );
    }

    #[test]
    fn test_invalid_dt_rejected() {
        let field = flat_field(-10.0);
        let mut filter = ParticleFilter::new(seeded_config(10), field.bounds()).unwrap();
        for dt in [0.0, -1.0, f32::NAN] {
            assert!(filter.step(&field, -10.0, Velocity2D::zero(), dt).is_err());
        }
    }

    #[test]
    fn test_resampling_preserves_count_and_positions() {
        let field = flat_field(-10.0);
        let mut filter = ParticleFilter::new(seeded_config(300), field.bounds()).unwrap();

        filter.step(&field, -10.0, Velocity2D::zero(), 1.0).unwrap();
        let before: Vec<Point2D> = filter.particles().iter().map(|p| p.position).collect();

        // Resample against a crafted weight vector: only the first three
        // positions carry mass, so only they may survive.
        filter.particles = before.iter().map(|&p| Particle::new(p)).collect();
        let n = filter.particles.len();
        for (i, p) in filter.particles.iter_mut().enumerate() {
            p.weight = if i < 3 { 1.0 / 3.0 } else { 0.0 };
        }
        filter.resample();

        assert_eq!(filter.num_particles(), n);
        let survivors = &before[..3];
        for p in filter.particles() {
            assert!(
                survivors.iter().any(|s| *s == p.position),
                "resampling invented a position: {:?}",
                p.position
            );
        }
    }

    #[test]
    fn test_normalized_weights_sum_to_one() {
        let field = flat_field(-10.0);
        let mut filter = ParticleFilter::new(seeded_config(500), field.bounds()).unwrap();

        for (i, p) in filter.particles.iter_mut().enumerate() {
            p.weight = (i % 7) as f64 + 0.3;
        }
        let degenerate = filter.normalize();

        assert!(!degenerate);
        let total: f64 = filter.particles().iter().map(|p| p.weight).sum();
        assert!((total - 1.0).abs() < 1e-12, "weight sum {}", total);
    }

    #[test]
    fn test_degenerate_normalization_is_exactly_uniform() {
        let field = flat_field(-10.0);
        let mut filter = ParticleFilter::new(seeded_config(250), field.bounds()).unwrap();

        for p in filter.particles.iter_mut() {
            p.weight = 0.0;
        }
        let degenerate = filter.normalize();

        assert!(degenerate);
        for p in filter.particles() {
            assert_eq!(p.weight, 1.0 / 250.0);
        }
    }

    #[test]
    fn test_all_outside_interval_resets_uniform() {
        let field = flat_field(-50.0);
        let mut filter = ParticleFilter::new(seeded_config(100), field.bounds()).unwrap();

        // Observation nowhere near the true constant depth.
        filter.step(&field, -10.0, Velocity2D::zero(), 1.0).unwrap();

        assert!(filter.state().last_degenerate);
        assert_eq!(filter.state().degenerate_steps, 1);
    }

    #[test]
    fn test_estimate_of_known_cloud() {
        let field = flat_field(-10.0);
        let mut filter = ParticleFilter::new(seeded_config(4), field.bounds()).unwrap();
        filter.particles = vec![
            Particle::new(Point2D::new(0.0, 0.0)),
            Particle::new(Point2D::new(10.0, 0.0)),
            Particle::new(Point2D::new(0.0, 10.0)),
            Particle::new(Point2D::new(10.0, 10.0)),
        ];

        let estimate = filter.estimate();
        assert_relative_eq!(estimate.position.x, 5.0);
        assert_relative_eq!(estimate.position.y, 5.0);
        // Every particle sits sqrt(50) from the mean.
        assert_relative_eq!(estimate.spread, 50.0f32.sqrt(), epsilon = 1e-5);
    }

    #[test]
    fn test_seeded_runs_reproduce() {
        let field = flat_field(-10.0);
        let mut a = ParticleFilter::new(seeded_config(200), field.bounds()).unwrap();
        let mut b = ParticleFilter::new(seeded_config(200), field.bounds()).unwrap();

        for _ in 0..5 {
            a.step(&field, -10.0, Velocity2D::new(1.0, 0.5), 1.0).unwrap();
            b.step(&field, -10.0, Velocity2D::new(1.0, 0.5), 1.0).unwrap();
        }

        for (pa, pb) in a.particles().iter().zip(b.particles()) {
            assert_eq!(pa.position, pb.position);
        }
    }

    #[test]
    fn test_global_reinitialize_resets_state() {
        let field = flat_field(-50.0);
        let mut filter = ParticleFilter::new(seeded_config(100), field.bounds()).unwrap();
        filter.step(&field, -10.0, Velocity2D::zero(), 1.0).unwrap();
        assert_eq!(filter.state().degenerate_steps, 1);

        filter.global_reinitialize();
        assert_eq!(filter.state().steps, 0);
        assert_eq!(filter.state().degenerate_steps, 0);
        assert_eq!(filter.num_particles(), 100);
    }

    #[test]
    fn test_config_presets() {
        let global = ParticleFilterConfig::global_localization();
        let tracking = ParticleFilterConfig::tracking();
        assert!(global.num_particles > tracking.num_particles);
    }
}
