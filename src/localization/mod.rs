//! Bayesian position estimators over a bathymetric map.
//!
//! Two interchangeable strategies implement the same contract:
//!
//! - [`ParticleFilter`]: sequential Monte Carlo. Hypothesized positions are
//!   propagated through the [`MotionModel`], weighted by the depth-interval
//!   likelihood and resampled each step.
//! - [`GridBayesFilter`]: dense recursive Bayes. An explicit probability
//!   mass function over all map cells is diffused (the grid analogue of the
//!   motion model) and reweighted by a binary admissibility mask.
//!
//! Both consume one scalar depth observation per time step and expose a
//! position [`Estimate`](crate::core::Estimate) with a radial spread. The
//! [`Localizer`] trait lets a driver swap strategies without special-casing.
//!
//! # Example
//!
//! ```rust,ignore
//! use bathynav::{GridBayesConfig, GridBayesFilter, Localizer};
//!
//! let mut filter = GridBayesFilter::new(GridBayesConfig::default(), &field)?;
//! filter.step(&field, sounding, control, dt)?;
//! let estimate = filter.estimate(&field);
//! ```

mod depth_model;
mod grid_bayes;
mod motion_model;
mod particle_filter;

use thiserror::Error;

use crate::bathymetry::{BathymetricGrid, GridError};
use crate::core::{Estimate, Velocity2D};

pub use depth_model::DepthInterval;
pub use grid_bayes::{GridBayesConfig, GridBayesFilter, GridBayesState};
pub use motion_model::{MotionModel, MotionModelConfig};
pub use particle_filter::{Particle, ParticleFilter, ParticleFilterConfig, ParticleFilterState};

/// Invalid filter parameters.
///
/// These are programmer errors: they fail fast at construction or step
/// entry and are never silently corrected.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    /// Particle count of zero.
    #[error("particle count must be at least 1")]
    ZeroParticles,

    /// Fractional measurement uncertainty outside (0, 1).
    #[error("measurement uncertainty must lie in (0, 1), got {0}")]
    UncertaintyOutOfRange(f32),

    /// Non-positive process noise.
    #[error("process sigma must be positive, got {0}")]
    NonPositiveSigma(f32),

    /// Non-positive time step.
    #[error("time step must be positive, got {0}")]
    NonPositiveDt(f32),

    /// Diffusion coefficient violating the forward-Euler stability bound.
    #[error("diffusion step unstable: sigma^2/2 = {0} exceeds 0.25 (cell units)")]
    UnstableDiffusion(f32),

    /// Observation that is NaN or infinite.
    #[error("observation must be finite, got {0}")]
    NonFiniteObservation(f32),
}

/// Runtime filter failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    /// No grid cell is consistent with the observation.
    ///
    /// The posterior is left in its post-diffusion state; the caller decides
    /// the fallback policy (e.g. skip the update and keep diffusing).
    #[error("no grid cell is consistent with the observation")]
    DegenerateEvidence,

    /// Depth lookup failure.
    #[error(transparent)]
    Grid(#[from] GridError),

    /// Invalid parameter at step entry.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Common contract of the two estimators.
///
/// `step` advances the filter by one time step given a noisy depth
/// observation; `estimate` reads back the current position and spread.
/// The grid filter encodes motion uncertainty as diffusion and ignores the
/// control input; the particle filter ignores the field argument of
/// `estimate`. A driver holding a `Box<dyn Localizer>` can swap strategies
/// freely.
pub trait Localizer {
    /// Advance the filter one time step.
    fn step(
        &mut self,
        field: &BathymetricGrid,
        observation: f32,
        control: Velocity2D,
        dt: f32,
    ) -> Result<(), FilterError>;

    /// Current position estimate with radial spread.
    fn estimate(&self, field: &BathymetricGrid) -> Estimate;
}

pub(crate) fn validate_uncertainty(uncertainty: f32) -> Result<(), ConfigError> {
    if uncertainty > 0.0 && uncertainty < 1.0 {
        Ok(())
    } else {
        Err(ConfigError::UncertaintyOutOfRange(uncertainty))
    }
}

pub(crate) fn validate_dt(dt: f32) -> Result<(), ConfigError> {
    if dt > 0.0 && dt.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositiveDt(dt))
    }
}

pub(crate) fn validate_observation(observation: f32) -> Result<(), ConfigError> {
    if observation.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFiniteObservation(observation))
    }
}
