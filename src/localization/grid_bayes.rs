//! Dense recursive Bayes estimator over the map grid.
//!
//! Instead of sampling hypotheses, this filter carries an explicit
//! probability mass function with one entry per map node. Each step:
//!
//! 1. **Diffuse**: one forward-Euler step of the 2-D heat equation
//!    (`P += sigma^2/2 * laplacian(P)`, 5-point stencil) grows positional
//!    uncertainty, the grid analogue of per-particle motion noise.
//! 2. **Reweight**: multiply elementwise by the binary depth-admissibility
//!    mask for the observation and renormalize.
//!
//! The Laplacian uses a reflective (zero-flux) boundary at the grid edges:
//! no mass crosses the edge, so the "posterior sums to 1" invariant holds
//! over arbitrarily long runs near the map boundary.

use serde::{Deserialize, Serialize};

use crate::bathymetry::{BathymetricGrid, GridError};
use crate::core::{Estimate, Point2D, Velocity2D};

use super::depth_model::DepthInterval;
use super::{validate_dt, validate_observation, ConfigError, FilterError, Localizer};

/// Configuration for the grid Bayes filter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GridBayesConfig {
    /// Diffusion noise standard deviation per step, in cell units.
    ///
    /// The diffusion coefficient is `sigma^2 / 2`, which must not exceed
    /// 0.25 for the explicit Euler step to be stable. Typical: 0.3-0.7.
    #[serde(default = "default_sigma")]
    pub process_sigma: f32,

    /// Fractional depth measurement uncertainty, in (0, 1).
    #[serde(default = "default_uncertainty")]
    pub uncertainty: f32,
}

fn default_sigma() -> f32 {
    0.5
}

fn default_uncertainty() -> f32 {
    0.15
}

impl Default for GridBayesConfig {
    fn default() -> Self {
        Self {
            process_sigma: default_sigma(),
            uncertainty: default_uncertainty(),
        }
    }
}

/// Diagnostics state of the grid filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct GridBayesState {
    /// Total steps processed.
    pub steps: u64,
    /// Steps whose reweighting found no consistent cell.
    pub degenerate_steps: u64,
}

/// Grid-based recursive Bayes depth localizer.
///
/// Owns the posterior exclusively; nothing else mutates it between steps.
#[derive(Debug, Clone)]
pub struct GridBayesFilter {
    config: GridBayesConfig,
    nx: usize,
    ny: usize,
    posterior: Vec<f64>,
    scratch: Vec<f64>,
    state: GridBayesState,
}

impl GridBayesFilter {
    /// Create a filter with uniform posterior over the field's grid.
    pub fn new(config: GridBayesConfig, field: &BathymetricGrid) -> Result<Self, ConfigError> {
        if !(config.process_sigma > 0.0) || !config.process_sigma.is_finite() {
            return Err(ConfigError::NonPositiveSigma(config.process_sigma));
        }
        let coefficient = 0.5 * config.process_sigma * config.process_sigma;
        if coefficient > 0.25 {
            return Err(ConfigError::UnstableDiffusion(coefficient));
        }
        super::validate_uncertainty(config.uncertainty)?;

        let (nx, ny) = field.dimensions();
        let cells = nx * ny;
        Ok(Self {
            config,
            nx,
            ny,
            posterior: vec![1.0 / cells as f64; cells],
            scratch: vec![0.0; cells],
            state: GridBayesState::default(),
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &GridBayesConfig {
        &self.config
    }

    /// Posterior mass, flat row-major (`ix * ny + iy`).
    pub fn posterior(&self) -> &[f64] {
        &self.posterior
    }

    /// Posterior dimensions as (x_len, y_len).
    pub fn dimensions(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    /// Current diagnostics state.
    pub fn state(&self) -> &GridBayesState {
        &self.state
    }

    /// Grid indices of the maximum-a-posteriori cell.
    pub fn map_cell(&self) -> (usize, usize) {
        let mut best = 0;
        for (i, &mass) in self.posterior.iter().enumerate() {
            if mass > self.posterior[best] {
                best = i;
            }
        }
        (best / self.ny, best % self.ny)
    }

    /// One explicit diffusion step (Kolmogorov forward equation).
    ///
    /// `P += sigma^2/2 * laplacian(P)` with the 5-point stencil and a
    /// reflective boundary: a missing neighbor mirrors the center cell and
    /// contributes nothing, so no mass crosses the grid edge.
    pub fn diffuse(&mut self) {
        let k = 0.5 * (self.config.process_sigma as f64) * (self.config.process_sigma as f64);
        let (nx, ny) = (self.nx, self.ny);

        for ix in 0..nx {
            for iy in 0..ny {
                let i = ix * ny + iy;
                let center = self.posterior[i];
                let mut laplacian = 0.0;
                if ix > 0 {
                    laplacian += self.posterior[i - ny] - center;
                }
                if ix + 1 < nx {
                    laplacian += self.posterior[i + ny] - center;
                }
                if iy > 0 {
                    laplacian += self.posterior[i - 1] - center;
                }
                if iy + 1 < ny {
                    laplacian += self.posterior[i + 1] - center;
                }
                self.scratch[i] = center + k * laplacian;
            }
        }

        std::mem::swap(&mut self.posterior, &mut self.scratch);

        // The stencil conserves mass exactly in real arithmetic; divide out
        // the accumulated floating-point drift to keep long runs honest.
        let total: f64 = self.posterior.iter().sum();
        if total > 0.0 {
            for mass in &mut self.posterior {
                *mass /= total;
            }
        }
    }

    /// Bayesian measurement update.
    ///
    /// Multiplies the posterior elementwise by the admissibility mask for
    /// the observation and renormalizes. If no cell is consistent, the
    /// posterior is left untouched in its pre-call (post-diffusion) state
    /// and [`FilterError::DegenerateEvidence`] is returned. The caller
    /// owns the fallback policy, because a silent uniform reset would throw
    /// away the accumulated diffusion history.
    pub fn reweight(
        &mut self,
        field: &BathymetricGrid,
        observation: f32,
    ) -> Result<(), FilterError> {
        validate_observation(observation)?;
        if field.dimensions() != (self.nx, self.ny) {
            return Err(FilterError::Grid(GridError::ShapeMismatch {
                x_len: field.dimensions().0,
                y_len: field.dimensions().1,
                cells: self.posterior.len(),
            }));
        }
        let interval = DepthInterval::new(observation, self.config.uncertainty)?;

        let mut total = 0.0;
        for ix in 0..self.nx {
            for iy in 0..self.ny {
                let i = ix * self.ny + iy;
                let mass = if interval.contains(field.depth(ix, iy)) {
                    self.posterior[i]
                } else {
                    0.0
                };
                self.scratch[i] = mass;
                total += mass;
            }
        }

        if total <= 0.0 {
            self.state.degenerate_steps += 1;
            return Err(FilterError::DegenerateEvidence);
        }

        for (dst, &masked) in self.posterior.iter_mut().zip(&self.scratch) {
            *dst = masked / total;
        }
        Ok(())
    }

    /// Advance the filter one time step: diffuse, then reweight.
    ///
    /// Prediction before correction, the standard Bayes filter cycle.
    /// On degenerate evidence the diffusion half of the step persists.
    pub fn step(&mut self, field: &BathymetricGrid, observation: f32) -> Result<(), FilterError> {
        self.state.steps += 1;
        self.diffuse();
        self.reweight(field, observation)
    }

    /// Current estimate: MAP cell position plus posterior radial spread.
    ///
    /// The spread is the posterior-weighted mean Euclidean distance from
    /// the posterior mean position, the same radial scalar the particle
    /// filter reports, so the two estimators are directly comparable.
    pub fn estimate(&self, field: &BathymetricGrid) -> Estimate {
        let (map_ix, map_iy) = self.map_cell();
        let map_position = field.node_position(map_ix, map_iy);

        let mut mean_x = 0.0;
        let mut mean_y = 0.0;
        for ix in 0..self.nx {
            for iy in 0..self.ny {
                let mass = self.posterior[ix * self.ny + iy];
                let node = field.node_position(ix, iy);
                mean_x += mass * node.x as f64;
                mean_y += mass * node.y as f64;
            }
        }
        let mean = Point2D::new(mean_x as f32, mean_y as f32);

        let mut spread = 0.0;
        for ix in 0..self.nx {
            for iy in 0..self.ny {
                let mass = self.posterior[ix * self.ny + iy];
                spread += mass * field.node_position(ix, iy).distance(&mean) as f64;
            }
        }

        Estimate::new(map_position, spread as f32)
    }
}

impl Localizer for GridBayesFilter {
    /// The grid filter encodes motion uncertainty as diffusion; the control
    /// input is unused and `dt` only validated, since the diffusion step is
    /// calibrated per update rather than per second.
    fn step(
        &mut self,
        field: &BathymetricGrid,
        observation: f32,
        _control: Velocity2D,
        dt: f32,
    ) -> Result<(), FilterError> {
        validate_dt(dt)?;
        GridBayesFilter::step(self, field, observation)
    }

    fn estimate(&self, field: &BathymetricGrid) -> Estimate {
        GridBayesFilter::estimate(self, field)
    }
}
