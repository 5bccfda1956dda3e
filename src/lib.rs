//! # bathynav
//!
//! Terrain-aided localization over a known bathymetric (depth) map.
//!
//! A vehicle moving across a lake or seabed measures nothing but noisy depth
//! soundings. Given a depth map of the area, those soundings are enough to
//! recover the vehicle's position: each measurement rules out every part of
//! the map whose depth is inconsistent with it, and a recursive Bayesian
//! filter accumulates that evidence over time.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                     bin/                            │  ← Demo driver
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌──────────────────────┐ ┌──────────────────────────┐
//! │         io/          │ │          nav/            │  ← Consumers
//! │   (SVG snapshots)    │ │   (steering policies)    │
//! └──────────────────────┘ └──────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                  localization/                      │  ← Core filters
//! │   (motion model, depth likelihood, particle         │
//! │    filter, grid Bayes filter)                       │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌──────────────────────┐ ┌──────────────────────────┐
//! │     bathymetry/      │ │          sim/            │  ← Foundation
//! │  (depth field +      │ │  (truth vehicle, noise,  │
//! │   interpolation)     │ │   synthetic maps)        │
//! └──────────────────────┘ └──────────────────────────┘
//! ```
//!
//! # Estimators
//!
//! Two interchangeable estimators implement the [`Localizer`] contract:
//!
//! - [`ParticleFilter`]: a sequential Monte Carlo filter. Particles are
//!   propagated through a stochastic motion model, weighted by a
//!   depth-interval likelihood, and resampled every step.
//! - [`GridBayesFilter`]: a dense recursive Bayes filter. A probability mass
//!   function over all map cells is diffused (discretized Kolmogorov forward
//!   equation) and reweighted by a binary depth-admissibility mask.
//!
//! Both query the map through [`BathymetricGrid::depth_at`], a bilinear
//! interpolation over the depth grid.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use bathynav::{BathymetricGrid, Localizer, ParticleFilter, ParticleFilterConfig};
//!
//! let field = BathymetricGrid::new(x_axis, y_axis, depths)?;
//! let config = ParticleFilterConfig { seed: 42, ..Default::default() };
//! let mut filter = ParticleFilter::new(config, field.bounds())?;
//!
//! // Each time step: a noisy depth sounding and the commanded velocity.
//! filter.step(&field, sounding, control, dt)?;
//! let estimate = filter.estimate();
//! println!("position {:?} ± {}", estimate.position, estimate.spread);
//! ```
//!
//! # Conventions
//!
//! - Depths are negative underwater; the surface is 0.
//! - The depth grid is indexed `(x, y)` with both axes strictly increasing.
//! - All random sampling flows through explicitly seeded generators; a fixed
//!   seed reproduces a run exactly.

// Core value types
pub mod core;

// Depth field and bilinear interpolation
pub mod bathymetry;

// The two Bayesian estimators and their shared models
pub mod localization;

// Steering policies (estimate -> velocity command)
pub mod nav;

// Truth-state simulation and synthetic maps
pub mod sim;

// Visualization output
pub mod io;

pub use crate::core::{Bounds, Estimate, Point2D, Velocity2D};

pub use bathymetry::{BathymetricGrid, GridError};

pub use localization::{
    ConfigError, DepthInterval, FilterError, GridBayesConfig, GridBayesFilter, GridBayesState,
    Localizer, MotionModel, MotionModelConfig, Particle, ParticleFilter, ParticleFilterConfig,
    ParticleFilterState,
};

pub use nav::{limit_speed, Compass, HeadingPolicy, SteeringPolicy};

pub use sim::{NoiseGenerator, Vehicle, VehicleConfig};
