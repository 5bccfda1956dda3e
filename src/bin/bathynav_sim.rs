//! bathynav-sim demo driver
//!
//! Simulates a vehicle crossing a synthetic lake toward a harbour, guided
//! only by noisy depth soundings and one of the two localization filters.
//!
//! # Usage
//!
//! ```bash
//! # Particle filter, default lake
//! cargo run --bin bathynav_sim -- --filter particle
//!
//! # Grid Bayes filter with SVG frames and a fixed seed
//! cargo run --bin bathynav_sim -- --filter grid --seed 42 --svg-dir ./frames
//!
//! # With a scenario config file
//! cargo run --bin bathynav_sim -- --config scenario.toml
//! ```

use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use bathynav::io::{SvgConfig, SvgVisualizer};
use bathynav::sim::maps;
use bathynav::{
    limit_speed, BathymetricGrid, Compass, GridBayesConfig, GridBayesFilter, HeadingPolicy,
    Localizer, MotionModelConfig, ParticleFilter, ParticleFilterConfig, Point2D, SteeringPolicy,
    Vehicle, VehicleConfig, Velocity2D,
};

/// Which estimator drives the run.
#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
enum FilterKind {
    /// Sequential Monte Carlo particle filter
    Particle,
    /// Dense grid Bayes filter
    Grid,
}

/// Which steering policy turns estimates into commands.
#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
enum PolicyKind {
    /// Steer straight at the target
    Compass,
    /// Correct the heading of the realized displacement
    Heading,
}

/// Terrain-aided navigation demo
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Estimator to run
    #[arg(short, long, value_enum, default_value_t = FilterKind::Particle)]
    filter: FilterKind,

    /// Steering policy
    #[arg(long, value_enum, default_value_t = PolicyKind::Compass)]
    policy: PolicyKind,

    /// Scenario configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Random seed shared by vehicle and filter (0 = entropy)
    #[arg(short, long, default_value = "0")]
    seed: u64,

    /// Particle count (particle filter only)
    #[arg(short, long, default_value = "5000")]
    particles: usize,

    /// Maximum simulation steps
    #[arg(long, default_value = "500")]
    max_steps: usize,

    /// Directory for per-step SVG frames (omit to disable)
    #[arg(long)]
    svg_dir: Option<PathBuf>,
}

/// Scenario configuration file structure.
#[derive(Debug, Deserialize, Default)]
struct Config {
    #[serde(default)]
    lake: LakeConfig,
    #[serde(default)]
    vehicle: VehicleSection,
    #[serde(default)]
    run: RunConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct LakeConfig {
    /// Nodes per axis
    size: usize,
    /// Node spacing (m)
    spacing: f32,
    /// Bed depth away from the trench (m, negative)
    bed_depth: f32,
    /// Depth at the trench center (m, negative)
    trench_depth: f32,
    /// Trench center
    trench_x: f32,
    trench_y: f32,
    /// Trench radius (m)
    trench_radius: f32,
}

impl Default for LakeConfig {
    fn default() -> Self {
        Self {
            size: 40,
            spacing: 5.0,
            bed_depth: -8.0,
            trench_depth: -35.0,
            trench_x: 150.0,
            trench_y: 60.0,
            trench_radius: 25.0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct VehicleSection {
    start_x: f32,
    start_y: f32,
    process_sigma: f32,
    noise_level: f32,
    max_speed: f32,
}

impl Default for VehicleSection {
    fn default() -> Self {
        Self {
            start_x: 30.0,
            start_y: 150.0,
            process_sigma: 1.0,
            noise_level: 0.15,
            max_speed: 2.0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RunConfig {
    /// Harbour position
    target_x: f32,
    target_y: f32,
    /// Stop when the true position is this close to the harbour (m)
    arrival_distance: f32,
    /// Time step (s)
    dt: f32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            target_x: 170.0,
            target_y: 20.0,
            arrival_distance: 5.0,
            dt: 1.0,
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<Config, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            Ok(toml::from_str(&text)?)
        }
        None => Ok(Config::default()),
    }
}

/// The two strategies behind one interface, tagged so the SVG frames can
/// still reach the concrete cloud or posterior.
enum AnyFilter {
    Particle(ParticleFilter),
    Grid(GridBayesFilter),
}

impl Localizer for AnyFilter {
    fn step(
        &mut self,
        field: &BathymetricGrid,
        observation: f32,
        control: Velocity2D,
        dt: f32,
    ) -> Result<(), bathynav::FilterError> {
        match self {
            AnyFilter::Particle(f) => f.step(field, observation, control, dt),
            AnyFilter::Grid(f) => Localizer::step(f, field, observation, control, dt),
        }
    }

    fn estimate(&self, field: &BathymetricGrid) -> bathynav::Estimate {
        match self {
            AnyFilter::Particle(f) => f.estimate(),
            AnyFilter::Grid(f) => f.estimate(field),
        }
    }
}

fn build_filter(
    kind: FilterKind,
    args: &Args,
    config: &Config,
    field: &BathymetricGrid,
) -> Result<AnyFilter, Box<dyn std::error::Error>> {
    match kind {
        FilterKind::Particle => {
            let pf_config = ParticleFilterConfig {
                num_particles: args.particles,
                uncertainty: config.vehicle.noise_level,
                motion: MotionModelConfig {
                    process_sigma: config.vehicle.process_sigma,
                },
                seed: args.seed,
            };
            Ok(AnyFilter::Particle(ParticleFilter::new(
                pf_config,
                field.bounds(),
            )?))
        }
        FilterKind::Grid => {
            let gb_config = GridBayesConfig {
                uncertainty: config.vehicle.noise_level,
                ..Default::default()
            };
            Ok(AnyFilter::Grid(GridBayesFilter::new(gb_config, field)?))
        }
    }
}

fn save_frame(
    dir: &PathBuf,
    step: usize,
    field: &BathymetricGrid,
    localizer: &AnyFilter,
    vehicle: &Vehicle,
    target: Point2D,
) -> std::io::Result<()> {
    let mut viz = SvgVisualizer::new(SvgConfig::default(), field);
    viz.draw_depth_field(field);
    match localizer {
        AnyFilter::Particle(f) => viz.draw_particles(f.particles()),
        AnyFilter::Grid(f) => viz.draw_posterior(f.posterior(), field),
    }
    viz.draw_estimate(&localizer.estimate(field));
    viz.draw_marker(vehicle.position(), "#111111", Some("truth"));
    viz.draw_marker(target, "#882288", Some("harbour"));
    viz.save(dir.join(format!("step_{step:04}.svg")))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = load_config(args.config.as_ref())?;

    let lake = &config.lake;
    let field = maps::trench_lake(
        lake.size,
        lake.spacing,
        lake.bed_depth,
        lake.trench_depth,
        Point2D::new(lake.trench_x, lake.trench_y),
        lake.trench_radius,
    );
    let bounds = field.bounds();
    let target = Point2D::new(config.run.target_x, config.run.target_y);

    let mut vehicle = Vehicle::new(
        Point2D::new(config.vehicle.start_x, config.vehicle.start_y),
        VehicleConfig {
            process_sigma: config.vehicle.process_sigma,
            noise_level: config.vehicle.noise_level,
            // Decorrelate truth noise from the filter's proposal noise.
            seed: if args.seed == 0 { 0 } else { args.seed ^ 0x5EED },
        },
    )?;

    let mut localizer = build_filter(args.filter, &args, &config, &field)?;
    let mut policy: Box<dyn SteeringPolicy> = match args.policy {
        PolicyKind::Compass => Box::new(Compass::new(target)),
        PolicyKind::Heading => Box::new(HeadingPolicy::new(target)),
    };

    if let Some(dir) = &args.svg_dir {
        fs::create_dir_all(dir)?;
    }

    log::info!(
        "starting {:?} filter run: lake {}x{} nodes, start {:?}, harbour {:?}",
        args.filter,
        lake.size,
        lake.size,
        vehicle.position(),
        target
    );

    let dt = config.run.dt;
    let mut control = Velocity2D::zero();
    for step in 0..args.max_steps {
        vehicle.step(control, dt, bounds);
        let sounding = vehicle.sounding(&field)?;

        match localizer.step(&field, sounding, control, dt) {
            Ok(()) => {}
            Err(bathynav::FilterError::DegenerateEvidence) => {
                // No cell matched this sounding; keep the diffused prior
                // and wait for the next observation.
                log::warn!("step {step}: observation {sounding:.2} matched no cell, skipping update");
            }
            Err(e) => return Err(e.into()),
        }

        let estimate = localizer.estimate(&field);
        control = limit_speed(policy.velocity(estimate.position), config.vehicle.max_speed);

        let true_error = vehicle.position().distance(&estimate.position);
        let remaining = vehicle.position().distance(&target);
        log::info!(
            "step {step}: depth {sounding:6.2} m, estimate ({:6.1}, {:6.1}) ± {:5.1} m, error {true_error:5.1} m, harbour {remaining:6.1} m",
            estimate.position.x,
            estimate.position.y,
            estimate.spread
        );

        if let Some(dir) = &args.svg_dir {
            save_frame(dir, step, &field, &localizer, &vehicle, target)?;
        }

        if remaining < config.run.arrival_distance {
            log::info!("arrived at the harbour in {} steps", step + 1);
            return Ok(());
        }
    }

    log::warn!("did not reach the harbour within {} steps", args.max_steps);
    Ok(())
}
