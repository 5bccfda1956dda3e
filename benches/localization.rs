//! Benchmark the per-step cost of both estimators.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use bathynav::sim::maps;
use bathynav::{
    GridBayesConfig, GridBayesFilter, ParticleFilter, ParticleFilterConfig, Point2D, Velocity2D,
};

fn bench_field() -> bathynav::BathymetricGrid {
    maps::trench_lake(50, 4.0, -6.0, -35.0, Point2D::new(100.0, 100.0), 20.0)
}

fn particle_step(c: &mut Criterion) {
    let field = bench_field();
    let mut group = c.benchmark_group("particle_step");

    for n in [1_000usize, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            let config = ParticleFilterConfig {
                num_particles: n,
                seed: 42,
                ..Default::default()
            };
            let mut filter = ParticleFilter::new(config, field.bounds()).unwrap();
            b.iter(|| {
                filter
                    .step(
                        black_box(&field),
                        black_box(-30.0),
                        Velocity2D::new(1.0, 0.0),
                        1.0,
                    )
                    .unwrap();
            });
        });
    }
    group.finish();
}

fn grid_step(c: &mut Criterion) {
    let field = bench_field();
    let mut filter = GridBayesFilter::new(GridBayesConfig::default(), &field).unwrap();

    c.bench_function("grid_step_50x50", |b| {
        b.iter(|| {
            // Alternating soundings keep the posterior from pinning to a
            // single cell and the masking branch realistic.
            let _ = filter.step(black_box(&field), black_box(-30.0));
            let _ = filter.step(black_box(&field), black_box(-6.0));
        });
    });
}

fn depth_lookup(c: &mut Criterion) {
    let field = bench_field();
    c.bench_function("depth_at", |b| {
        b.iter(|| field.depth_at(black_box(73.4), black_box(121.9)).unwrap());
    });
}

criterion_group!(benches, particle_step, grid_step, depth_lookup);
criterion_main!(benches);
