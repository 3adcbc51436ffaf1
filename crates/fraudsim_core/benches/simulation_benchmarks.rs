//! Criterion benchmarks for fraudsim_core
//!
//! Run with: cargo bench -p fraudsim_core

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use fraudsim_core::config::{ModelQuality, SimConfig};
use fraudsim_core::scenarios::{ScenarioParams, make_baseline};
use fraudsim_core::sensitivity::{DEFAULT_DRIVERS, TornadoMetric, tornado_data};
use fraudsim_core::simulation::run_monte_carlo;
use fraudsim_core::threshold::{default_thresholds, threshold_curve};

fn create_baseline() -> ScenarioParams {
    make_baseline(&SimConfig::default()).expect("default config is valid")
}

fn create_stochastic_baseline() -> ScenarioParams {
    ScenarioParams {
        stochastic_detection: true,
        ..create_baseline()
    }
}

fn bench_monte_carlo(c: &mut Criterion) {
    let mut group = c.benchmark_group("monte_carlo");
    let params = create_baseline();

    for n_paths in [1_000, 5_000, 20_000].iter() {
        group.bench_with_input(BenchmarkId::new("paths", n_paths), n_paths, |b, &n| {
            b.iter(|| run_monte_carlo(black_box(&params), black_box(42), n))
        });
    }

    group.finish();
}

fn bench_stochastic_detection(c: &mut Criterion) {
    let params = create_stochastic_baseline();

    c.bench_function("binomial_detection_5000_paths", |b| {
        b.iter(|| run_monte_carlo(black_box(&params), black_box(42), 5_000))
    });
}

fn bench_tornado(c: &mut Criterion) {
    let params = create_baseline();

    c.bench_function("tornado_3_drivers_2000_paths", |b| {
        b.iter(|| {
            tornado_data(
                black_box(&params),
                42,
                2_000,
                0.2,
                &DEFAULT_DRIVERS,
                TornadoMetric::MeanLoss,
            )
        })
    });
}

fn bench_threshold_curve(c: &mut Criterion) {
    let params = create_baseline();
    let quality = ModelQuality::default();
    let thresholds = default_thresholds();

    c.bench_function("threshold_curve_1000_paths", |b| {
        b.iter(|| threshold_curve(black_box(&params), quality.auc, &thresholds, 42, 1_000))
    });
}

criterion_group!(
    benches,
    bench_monte_carlo,
    bench_stochastic_detection,
    bench_tornado,
    bench_threshold_curve,
);
criterion_main!(benches);
