//! Benchmarks for the analysis stages over generated gait series

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use msp_core::TimeSeries;
use msp_processing::{
    KinematicsEstimator, KnotSpacing, PeakDetector, ResampleConfig, Resampler, SmoothingFilter,
};
use msp_simulation::{GeneratorConfig, SignalGenerator};

fn gait_series(rate_hz: f64, duration_s: f64) -> TimeSeries {
    let config = GeneratorConfig {
        seed: Some(42),
        ..GeneratorConfig::default()
    };
    SignalGenerator::new(config)
        .and_then(|mut generator| generator.generate_base(rate_hz, 0.1, duration_s))
        .expect("benchmark series")
}

fn bench_resampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("resampling");
    let source = gait_series(1000.0, 5.0);

    for spacing in [KnotSpacing::Uniform, KnotSpacing::Measured] {
        let resampler = Resampler::new(ResampleConfig {
            knot_spacing: spacing,
        });
        group.bench_with_input(
            BenchmarkId::new(format!("{:?}", spacing), "1000hz_to_100hz"),
            &source,
            |b, source| {
                b.iter(|| {
                    let mut destination = TimeSeries::new("out", "deg");
                    resampler
                        .resample(black_box(source), &mut destination, 100.0, 0.0, 5.0)
                        .ok();
                    black_box(destination)
                });
            },
        );
    }

    group.finish();
}

fn bench_window_scans(c: &mut Criterion) {
    let mut group = c.benchmark_group("window_scans");
    let series = gait_series(1000.0, 10.0);
    let detector = PeakDetector::new();
    let estimator = KinematicsEstimator::new();

    group.bench_function("find_peaks", |b| {
        b.iter(|| black_box(detector.find_peaks(black_box(&series), 1.0, 9.0)))
    });
    group.bench_function("derive_kinematics", |b| {
        b.iter(|| black_box(estimator.derive(black_box(&series), 1.0, 9.0)))
    });

    group.finish();
}

fn bench_smoothing(c: &mut Criterion) {
    let mut group = c.benchmark_group("gaussian_smooth");
    let series = gait_series(1000.0, 2.0);
    let filter = SmoothingFilter::new();

    for &kernel_size in &[5usize, 19, 63] {
        group.bench_with_input(
            BenchmarkId::from_parameter(kernel_size),
            &kernel_size,
            |b, &kernel_size| {
                b.iter(|| {
                    let mut s = series.clone();
                    filter.gaussian_smooth(&mut s, kernel_size, kernel_size as f64 / 6.0).ok();
                    black_box(s)
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_resampling, bench_window_scans, bench_smoothing);
criterion_main!(benches);
