//! Benchmarks for maximum likelihood fitting and the full analysis pipeline.

use arima_insight::core::Series;
use arima_insight::identification::OrderIdentifier;
use arima_insight::models::{ArimaModel, ModelOrder};
use arima_insight::session::{AnalysisRequest, InsightSession};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

fn generate_arma(n: usize, phi: f64, theta: f64, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0).unwrap();
    let mut y = vec![0.0; n];
    let mut prev_e = 0.0;
    for t in 1..n {
        let e = normal.sample(&mut rng);
        y[t] = phi * y[t - 1] + e + theta * prev_e;
        prev_e = e;
    }
    y
}

fn bench_mle_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("mle_fit");

    for size in [100, 250, 500, 1000].iter() {
        let data = generate_arma(*size, 0.6, 0.3, 1);

        for order in [ModelOrder::new(1, 0, 0), ModelOrder::new(1, 0, 1), ModelOrder::new(2, 1, 2)] {
            group.bench_with_input(BenchmarkId::new(order.to_string(), size), &data, |b, d| {
                let model = ArimaModel::new(order);
                b.iter(|| model.fit(black_box(d)))
            });
        }
    }

    group.finish();
}

fn bench_identification(c: &mut Criterion) {
    let mut group = c.benchmark_group("identification");
    let identifier = OrderIdentifier::default();

    for size in [100, 1000, 10000].iter() {
        let data = generate_arma(*size, 0.7, 0.0, 2);
        group.bench_with_input(BenchmarkId::new("identify_orders", size), &data, |b, d| {
            b.iter(|| identifier.identify_orders(black_box(d), 5, 5, 0))
        });
    }

    group.finish();
}

fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze");
    group.sample_size(10);

    for size in [100, 300].iter() {
        let series = Series::from_values(generate_arma(*size, 0.7, 0.2, 3)).unwrap();
        group.bench_with_input(BenchmarkId::new("quick_analysis", size), &series, |b, s| {
            b.iter(|| InsightSession::quick_analysis(black_box(s.clone()), AnalysisRequest::default()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_mle_fit, bench_identification, bench_analyze);
criterion_main!(benches);
