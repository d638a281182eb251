//! Criterion benchmarks for the u-tsp solvers.
//!
//! Uses random Euclidean instances (seeded) so timings are comparable
//! across runs.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use u_tsp::aco::{AcoConfig, AcoRunner};
use u_tsp::exact::{BnbConfig, BnbRunner, BruteForceRunner};
use u_tsp::matrix::MatrixOptions;
use u_tsp::DistanceMatrix;

// ===========================================================================
// Instances
// ===========================================================================

fn euclidean(n: usize, seed: u64) -> DistanceMatrix {
    let mut rng = StdRng::seed_from_u64(seed);
    let points: Vec<(f64, f64)> = (0..n)
        .map(|_| (rng.random_range(0.0..500.0), rng.random_range(0.0..500.0)))
        .collect();
    let names: Vec<String> = (0..n).map(|i| format!("C{i}")).collect();
    let rows: Vec<Vec<f64>> = points
        .iter()
        .map(|&(x1, y1)| {
            points
                .iter()
                .map(|&(x2, y2)| ((x1 - x2).powi(2) + (y1 - y2).powi(2)).sqrt())
                .collect()
        })
        .collect();
    DistanceMatrix::from_rows(&names, &rows, MatrixOptions::default()).unwrap()
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_brute_force(c: &mut Criterion) {
    let mut group = c.benchmark_group("brute_force");
    group.sample_size(10);

    for &n in &[6usize, 8, 9] {
        let matrix = euclidean(n, 42);
        group.bench_with_input(BenchmarkId::from_parameter(n), &matrix, |b, m| {
            b.iter(|| black_box(BruteForceRunner::run(black_box(m), 0)))
        });
    }
    group.finish();
}

fn bench_branch_and_bound(c: &mut Criterion) {
    let mut group = c.benchmark_group("branch_and_bound");
    group.sample_size(10);

    for &n in &[8usize, 10, 12] {
        let matrix = euclidean(n, 42);
        for parallel in [false, true] {
            let config = BnbConfig::default().with_parallel(parallel);
            let label = if parallel { "par" } else { "seq" };
            group.bench_with_input(
                BenchmarkId::new(format!("n{n}_{label}"), n),
                &(matrix.clone(), config),
                |b, (m, c)| b.iter(|| black_box(BnbRunner::run(black_box(m), 0, black_box(c)))),
            );
        }
    }
    group.finish();
}

fn bench_aco(c: &mut Criterion) {
    let mut group = c.benchmark_group("aco");
    group.sample_size(10);

    for &n in &[10usize, 30, 60] {
        let matrix = euclidean(n, 42);
        let config = AcoConfig::new(20, 50, 0.1, 1.0, 2.0).with_seed(42);
        group.bench_with_input(
            BenchmarkId::from_parameter(n),
            &(matrix, config),
            |b, (m, c)| b.iter(|| black_box(AcoRunner::run(black_box(m), 0, black_box(c)))),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_brute_force, bench_branch_and_bound, bench_aco);
criterion_main!(benches);
