//! Criterion micro-benchmarks for sparse matrix encoding.

use criterion::{criterion_group, criterion_main, Criterion};
use bough_bench::reference_profile;
use bough_core::{encode, encode_rows};
use ndarray::Array2;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Build a dense `rows x cols` matrix with about `density` nonzeros.
fn make_dense(rows: usize, cols: usize, density: f64, seed: u64) -> Array2<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    Array2::from_shape_simple_fn((rows, cols), || {
        if rng.random_bool(density) {
            rng.random_range(-5.0..5.0)
        } else {
            0.0
        }
    })
}

/// Benchmark: Encode a 300x500 dense matrix at 2% density.
fn bench_encode_dense(c: &mut Criterion) {
    let dense = make_dense(300, 500, 0.02, 42);

    c.bench_function("encode_dense_300x500", |b| {
        b.iter(|| {
            let m = encode(dense.view());
            std::hint::black_box(&m);
        });
    });
}

/// Benchmark: Encode the reference profile's constraint rows directly.
fn bench_encode_rows(c: &mut Criterion) {
    let problem = reference_profile(42);
    let n_vars = problem.variables.len();

    c.bench_function("encode_rows_reference", |b| {
        b.iter(|| {
            let rows = problem.constraints.iter().map(|c| c.entries.iter().copied());
            let m = encode_rows(problem.constraints.len(), n_vars, rows, |v: &f64| *v != 0.0)
                .unwrap();
            std::hint::black_box(&m);
        });
    });
}

criterion_group!(benches, bench_encode_dense, bench_encode_rows);
criterion_main!(benches);
