//! Criterion benchmarks for `unmix-math`.
//!
//! Focus on the kernels that dominate the E/M-step inner loops.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use unmix_math::{mul, normal_pdf, squared_error_sum, sum, weighted_squared_deviation_sum};

fn make(n: usize, offset: f64) -> Vec<f64> {
    (0..n).map(|i| ((i % 1013) as f64) * 1e-3 + offset).collect()
}

fn bench_vector_kernels(c: &mut Criterion) {
    let mut group = c.benchmark_group("vect");

    // Sample counts typical of deconvolution inputs.
    for n in [1_000usize, 100_000, 1_000_000] {
        let a = make(n, 0.5);
        let b = make(n, 1.5);
        let mut dst = vec![0.0; n];

        group.bench_with_input(BenchmarkId::new("sum", n), &a, |bch, a| {
            bch.iter(|| black_box(sum(black_box(a))));
        });

        group.bench_with_input(BenchmarkId::new("mul", n), &(&a, &b), |bch, (a, b)| {
            bch.iter(|| {
                mul(black_box(a), black_box(b), &mut dst);
                black_box(dst[0]);
            });
        });

        group.bench_with_input(
            BenchmarkId::new("squared_error_sum", n),
            &(&a, &b),
            |bch, (a, b)| {
                bch.iter(|| black_box(squared_error_sum(black_box(a), black_box(b))));
            },
        );

        group.bench_with_input(
            BenchmarkId::new("weighted_squared_deviation_sum", n),
            &(&a, &b),
            |bch, (w, x)| {
                bch.iter(|| black_box(weighted_squared_deviation_sum(w, x, 1.0)));
            },
        );
    }

    group.finish();
}

fn bench_densities(c: &mut Criterion) {
    c.bench_function("normal_pdf", |b| {
        b.iter(|| black_box(normal_pdf(black_box(0.37), 0.0, 2.0)));
    });
}

criterion_group!(benches, bench_vector_kernels, bench_densities);
criterion_main!(benches);
