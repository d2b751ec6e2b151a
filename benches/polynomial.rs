// Copyright 2025 the Polyroot Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT
#![expect(missing_docs, reason = "criterion emits undocumented functions")]

//! Benchmarks of the general-degree and Bernstein solvers.

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use polyroot::{solve_bezier, solve_polynomial, solve_polynomial_into, Polynomial};

fn bench_polynomial(c: &mut Criterion) {
    let mut group = c.benchmark_group("solve_polynomial");
    let complex = Polynomial::new([2.0, 1.0, 1.0]);
    for degree in [5, 7, 10] {
        let roots: Vec<f64> = (0..degree - 2).map(|i| f64::from(i) - 1.5).collect();
        let p = Polynomial::from_roots(&roots) * &complex;
        group.bench_function(format!("degree {degree}"), |b| {
            b.iter(|| solve_polynomial(black_box(p.coeffs())));
        });
    }
    let p = Polynomial::from_roots(&[-3e6, -2e-4, 1e-3, 5.0, 7e5]) * &complex;
    group.bench_function("wide magnitudes", |b| {
        b.iter(|| solve_polynomial(black_box(p.coeffs())));
    });
    let mut buf = Vec::new();
    group.bench_function("degree 7 into buffer", |b| {
        let p = Polynomial::from_roots(&[-2.0, -1.0, 0.5, 1.0, 3.0]) * &complex;
        b.iter(|| solve_polynomial_into(black_box(p.coeffs()), &mut buf));
    });
    group.finish();
}

fn bench_bezier(c: &mut Criterion) {
    let mut group = c.benchmark_group("solve_bezier");
    group.bench_function("degree 5", |b| {
        b.iter(|| solve_bezier(black_box(&[-1.0, 2.0, -3.0, 4.0, -5.0, 6.0])));
    });
    group.bench_function("degree 9 no roots", |b| {
        b.iter(|| solve_bezier(black_box(&[1.0, 0.5, 0.25, 0.5, 1.0, 2.0, 0.75, 0.5, 1.0, 3.0])));
    });
    group.finish();
}

criterion_group!(benches, bench_polynomial, bench_bezier);
criterion_main!(benches);
