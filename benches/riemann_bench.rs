//! Benchmarks for the maximal wave speed estimators.
//!
//! Run with: `cargo bench --bench riemann_bench`
//!
//! Compares the closed-form estimate with bracketing refinement for Euler
//! and shallow water state pairs.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use idp_rs::equations::{Euler, HyperbolicSystem, ShallowWater};
use idp_rs::riemann::{EulerRiemannSolver, RiemannSolver, ShallowWaterRiemannSolver};
use idp_rs::types::State;

/// Sod, a strong shock and a near-vacuum pair.
fn euler_pairs() -> Vec<(State<3>, State<3>)> {
    let euler = Euler::<1>::air();
    let state = |rho: f64, v: f64, p: f64| euler.from_primitive(&State::new([rho, v, p]));
    vec![
        (state(1.0, 0.0, 1.0), state(0.125, 0.0, 0.1)),
        (state(1.0, 0.0, 1000.0), state(1.0, 0.0, 0.01)),
        (state(1.0, -2.0, 0.4), state(1.0, 2.0, 0.4)),
    ]
}

fn bench_euler(c: &mut Criterion) {
    let mut group = c.benchmark_group("euler_riemann");
    let pairs = euler_pairs();

    for iterations in [0, 2, 8] {
        let solver = EulerRiemannSolver::new(Euler::<1>::air()).with_newton(iterations, 1e-12);
        group.bench_with_input(
            BenchmarkId::new("newton_iterations", iterations),
            &iterations,
            |b, _| {
                b.iter(|| {
                    pairs
                        .iter()
                        .map(|(l, r)| solver.lambda_max(black_box(l), black_box(r), &[1.0]))
                        .sum::<f64>()
                });
            },
        );
    }

    group.finish();
}

fn bench_shallow_water(c: &mut Criterion) {
    let mut group = c.benchmark_group("shallow_water_riemann");
    let solver = ShallowWaterRiemannSolver::new(ShallowWater::<1>::standard());
    let pairs = [
        (State::new([1.0, 0.0]), State::new([0.1, 0.0])),
        (State::new([1.0, 0.0]), State::new([0.0, 0.0])),
        (State::new([2.0, -1.0]), State::new([2.0, 1.0])),
    ];

    group.bench_function("closed_form", |b| {
        b.iter(|| {
            pairs
                .iter()
                .map(|(l, r)| solver.lambda_max(black_box(l), black_box(r), &[1.0]))
                .sum::<f64>()
        });
    });

    group.finish();
}

criterion_group!(benches, bench_euler, bench_shallow_water);
criterion_main!(benches);
