//! End-to-end tests of a single hyperbolic step.
//!
//! Covers admissibility of the low-order and limited updates on random
//! states and graphs, the Sod scenario, the restart and warn strategies,
//! and multi-stage blending.

use idp_rs::config::{HyperbolicConfig, IdViolationStrategy};
use idp_rs::equations::{
    Euler, EulerDescription, HyperbolicSystem, ShallowWater, ShallowWaterDescription,
};
use idp_rs::graph::{GraphOperators, OfflineData, SparseMatrix};
use idp_rs::initial_state::{Contrast, InitialState, Uniform};
use idp_rs::limiter::Limiter;
use idp_rs::mesh::SimplexMesh;
use idp_rs::riemann::RiemannSolver;
use idp_rs::solver::{HyperbolicModule, Stage, StepOutcome, count_inadmissible};
use idp_rs::types::State;
use proptest::prelude::*;

fn sod_1d(n_cells: usize) -> (OfflineData<1>, Euler<1>, Vec<State<3>>) {
    let graph = OfflineData::assemble(&SimplexMesh::interval(0.0, 1.0, n_cells)).unwrap();
    let euler = Euler::<1>::air();
    let sod: Contrast<1, 3> = Contrast::sod(&euler);
    let u = sod.interpolate(&graph, 0.0);
    (graph, euler, u)
}

fn random_euler_states() -> impl Strategy<Value = (usize, usize, Vec<(f64, f64, f64, f64)>)> {
    (1usize..5, 1usize..5).prop_flat_map(|(nx, ny)| {
        let n = (nx + 1) * (ny + 1);
        let state = (0.05f64..5.0, -2.0f64..2.0, -2.0f64..2.0, 0.05f64..5.0);
        (Just(nx), Just(ny), prop::collection::vec(state, n))
    })
}

fn random_shallow_water_states() -> impl Strategy<Value = (usize, usize, Vec<(f64, f64, f64)>)> {
    (1usize..5, 1usize..5).prop_flat_map(|(nx, ny)| {
        let n = (nx + 1) * (ny + 1);
        let depth = prop_oneof![Just(0.0), 1e-11f64..1e-7, 0.05f64..3.0];
        let state = (depth, -2.0f64..2.0, -2.0f64..2.0);
        (Just(nx), Just(ny), prop::collection::vec(state, n))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// τ = tau_max keeps every node admissible, with and without the
    /// high-order correction.
    #[test]
    fn step_is_admissible_for_tau_max((nx, ny, primitives) in random_euler_states()) {
        let graph = OfflineData::assemble(&SimplexMesh::rectangle(0.0, 1.0, 0.0, 1.0, nx, ny))
            .unwrap();
        let euler = Euler::<2>::air();
        let description = EulerDescription::new(euler);
        let u: Vec<State<4>> = primitives
            .iter()
            .map(|&(rho, vx, vy, p)| euler.from_primitive(&State::new([rho, vx, vy, p])))
            .collect();

        for high_order in [false, true] {
            let config = HyperbolicConfig::default().with_high_order(high_order);
            let mut module = HyperbolicModule::new(&description, &graph, config);
            module.prepare();
            let mut new = u.clone();
            let outcome = module.step(&u, [], &mut new, 0.0).unwrap();

            prop_assert!(outcome.is_accepted());
            prop_assert_eq!(module.n_warnings(), 0);
            prop_assert_eq!(count_inadmissible(&euler, &graph, &new), 0);
        }
    }

    /// Same for shallow water with dry and near-dry nodes moving at O(1)
    /// velocities.
    #[test]
    fn shallow_water_step_is_admissible_for_tau_max(
        (nx, ny, primitives) in random_shallow_water_states()
    ) {
        let graph = OfflineData::assemble(&SimplexMesh::rectangle(0.0, 1.0, 0.0, 1.0, nx, ny))
            .unwrap();
        let swe = ShallowWater::<2>::new(1.0);
        let description = ShallowWaterDescription::new(swe);
        let mut u: Vec<State<3>> = primitives
            .iter()
            .map(|&(h, vx, vy)| State::new([h, h * vx, h * vy]))
            .collect();
        // One wet node bounds the step size
        u[0] = State::new([1.0, 0.5, 0.0]);

        for high_order in [false, true] {
            let config = HyperbolicConfig::default().with_high_order(high_order);
            let mut module = HyperbolicModule::new(&description, &graph, config);
            module.prepare();
            let mut new = u.clone();
            let outcome = module.step(&u, [], &mut new, 0.0).unwrap();

            prop_assert!(outcome.is_accepted());
            prop_assert_eq!(module.n_warnings(), 0);
            prop_assert_eq!(count_inadmissible(&swe, &graph, &new), 0);
        }
    }
}

#[test]
fn test_dam_break_onto_dry_bed_stays_admissible() {
    let graph = OfflineData::assemble(&SimplexMesh::interval(-1.0, 1.0, 100)).unwrap();
    let swe = ShallowWater::<1>::new(1.0);
    let description = ShallowWaterDescription::new(swe);
    let dam: Contrast<1, 2> = Contrast::dam_break(1.0, 0.0);
    let u = dam.interpolate(&graph, 0.0);

    for high_order in [false, true] {
        let config = HyperbolicConfig::default().with_high_order(high_order);
        let mut module = HyperbolicModule::new(&description, &graph, config);
        module.prepare();

        let mut state = u.clone();
        let mut new = u.clone();
        for step in 0..40 {
            let outcome = module.step(&state, [], &mut new, 0.0).unwrap();
            assert!(outcome.is_accepted(), "step {step}");
            assert_eq!(module.n_warnings(), 0, "step {step}");
            assert_eq!(count_inadmissible(&swe, &graph, &new), 0, "step {step}");
            std::mem::swap(&mut state, &mut new);
        }
        // The front has advanced into the dry region
        assert!(state[60][0] > 0.0);
    }
}

#[test]
fn test_uniform_state_is_unchanged_for_any_admissible_tau() {
    let graph = OfflineData::assemble(&SimplexMesh::rectangle(0.0, 2.0, 0.0, 1.0, 6, 3)).unwrap();
    let euler = Euler::<2>::air();
    let description = EulerDescription::new(euler);
    let state = euler.from_primitive(&State::new([1.3, 0.0, 0.0, 0.7]));
    let u = Uniform::new(state).interpolate(&graph, 0.0);

    let mut module = HyperbolicModule::new(&description, &graph, HyperbolicConfig::default());
    module.prepare();
    let tau_max = module.compute_tau_max(&u).unwrap();

    for fraction in [0.1, 0.5, 1.0] {
        let mut new = vec![State::zero(); u.len()];
        module.step(&u, [], &mut new, fraction * tau_max).unwrap();
        for s in &new {
            for c in 0..4 {
                assert!((s[c] - state[c]).abs() < 1e-12, "{s:?}");
            }
        }
    }
}

#[test]
fn test_sod_single_low_order_step() {
    let (graph, euler, u) = sod_1d(100);
    let description = EulerDescription::new(euler);

    let lambda = description
        .riemann_solver
        .lambda_max(&u[0], &u[100], &[1.0]);
    assert!(lambda >= 1.7522 && lambda <= 1.7522 * 1.01);

    let config = HyperbolicConfig::default().with_high_order(false);
    let mut module = HyperbolicModule::new(&description, &graph, config);
    module.prepare();
    let tau_max = module.compute_tau_max(&u).unwrap();

    let mut new = u.clone();
    let outcome = module.step(&u, [], &mut new, 0.9 * tau_max).unwrap();
    assert!(outcome.is_accepted());
    for s in &new {
        assert!(s[0] > 0.0);
        assert!(euler.pressure(s) > 0.0);
    }

    // Only the nodes next to the discontinuity move in one step
    for i in [10, 90] {
        assert!((new[i] - u[i]).max_abs() < 1e-12);
    }
    let r = u.iter().position(|s| s[0] < 0.5).unwrap();
    assert!(new[r - 1][0] < u[r - 1][0]);
    assert!(new[r][0] > u[r][0]);
}

#[test]
fn test_restart_on_prescribed_tau_above_limit() {
    let (graph, euler, u) = sod_1d(50);
    let description = EulerDescription::new(euler);
    let config = HyperbolicConfig::default().with_strategy(IdViolationStrategy::RaiseException);
    let mut module = HyperbolicModule::new(&description, &graph, config);
    module.prepare();

    let tau_max = module.compute_tau_max(&u).unwrap();
    let mut new = u.clone();

    let outcome = module.step(&u, [], &mut new, 1.5 * tau_max).unwrap();
    assert!(matches!(outcome, StepOutcome::Restart { .. }));
    assert_eq!(module.n_restarts(), 1);

    let outcome = module.step(&u, [], &mut new, tau_max).unwrap();
    assert!(outcome.is_accepted());
    assert_eq!(module.n_restarts(), 1);

    let outcome = module.step(&u, [], &mut new, 1.5 * tau_max).unwrap();
    assert!(!outcome.is_accepted());
    assert_eq!(module.n_restarts(), 2);
}

#[test]
fn test_warn_strategy_accepts_and_counts() {
    let (graph, euler, u) = sod_1d(50);
    let description = EulerDescription::new(euler);
    let mut module = HyperbolicModule::new(&description, &graph, HyperbolicConfig::default());
    module.prepare();

    let tau_max = module.compute_tau_max(&u).unwrap();
    let mut new = u.clone();
    let outcome = module.step(&u, [], &mut new, 1.5 * tau_max).unwrap();

    assert_eq!(
        outcome,
        StepOutcome::Accepted {
            tau: 1.5 * tau_max,
            tau_max
        }
    );
    assert_eq!(module.n_warnings(), 1);
    assert_eq!(module.n_restarts(), 0);
}

#[test]
fn test_tau_within_tolerance_is_not_a_violation() {
    let (graph, euler, u) = sod_1d(50);
    let description = EulerDescription::new(euler);
    let mut module = HyperbolicModule::new(&description, &graph, HyperbolicConfig::default());
    module.prepare();

    let tau_max = module.compute_tau_max(&u).unwrap();
    let mut new = u.clone();
    module.step(&u, [], &mut new, 1.05 * tau_max).unwrap();
    assert_eq!(module.n_warnings(), 0);
}

#[test]
fn test_limited_step_stays_within_low_order_bounds() {
    let graph = OfflineData::assemble(&SimplexMesh::interval(-1.0, 1.0, 80)).unwrap();
    let swe = ShallowWater::<1>::new(1.0);
    let description = ShallowWaterDescription::new(swe);
    let dam: Contrast<1, 2> = Contrast::dam_break(1.0, 0.2);
    let u = dam.interpolate(&graph, 0.0);

    let mut low = HyperbolicModule::new(
        &description,
        &graph,
        HyperbolicConfig::default().with_high_order(false),
    );
    low.prepare();
    let mut u_low = u.clone();
    low.step(&u, [], &mut u_low, 0.0).unwrap();

    let mut high = HyperbolicModule::new(&description, &graph, HyperbolicConfig::default());
    high.prepare();
    let mut u_high = u.clone();
    high.step(&u, [], &mut u_high, 0.0).unwrap();

    let limiter = &description.limiter;
    let pattern = graph.sparsity();
    let eps = 1e-12;
    for i in 0..graph.n_nodes() {
        let neighbors = pattern.columns(i)[1..].iter().map(|&j| &u_low[j]);
        let bounds = limiter.compute_bounds(&u_low[i], neighbors);
        let h = u_high[i][0];
        assert!(h >= bounds.h_min - eps && h <= bounds.h_max + eps, "node {i}: h = {h}");
        assert!(
            swe.kinetic_energy(&u_high[i]) <= bounds.kinetic_max + eps,
            "node {i}: {:?} outside {:?}",
            u_high[i],
            bounds
        );
    }
}

#[test]
fn test_stage_with_zero_weight_does_not_change_result() {
    let (graph, euler, u) = sod_1d(40);
    let description = EulerDescription::new(euler);
    let mut module = HyperbolicModule::new(&description, &graph, HyperbolicConfig::default());
    module.prepare();

    let mut plain = u.clone();
    module.step(&u, [], &mut plain, 0.0).unwrap();

    let viscosity = SparseMatrix::new(graph.sparsity().clone(), 0.0);
    let stage = Stage {
        state: &u,
        viscosity: &viscosity,
        weight: 0.0,
    };
    let mut blended = u.clone();
    module.step(&u, [stage], &mut blended, 0.0).unwrap();

    assert_eq!(plain, blended);
}

#[test]
fn test_symmetric_viscosity_on_unstructured_rows() {
    let graph = OfflineData::assemble(&SimplexMesh::rectangle(0.0, 1.0, 0.0, 1.0, 5, 4)).unwrap();
    let euler = Euler::<2>::air();
    let description = EulerDescription::new(euler);
    let u: Vec<State<4>> = (0..graph.n_nodes())
        .map(|i| {
            let [x, y] = graph.position(i);
            euler.from_primitive(&State::new([1.0 + x, y - 0.5, x * y, 1.0 + 0.5 * y]))
        })
        .collect();

    let mut module = HyperbolicModule::new(&description, &graph, HyperbolicConfig::default());
    module.prepare();
    module.compute_tau_max(&u).unwrap();
    let dij = module.viscosity().unwrap();

    let pattern = graph.sparsity();
    for i in 0..graph.n_nodes() {
        for k in pattern.row(i).skip(1) {
            assert_eq!(dij[k], dij.transposed(k));
            assert!(dij[k] > 0.0);
        }
        let d_ii = dij[pattern.row_start(i)];
        let off_diagonal: f64 = dij.row(i)[1..].iter().sum();
        assert_eq!(d_ii, -off_diagonal);
    }
}
