//! Property-based tests for the maximal wave speed estimators.
//!
//! Checks non-negativity, invariance under swapping the states and
//! reversing the direction, the uniform-state limit, and the Sod shock
//! tube bound.

use approx::assert_relative_eq;
use idp_rs::equations::{Euler, HyperbolicSystem, ShallowWater};
use idp_rs::riemann::{EulerRiemannSolver, RiemannSolver, ShallowWaterRiemannSolver};
use idp_rs::types::{State, unit};
use proptest::prelude::*;

fn euler_state(rho: f64, vx: f64, vy: f64, p: f64) -> State<4> {
    Euler::<2>::air().from_primitive(&State::new([rho, vx, vy, p]))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// λ_max(U_i, U_j, n) = λ_max(U_j, U_i, -n) ≥ 0 for admissible Euler states.
    #[test]
    fn euler_lambda_is_symmetric_and_nonnegative(
        rho_i in 0.01f64..10.0, vx_i in -5.0f64..5.0, vy_i in -5.0f64..5.0, p_i in 0.01f64..10.0,
        rho_j in 0.01f64..10.0, vx_j in -5.0f64..5.0, vy_j in -5.0f64..5.0, p_j in 0.01f64..10.0,
        angle in 0.0f64..std::f64::consts::TAU,
    ) {
        let solver = EulerRiemannSolver::new(Euler::<2>::air());
        let u_i = euler_state(rho_i, vx_i, vy_i, p_i);
        let u_j = euler_state(rho_j, vx_j, vy_j, p_j);
        let n = [angle.cos(), angle.sin()];

        let forward = solver.lambda_max(&u_i, &u_j, &n);
        let backward = solver.lambda_max(&u_j, &u_i, &[-n[0], -n[1]]);

        prop_assert!(forward >= 0.0);
        prop_assert!(forward.is_finite());
        prop_assert!(
            (forward - backward).abs() <= 1e-10 * forward.max(1.0),
            "forward {} backward {}", forward, backward
        );
    }

    /// Identical states give |u·n| + a, the speed of the fastest acoustic wave.
    #[test]
    fn euler_uniform_state_gives_acoustic_speed(
        rho in 0.01f64..10.0, vx in -5.0f64..5.0, vy in -5.0f64..5.0, p in 0.01f64..10.0,
        nx in -1.0f64..1.0, ny in -1.0f64..1.0,
    ) {
        prop_assume!(nx * nx + ny * ny > 1e-4);
        let euler = Euler::<2>::air();
        let solver = EulerRiemannSolver::new(euler);
        let u = euler_state(rho, vx, vy, p);
        let n = unit(&[nx, ny]);

        let expected = (vx * n[0] + vy * n[1]).abs() + euler.sound_speed(&u);
        let lambda = solver.lambda_max(&u, &u, &n);
        prop_assert!((lambda - expected).abs() <= 1e-10 * expected);
    }

    /// Refinement only tightens the closed-form bound.
    #[test]
    fn euler_refinement_stays_an_upper_bound(
        rho_i in 0.01f64..10.0, v_i in -3.0f64..3.0, p_i in 0.01f64..10.0,
        rho_j in 0.01f64..10.0, v_j in -3.0f64..3.0, p_j in 0.01f64..10.0,
    ) {
        let euler = Euler::<1>::air();
        let closed = EulerRiemannSolver::new(euler);
        let refined = closed.with_newton(20, 1e-14);
        let u_i = euler.from_primitive(&State::new([rho_i, v_i, p_i]));
        let u_j = euler.from_primitive(&State::new([rho_j, v_j, p_j]));

        let fast = closed.estimate(&u_i, &u_j, &[1.0]);
        let slow = refined.estimate(&u_i, &u_j, &[1.0]);
        prop_assert!(slow.p_star <= fast.p_star * (1.0 + 1e-12));
        prop_assert!(slow.lambda_max <= fast.lambda_max * (1.0 + 1e-12));
    }

    /// Same properties for shallow water, dry states included.
    #[test]
    fn shallow_water_lambda_is_symmetric_and_nonnegative(
        h_i in 0.0f64..5.0, q_i in -5.0f64..5.0,
        h_j in 0.0f64..5.0, q_j in -5.0f64..5.0,
    ) {
        let swe = ShallowWater::<1>::standard();
        let solver = ShallowWaterRiemannSolver::new(swe);
        let u_i = State::new([h_i, if swe.is_dry(h_i) { 0.0 } else { q_i }]);
        let u_j = State::new([h_j, if swe.is_dry(h_j) { 0.0 } else { q_j }]);

        let forward = solver.lambda_max(&u_i, &u_j, &[1.0]);
        let backward = solver.lambda_max(&u_j, &u_i, &[-1.0]);

        prop_assert!(forward >= 0.0);
        prop_assert!(forward.is_finite());
        prop_assert!((forward - backward).abs() <= 1e-10 * forward.max(1.0));
    }
}

#[test]
fn test_sod_bound_is_within_one_percent_of_shock_speed() {
    let euler = Euler::<1>::air();
    let solver = EulerRiemannSolver::new(euler);
    let left = euler.from_primitive(&State::new([1.0, 0.0, 1.0]));
    let right = euler.from_primitive(&State::new([0.125, 0.0, 0.1]));

    // Exact right-moving shock speed of the Sod problem
    let shock_speed = 1.752_155_6;
    let lambda = solver.lambda_max(&left, &right, &[1.0]);
    assert!(lambda >= shock_speed);
    assert_relative_eq!(lambda, shock_speed, max_relative = 0.01);
}

#[test]
fn test_sod_bound_is_direction_independent_in_2d() {
    let euler = Euler::<2>::air();
    let solver = EulerRiemannSolver::new(euler);
    let n = unit(&[1.0, 1.0]);
    let left = euler.from_primitive(&State::new([1.0, 0.0, 0.0, 1.0]));
    let right = euler.from_primitive(&State::new([0.125, 0.0, 0.0, 0.1]));

    let lambda_2d = solver.lambda_max(&left, &right, &n);
    let lambda_1d = EulerRiemannSolver::new(Euler::<1>::air()).lambda_max(
        &State::new([1.0, 0.0, 2.5]),
        &State::new([0.125, 0.0, 0.25]),
        &[1.0],
    );
    assert_relative_eq!(lambda_2d, lambda_1d, max_relative = 1e-12);
}
