//! Property-based tests for the convex limiters.
//!
//! Tightening the bounds of a node never lets a larger share of the
//! correction through.

use idp_rs::equations::{Euler, HyperbolicSystem, ShallowWater};
use idp_rs::limiter::{EulerLimiter, Limiter, ShallowWaterLimiter};
use idp_rs::types::State;
use proptest::prelude::*;

fn depth() -> impl Strategy<Value = f64> {
    prop_oneof![Just(0.0), 1e-10f64..1e-7, 0.01f64..5.0]
}

fn shallow_water_state(h: f64, v: f64) -> State<2> {
    State::new([h, h * v])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn euler_limiter_is_monotone_in_bounds(
        rho in 0.05f64..5.0, v in -2.0f64..2.0, p in 0.05f64..5.0,
        rho_n in 0.05f64..5.0, v_n in -2.0f64..2.0, p_n in 0.05f64..5.0,
        d_rho in -2.0f64..2.0, d_m in -2.0f64..2.0, d_e in -5.0f64..5.0,
        widening in 0.0f64..0.5, shrink in 0.0f64..1.0,
    ) {
        let euler = Euler::<1>::air();
        let limiter = EulerLimiter::new(euler);
        let u = euler.from_primitive(&State::new([rho, v, p]));
        let neighbor = euler.from_primitive(&State::new([rho_n, v_n, p_n]));
        let correction = State::new([d_rho, d_m, d_e]);

        let local = limiter.compute_bounds(&u, [&neighbor]);
        let wide = Limiter::<1, 3>::relax(&limiter, &local, widening);
        let tight = Limiter::<1, 3>::relax(&limiter, &local, widening * shrink);

        let (t_wide, _) = limiter.limit(&wide, &u, &correction, 0.0, 1.0);
        let (t_tight, _) = limiter.limit(&tight, &u, &correction, 0.0, 1.0);
        prop_assert!((0.0..=1.0).contains(&t_tight));
        prop_assert!(t_tight <= t_wide + 1e-12, "tight {} wide {}", t_tight, t_wide);
    }

    /// Dry and near-dry nodes included.
    #[test]
    fn shallow_water_limiter_is_monotone_in_bounds(
        h in depth(), v in -2.0f64..2.0,
        h_n in depth(), v_n in -2.0f64..2.0,
        d_h in -1.0f64..1.0, d_q in -2.0f64..2.0,
        widening in 0.0f64..0.5, shrink in 0.0f64..1.0,
    ) {
        let limiter = ShallowWaterLimiter::new(ShallowWater::<1>::new(1.0));
        let u = shallow_water_state(h, v);
        let neighbor = shallow_water_state(h_n, v_n);
        let correction = State::new([d_h, d_q]);

        let local = limiter.compute_bounds(&u, [&neighbor]);
        let wide = Limiter::<1, 2>::relax(&limiter, &local, widening);
        let tight = Limiter::<1, 2>::relax(&limiter, &local, widening * shrink);

        let (t_wide, _) = limiter.limit(&wide, &u, &correction, 0.0, 1.0);
        let (t_tight, _) = limiter.limit(&tight, &u, &correction, 0.0, 1.0);
        prop_assert!((0.0..=1.0).contains(&t_tight));
        prop_assert!(t_tight <= t_wide + 1e-12, "tight {} wide {}", t_tight, t_wide);
    }

    /// A zero kinetic bound admits no discharge, whatever the depth change.
    #[test]
    fn dry_node_at_rest_gains_no_discharge(
        h_max in 0.01f64..1.0, d_h in -1.0f64..1.0, d_q in -2.0f64..2.0,
    ) {
        let swe = ShallowWater::<1>::new(1.0);
        let limiter = ShallowWaterLimiter::new(swe);
        let u = State::new([0.0, 0.0]);
        let bounds = limiter.compute_bounds(&u, [&State::new([h_max, 0.0])]);
        let correction = State::new([d_h, d_q]);

        let (t, _) = limiter.limit(&bounds, &u, &correction, 0.0, 1.0);
        let mut w = u;
        w.add_scaled(t, &correction);
        prop_assert!(swe.is_admissible(&w));
        prop_assert!(swe.kinetic_energy(&w) <= 0.0, "{:?}", w);
    }
}
