//! Depth and kinetic energy limiting for the shallow water equations.
//!
//! The depth is bounded from both sides; the kinetic energy density
//! `|q|²/(2h)` is bounded from above. `κ_max - |q|²/(2h)` is concave in
//! `(h, q)` for `h > 0`, so the same line search as the Euler entropy
//! applies. At zero depth the constraint holds only for zero discharge.

use super::{Limiter, LineSearch, linear_bound};
use crate::equations::{HyperbolicSystem, ShallowWater};
use crate::types::{State, dot};

/// Local bounds of the shallow water limiter.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ShallowWaterBounds {
    pub h_min: f64,
    pub h_max: f64,
    pub kinetic_max: f64,
}

/// Convex limiter for the shallow water equations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShallowWaterLimiter<const DIM: usize> {
    pub system: ShallowWater<DIM>,
    pub line_search: LineSearch,
}

impl<const DIM: usize> ShallowWaterLimiter<DIM> {
    pub fn new(system: ShallowWater<DIM>) -> Self {
        Self {
            system,
            line_search: LineSearch::default(),
        }
    }

    pub fn with_newton(mut self, max_iter: usize, tolerance: f64) -> Self {
        self.line_search = LineSearch {
            newton_max_iter: max_iter,
            newton_tolerance: tolerance,
        };
        self
    }

    fn kinetic_constraint<const N: usize>(
        &self,
        kinetic_max: f64,
        u: &State<N>,
        p: &State<N>,
        t: f64,
    ) -> (f64, f64) {
        let mut w = *u;
        w.add_scaled(t, p);

        let h = w[0];
        let q = self.system.discharge(&w);
        let dq = self.system.discharge(p);
        let q_squared = dot(&q, &q);

        if h <= 0.0 {
            let value = if q_squared == 0.0 {
                kinetic_max
            } else {
                f64::NEG_INFINITY
            };
            return (value, 0.0);
        }

        let value = kinetic_max - 0.5 * q_squared / h;
        let derivative = -dot(&q, &dq) / h + 0.5 * q_squared * p[0] / (h * h);
        (value, derivative)
    }
}

impl<const DIM: usize, const N: usize> Limiter<DIM, N> for ShallowWaterLimiter<DIM>
where
    ShallowWater<DIM>: HyperbolicSystem<DIM, N>,
{
    type Bounds = ShallowWaterBounds;

    fn bounds_from_state(&self, u: &State<N>) -> ShallowWaterBounds {
        ShallowWaterBounds {
            h_min: u[0],
            h_max: u[0],
            kinetic_max: self.system.kinetic_energy(u),
        }
    }

    fn accumulate(&self, bounds: &mut ShallowWaterBounds, u: &State<N>) {
        bounds.h_min = bounds.h_min.min(u[0]);
        bounds.h_max = bounds.h_max.max(u[0]);
        bounds.kinetic_max = bounds.kinetic_max.max(self.system.kinetic_energy(u));
    }

    fn relax(&self, bounds: &ShallowWaterBounds, factor: f64) -> ShallowWaterBounds {
        let r = factor.clamp(0.0, 0.5);
        ShallowWaterBounds {
            h_min: (1.0 - r) * bounds.h_min,
            h_max: (1.0 + r) * bounds.h_max,
            kinetic_max: (1.0 + r) * bounds.kinetic_max,
        }
    }

    fn limit(
        &self,
        bounds: &ShallowWaterBounds,
        u: &State<N>,
        p: &State<N>,
        t_min: f64,
        t_max: f64,
    ) -> (f64, bool) {
        let t_h = linear_bound(u[0], p[0], bounds.h_min, bounds.h_max, t_min, t_max);
        if t_h <= t_min {
            return (t_min, true);
        }

        let t_hi = if p[0] < 0.0 {
            t_max.min(-0.5 * u[0] / p[0]).max(t_min)
        } else {
            t_max
        };
        let (t_k, consistent) = self.line_search.concave(
            |t| self.kinetic_constraint(bounds.kinetic_max, u, p, t),
            t_min,
            t_hi,
        );

        (t_h.min(t_k), consistent)
    }

    fn is_within(&self, bounds: &ShallowWaterBounds, u: &State<N>, tolerance: f64) -> bool {
        let h = u[0];
        h >= bounds.h_min * (1.0 - tolerance)
            && h <= bounds.h_max * (1.0 + tolerance)
            && self.system.kinetic_energy(u) <= bounds.kinetic_max * (1.0 + tolerance)
    }
}
