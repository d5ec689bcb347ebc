//! Density and specific entropy limiting for the Euler equations.
//!
//! Tracked quantities per node:
//! - density bounds `ρ_min ≤ ρ ≤ ρ_max` (linear in U)
//! - a lower bound on the specific entropy surrogate `s = ρe ρ^(-γ)`,
//!   enforced through `ψ(U) = ρe(U) - s_min ρ^γ ≥ 0`, which is concave
//!
//! `ψ ≥ 0` with `s_min > 0` implies positive internal energy, so the
//! bounds imply admissibility.

use super::{Limiter, LineSearch, linear_bound};
use crate::equations::{Euler, HyperbolicSystem};
use crate::types::{State, dot};

/// Local bounds of the Euler limiter.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EulerBounds {
    pub rho_min: f64,
    pub rho_max: f64,
    pub s_min: f64,
}

/// Convex limiter for the Euler equations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EulerLimiter<const DIM: usize> {
    pub system: Euler<DIM>,
    pub line_search: LineSearch,
}

impl<const DIM: usize> EulerLimiter<DIM> {
    pub fn new(system: Euler<DIM>) -> Self {
        Self {
            system,
            line_search: LineSearch::default(),
        }
    }

    /// Enable bracketing refinement of the entropy constraint.
    pub fn with_newton(mut self, max_iter: usize, tolerance: f64) -> Self {
        self.line_search = LineSearch {
            newton_max_iter: max_iter,
            newton_tolerance: tolerance,
        };
        self
    }

    /// ψ(U + tP) and its derivative in t.
    fn entropy_constraint<const N: usize>(
        &self,
        s_min: f64,
        u: &State<N>,
        p: &State<N>,
        t: f64,
    ) -> (f64, f64) {
        let gamma = self.system.gamma;
        let mut w = *u;
        w.add_scaled(t, p);

        let rho = w[0];
        let m = self.system.momentum(&w);
        let dm = self.system.momentum(p);
        let m_squared = dot(&m, &m);

        let rho_e = w[DIM + 1] - 0.5 * m_squared / rho;
        let d_rho_e = p[DIM + 1] - dot(&m, &dm) / rho + 0.5 * m_squared * p[0] / (rho * rho);

        let rho_gamma = rho.powf(gamma);
        let value = rho_e - s_min * rho_gamma;
        let derivative = d_rho_e - s_min * gamma * rho_gamma / rho * p[0];
        (value, derivative)
    }
}

impl<const DIM: usize, const N: usize> Limiter<DIM, N> for EulerLimiter<DIM>
where
    Euler<DIM>: HyperbolicSystem<DIM, N>,
{
    type Bounds = EulerBounds;

    fn bounds_from_state(&self, u: &State<N>) -> EulerBounds {
        EulerBounds {
            rho_min: u[0],
            rho_max: u[0],
            s_min: self.system.specific_entropy(u),
        }
    }

    fn accumulate(&self, bounds: &mut EulerBounds, u: &State<N>) {
        bounds.rho_min = bounds.rho_min.min(u[0]);
        bounds.rho_max = bounds.rho_max.max(u[0]);
        bounds.s_min = bounds.s_min.min(self.system.specific_entropy(u));
    }

    fn relax(&self, bounds: &EulerBounds, factor: f64) -> EulerBounds {
        let r = factor.clamp(0.0, 0.5);
        EulerBounds {
            rho_min: (1.0 - r) * bounds.rho_min,
            rho_max: (1.0 + r) * bounds.rho_max,
            s_min: (1.0 - r) * bounds.s_min,
        }
    }

    fn limit(
        &self,
        bounds: &EulerBounds,
        u: &State<N>,
        p: &State<N>,
        t_min: f64,
        t_max: f64,
    ) -> (f64, bool) {
        let t_rho = linear_bound(u[0], p[0], bounds.rho_min, bounds.rho_max, t_min, t_max);
        if t_rho <= t_min {
            return (t_min, true);
        }

        // The entropy search interval depends on U and P only, never on the
        // bounds: ρ stays above half its low-order value on [t_min, t_hi].
        let t_hi = if p[0] < 0.0 {
            t_max.min(-0.5 * u[0] / p[0]).max(t_min)
        } else {
            t_max
        };
        let (t_s, consistent) = self.line_search.concave(
            |t| self.entropy_constraint(bounds.s_min, u, p, t),
            t_min,
            t_hi,
        );

        (t_rho.min(t_s), consistent)
    }

    fn is_within(&self, bounds: &EulerBounds, u: &State<N>, tolerance: f64) -> bool {
        let rho = u[0];
        rho >= bounds.rho_min * (1.0 - tolerance)
            && rho <= bounds.rho_max * (1.0 + tolerance)
            && self.system.specific_entropy(u) >= bounds.s_min * (1.0 - tolerance)
    }
}
