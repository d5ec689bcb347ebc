//! Convex limiting of high-order corrections.
//!
//! The limited update is a convex combination of candidate states
//! `U_i^L + l_ij P_ij`. If every candidate satisfies a set of convex
//! constraints built from the low-order solution, so does the result. A
//! limiter provides:
//! - local bounds computed from a node and its graph neighbors
//! - the largest `t ∈ [t_min, t_max]` keeping `U + t P` within those bounds
//!
//! Linear constraints (density, depth) are solved exactly. The remaining
//! constraint is concave along the line and is handled by
//! [`LineSearch::concave`]: a secant step gives a guaranteed lower bound on
//! the admissible `t`, optionally refined by a few bracketing iterations.
//!
//! # Implementation Notes
//!
//! - `limit` must return `t_min` when `U` itself sits on the boundary
//! - `limit` must never increase when the bounds are tightened
//! - the returned flag only reports whether refinement was consistent;
//!   the returned `t` is safe either way

mod euler;
mod shallow_water;

pub use euler::{EulerBounds, EulerLimiter};
pub use shallow_water::{ShallowWaterBounds, ShallowWaterLimiter};

use std::fmt::Debug;

use crate::types::State;

/// Bounds-based convex limiter of an equation family.
pub trait Limiter<const DIM: usize, const N: usize>: Send + Sync {
    /// Per-node bounds on the tracked quantities.
    type Bounds: Copy + Debug + Default + Send + Sync;

    /// Bounds containing exactly the tracked quantities of `u`.
    fn bounds_from_state(&self, u: &State<N>) -> Self::Bounds;

    /// Widen `bounds` so that they contain the quantities of `u`.
    fn accumulate(&self, bounds: &mut Self::Bounds, u: &State<N>);

    /// Relax bounds by a relative factor in `[0, 1)`.
    fn relax(&self, bounds: &Self::Bounds, factor: f64) -> Self::Bounds;

    /// Largest `t ∈ [t_min, t_max]` with `u + t p` inside `bounds`.
    ///
    /// # Arguments
    /// * `bounds` - Bounds of the node `u` belongs to
    /// * `u` - Low-order state, assumed inside `bounds`
    /// * `p` - Correction direction
    /// * `t_min` - Coefficient returned when no correction is admissible
    /// * `t_max` - Coefficient returned when the full correction is admissible
    ///
    /// # Returns
    /// `(t, consistent)`: `consistent` is false when iterative refinement
    /// was discarded in favor of the closed-form bound.
    fn limit(
        &self,
        bounds: &Self::Bounds,
        u: &State<N>,
        p: &State<N>,
        t_min: f64,
        t_max: f64,
    ) -> (f64, bool);

    /// Whether `u` satisfies `bounds` up to a relative tolerance.
    fn is_within(&self, bounds: &Self::Bounds, u: &State<N>, tolerance: f64) -> bool;

    /// Min/max of the tracked quantities over a node and its neighbors.
    fn compute_bounds<'a>(
        &self,
        u_i: &State<N>,
        neighbors: impl IntoIterator<Item = &'a State<N>>,
    ) -> Self::Bounds {
        let mut bounds = self.bounds_from_state(u_i);
        for u_j in neighbors {
            self.accumulate(&mut bounds, u_j);
        }
        bounds
    }
}

/// Scalar search along a line for concave constraints.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineSearch {
    /// Bracketing iterations after the secant bound (0 = closed form only)
    pub newton_max_iter: usize,
    /// Relative tolerance for convergence and consistency checks
    pub newton_tolerance: f64,
}

impl Default for LineSearch {
    fn default() -> Self {
        Self {
            newton_max_iter: 0,
            newton_tolerance: 1e-10,
        }
    }
}

impl LineSearch {
    /// Largest `t ∈ [t_lo, t_hi]` with `ψ(t) ≥ 0` for a concave `ψ`.
    ///
    /// `psi` returns the value and the derivative at `t`. The secant
    /// through `(t_lo, ψ(t_lo))` and `(t_hi, ψ(t_hi))` lies below a concave
    /// function, so its root is admissible. Refinement keeps a bracket with
    /// an admissible left end (secant steps) and an inadmissible right end
    /// (Newton steps from the right).
    pub fn concave<F>(&self, psi: F, t_lo: f64, t_hi: f64) -> (f64, bool)
    where
        F: Fn(f64) -> (f64, f64),
    {
        let (psi_lo, _) = psi(t_lo);
        if !(psi_lo >= 0.0) {
            return (t_lo, true);
        }
        // Non-negative at both ends means non-negative in between.
        let (psi_hi, _) = psi(t_hi);
        if psi_hi >= 0.0 {
            return (t_hi, true);
        }
        if psi_lo == 0.0 {
            return (t_lo, true);
        }

        let closed_form = t_lo + (t_hi - t_lo) * psi_lo / (psi_lo - psi_hi);
        if !closed_form.is_finite() {
            return (t_lo, true);
        }
        if self.newton_max_iter == 0 {
            return (closed_form, true);
        }

        let (mut t_l, mut t_r) = (closed_form, t_hi);
        for _ in 0..self.newton_max_iter {
            if t_r - t_l <= self.newton_tolerance * t_r.abs().max(1.0) {
                break;
            }
            let (psi_l, _) = psi(t_l);
            let (psi_r, dpsi_r) = psi(t_r);
            if !(psi_l >= 0.0) || psi_r >= 0.0 {
                break;
            }

            let next_l = t_l + (t_r - t_l) * psi_l / (psi_l - psi_r);
            let next_r = if dpsi_r < 0.0 {
                t_r - psi_r / dpsi_r
            } else {
                t_r
            };
            if !next_l.is_finite() || !next_r.is_finite() || next_r < next_l {
                break;
            }
            t_l = t_l.max(next_l);
            t_r = t_r.min(next_r);
        }

        let (psi_final, _) = psi(t_l);
        if t_l.is_finite() && psi_final >= -self.newton_tolerance * psi_lo {
            (t_l.max(closed_form), true)
        } else {
            (closed_form, false)
        }
    }
}

/// Largest `t ∈ [t_min, t_max]` with `lower ≤ x + t dx ≤ upper`.
#[inline]
pub(crate) fn linear_bound(x: f64, dx: f64, lower: f64, upper: f64, t_min: f64, t_max: f64) -> f64 {
    let mut t = t_max;
    if dx < 0.0 {
        t = t.min((lower - x) / dx);
    } else if dx > 0.0 {
        t = t.min((upper - x) / dx);
    }
    t.max(t_min)
}
