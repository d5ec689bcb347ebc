//! Maximal wave speed of the shallow water Riemann problem.
//!
//! Same structure as the Euler estimator with the depth in place of the
//! pressure. The two-rarefaction depth is exact when both waves are
//! rarefactions and an upper bound otherwise:
//!
//! ```text
//! h̃ = ((a_i + a_j)/2 - (u_j - u_i)/4)₊² / g
//! ```
//!
//! A dry side has no wave of its own: the wet side's rarefaction runs into
//! it with the dry front speed `u ± 2a`. Every estimate is at least
//! `max(u_j, -u_i)`, which keeps the depth of the bar states
//! `(U_i + U_j)/2 - (f(U_j) - f(U_i))·n / (2λ)` non-negative for any pair
//! of states, wet or dry.

use super::{RiemannSolver, WaveSpeedEstimate, negative_part, positive_part};
use crate::equations::{HyperbolicSystem, RiemannData, ShallowWater};
use crate::types::{Point, State};

/// Wave speed estimator for the shallow water equations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShallowWaterRiemannSolver<const DIM: usize> {
    pub system: ShallowWater<DIM>,
    pub newton_max_iter: usize,
    pub newton_tolerance: f64,
}

impl<const DIM: usize> ShallowWaterRiemannSolver<DIM> {
    pub fn new(system: ShallowWater<DIM>) -> Self {
        Self {
            system,
            newton_max_iter: 0,
            newton_tolerance: 1e-10,
        }
    }

    pub fn with_newton(mut self, max_iter: usize, tolerance: f64) -> Self {
        self.newton_max_iter = max_iter;
        self.newton_tolerance = tolerance;
        self
    }

    /// Estimate from already projected Riemann data.
    pub fn estimate_from_data(&self, left: &RiemannData, right: &RiemannData) -> WaveSpeedEstimate {
        let (h_i, h_j) = (left.density, right.density);
        let dry_i = self.system.is_dry(h_i);
        let dry_j = self.system.is_dry(h_j);

        let (lambda_1, lambda_3, h_star) = match (dry_i, dry_j) {
            (true, true) => (left.velocity, right.velocity, 0.0),
            // The near-dry side still moves mass at its own velocity.
            (false, true) => (
                left.velocity - left.sound_speed,
                (left.velocity + 2.0 * left.sound_speed).max(right.velocity),
                0.0,
            ),
            (true, false) => (
                (right.velocity - 2.0 * right.sound_speed).min(left.velocity),
                right.velocity + right.sound_speed,
                0.0,
            ),
            (false, false) => {
                let h_max = h_i.max(h_j);
                let h_tilde = self.h_star_two_rarefaction(left, right);
                let h_2 = if self.phi(h_max, left, right) < 0.0 {
                    h_tilde
                } else {
                    h_max.min(h_tilde)
                };
                let (h_star, iterations) = if self.newton_max_iter > 0 {
                    self.refine(h_2, left, right)
                } else {
                    (h_2, 0)
                };
                let (l1, l3) = self.wave_speeds_at(h_star, left, right);
                return WaveSpeedEstimate {
                    lambda_max: positive_part(l3).max(negative_part(l1)),
                    p_star: h_star,
                    iterations,
                };
            }
        };

        WaveSpeedEstimate {
            lambda_max: positive_part(lambda_3).max(negative_part(lambda_1)),
            p_star: h_star,
            iterations: 0,
        }
    }

    /// Depth of the two-rarefaction approximation.
    pub fn h_star_two_rarefaction(&self, left: &RiemannData, right: &RiemannData) -> f64 {
        let c = positive_part(
            0.5 * (left.sound_speed + right.sound_speed) - 0.25 * (right.velocity - left.velocity),
        );
        c * c / self.system.gravity
    }

    /// φ(h) = f(h, U_i) + f(h, U_j) + u_j - u_i
    pub fn phi(&self, h: f64, left: &RiemannData, right: &RiemannData) -> f64 {
        self.wave_curve(h, left.density) + self.wave_curve(h, right.density) + right.velocity
            - left.velocity
    }

    fn wave_curve(&self, h: f64, h_z: f64) -> f64 {
        let g = self.system.gravity;
        if h >= h_z {
            (h - h_z) * (0.5 * g * (h + h_z) / (h * h_z)).sqrt()
        } else {
            2.0 * ((g * h).sqrt() - (g * h_z).sqrt())
        }
    }

    fn wave_curve_derivative(&self, h: f64, h_z: f64) -> f64 {
        let g = self.system.gravity;
        if h >= h_z {
            let s = (0.5 * g * (h + h_z) / (h * h_z)).sqrt();
            s - (h - h_z) * g / (4.0 * s * h * h)
        } else {
            (g / h).sqrt()
        }
    }

    fn wave_speeds_at(&self, h: f64, left: &RiemannData, right: &RiemannData) -> (f64, f64) {
        let speed_factor = |h_z: f64| {
            let x = (h - h_z) / h_z;
            ((1.0 + positive_part(0.5 * x)) * (1.0 + positive_part(x))).sqrt()
        };
        (
            left.velocity - left.sound_speed * speed_factor(left.density),
            right.velocity + right.sound_speed * speed_factor(right.density),
        )
    }

    fn refine(&self, h_closed_form: f64, left: &RiemannData, right: &RiemannData) -> (f64, usize) {
        let h_min = left.density.min(right.density);
        let mut h_1 = if self.phi(h_min, left, right) >= 0.0 {
            0.0
        } else {
            h_min
        };
        let mut h_2 = h_closed_form;

        for iteration in 0..self.newton_max_iter {
            if h_2 - h_1 <= self.newton_tolerance * h_2 {
                return (h_2, iteration);
            }

            let phi_1 = self.phi(h_1, left, right);
            let phi_2 = self.phi(h_2, left, right);
            if phi_1 > 0.0 || phi_2 <= 0.0 {
                return (h_2, iteration);
            }

            let dphi_1 = self.wave_curve_derivative(h_1, left.density)
                + self.wave_curve_derivative(h_1, right.density);
            let next_1 = h_1 - phi_1 / dphi_1;
            let next_2 = h_2 - phi_2 * (h_2 - h_1) / (phi_2 - phi_1);

            if !next_1.is_finite() || !next_2.is_finite() {
                return (h_closed_form, iteration);
            }
            if next_2 < next_1 {
                return (h_2, iteration);
            }

            h_1 = h_1.max(next_1);
            h_2 = h_2.min(next_2);
        }

        (h_2, self.newton_max_iter)
    }
}

impl<const DIM: usize, const N: usize> RiemannSolver<DIM, N> for ShallowWaterRiemannSolver<DIM>
where
    ShallowWater<DIM>: HyperbolicSystem<DIM, N>,
{
    fn estimate(&self, u_i: &State<N>, u_j: &State<N>, n_ij: &Point<DIM>) -> WaveSpeedEstimate {
        debug_assert!(self.system.is_admissible(u_i), "inadmissible left state");
        debug_assert!(self.system.is_admissible(u_j), "inadmissible right state");

        let left = self.system.riemann_data(u_i, n_ij);
        let right = self.system.riemann_data(u_j, n_ij);
        self.estimate_from_data(&left, &right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_uniform_state_is_celerity() {
        let swe = ShallowWater::<1>::new(9.81);
        let solver = ShallowWaterRiemannSolver::new(swe);
        let u = State::new([2.0, 1.0]);
        let lambda = solver.lambda_max(&u, &u, &[1.0]);
        assert_relative_eq!(lambda, 0.5 + (9.81_f64 * 2.0).sqrt(), max_relative = 1e-12);
    }

    #[test]
    fn test_dam_break_bounds_shock_speed() {
        // h_L = 1, h_R = 0.5, g = 1: star depth 0.72692, shock speed 0.94439
        let swe = ShallowWater::<1>::new(1.0);
        let solver = ShallowWaterRiemannSolver::new(swe);
        let estimate = solver.estimate(&State::new([1.0, 0.0]), &State::new([0.5, 0.0]), &[1.0]);

        assert!(estimate.p_star >= 0.72692);
        assert!(estimate.lambda_max >= 0.94439);
        assert!(estimate.lambda_max <= 0.94439 * 1.01);

        let refined = ShallowWaterRiemannSolver::new(swe)
            .with_newton(20, 1e-12)
            .estimate(&State::new([1.0, 0.0]), &State::new([0.5, 0.0]), &[1.0]);
        assert!(refined.lambda_max <= estimate.lambda_max);
        assert_relative_eq!(refined.p_star, 0.726920, max_relative = 1e-5);
    }

    #[test]
    fn test_dry_right_state() {
        let swe = ShallowWater::<1>::new(1.0);
        let solver = ShallowWaterRiemannSolver::new(swe);
        let estimate = solver.estimate(&State::new([1.0, 0.0]), &State::new([0.0, 0.0]), &[1.0]);
        // Dry front travels at 2 sqrt(g h_L)
        assert_relative_eq!(estimate.lambda_max, 2.0);
    }

    #[test]
    fn test_near_dry_side_velocity_is_bounded() {
        let swe = ShallowWater::<1>::new(1.0).with_dry_tolerance(1e-3);
        let solver = ShallowWaterRiemannSolver::new(swe);
        let wet = State::new([1e-2, -1e-2]);
        // Depth below the dry tolerance, desingularized velocity ≈ 2
        let dry = State::new([5e-4, 2.5e-3]);
        let v_dry = swe.velocity(&dry)[0];
        assert!(v_dry > 1.9);

        let lambda = solver.lambda_max(&wet, &dry, &[1.0]);
        assert!(lambda >= v_dry);
        let lambda = solver.lambda_max(&dry, &wet, &[-1.0]);
        assert!(lambda >= v_dry);
    }

    #[test]
    fn test_both_dry() {
        let swe = ShallowWater::<1>::new(1.0);
        let solver = ShallowWaterRiemannSolver::new(swe);
        let zero = State::new([0.0, 0.0]);
        assert_eq!(solver.lambda_max(&zero, &zero, &[1.0]), 0.0);
    }
}
