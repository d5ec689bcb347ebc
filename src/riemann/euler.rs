//! Maximal wave speed of the Euler Riemann problem for a polytropic gas.
//!
//! With `φ(p) = f(p, U_i) + f(p, U_j) + u_j - u_i`, the star pressure `p*`
//! is the root of `φ`. `φ` is increasing and concave, so:
//! - `φ(p_max) ≥ 0` means `p* ≤ p_max`
//! - the two-rarefaction pressure `p̃` is an upper bound on `p*` for
//!   `γ ∈ (1, 5/3]`
//!
//! The wave speeds `λ_1⁻(p)` and `λ_3⁺(p)` are monotone in `p`, so
//! evaluating them at any upper bound of `p*` bounds the true speeds.

use super::{RiemannSolver, WaveSpeedEstimate, negative_part, positive_part};
use crate::equations::{Euler, HyperbolicSystem, RiemannData};
use crate::types::{Point, State};

/// Guermond–Popov wave speed estimator for the Euler equations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EulerRiemannSolver<const DIM: usize> {
    /// The gas the states belong to
    pub system: Euler<DIM>,
    /// Bracketing iterations on `φ` (0 = closed form only)
    pub newton_max_iter: usize,
    /// Relative bracket width at which refinement stops
    pub newton_tolerance: f64,
}

impl<const DIM: usize> EulerRiemannSolver<DIM> {
    /// Closed-form estimator without refinement.
    pub fn new(system: Euler<DIM>) -> Self {
        Self {
            system,
            newton_max_iter: 0,
            newton_tolerance: 1e-10,
        }
    }

    /// Enable bracketing refinement.
    pub fn with_newton(mut self, max_iter: usize, tolerance: f64) -> Self {
        self.newton_max_iter = max_iter;
        self.newton_tolerance = tolerance;
        self
    }

    /// Estimate from already projected Riemann data.
    pub fn estimate_from_data(&self, left: &RiemannData, right: &RiemannData) -> WaveSpeedEstimate {
        let p_max = left.pressure.max(right.pressure);
        let p_tilde = self.p_star_two_rarefaction(left, right);
        let phi_p_max = self.phi(p_max, left, right);

        let p_2 = if phi_p_max < 0.0 {
            p_tilde
        } else {
            p_max.min(p_tilde)
        };

        let (p_star, iterations) = if self.newton_max_iter > 0 {
            self.refine(p_2, left, right)
        } else {
            (p_2, 0)
        };

        WaveSpeedEstimate {
            lambda_max: self.lambda_max_at(p_star, left, right),
            p_star,
            iterations,
        }
    }

    /// Star pressure of the two-rarefaction approximation.
    ///
    /// p̃ = p_j ((a_i + a_j - (γ-1)/2 (u_j - u_i))₊ / (a_i (p_i/p_j)^(-(γ-1)/(2γ)) + a_j))^(2γ/(γ-1))
    ///
    /// The positive part of the numerator maps vacuum formation to `p̃ = 0`.
    pub fn p_star_two_rarefaction(&self, left: &RiemannData, right: &RiemannData) -> f64 {
        let gamma = self.system.gamma;
        let factor = 0.5 * (gamma - 1.0);

        let numerator = positive_part(
            left.sound_speed + right.sound_speed - factor * (right.velocity - left.velocity),
        );
        let denominator = left.sound_speed * (left.pressure / right.pressure).powf(-factor / gamma)
            + right.sound_speed;

        right.pressure * (numerator / denominator).powf(gamma / factor)
    }

    /// φ(p) = f(p, U_i) + f(p, U_j) + u_j - u_i
    pub fn phi(&self, p: f64, left: &RiemannData, right: &RiemannData) -> f64 {
        self.wave_curve(p, left) + self.wave_curve(p, right) + right.velocity - left.velocity
    }

    fn dphi(&self, p: f64, left: &RiemannData, right: &RiemannData) -> f64 {
        self.wave_curve_derivative(p, left) + self.wave_curve_derivative(p, right)
    }

    /// Shock branch above `p_z`, rarefaction branch below.
    fn wave_curve(&self, p: f64, z: &RiemannData) -> f64 {
        let gamma = self.system.gamma;
        if p >= z.pressure {
            let a = 2.0 / ((gamma + 1.0) * z.density);
            let b = (gamma - 1.0) / (gamma + 1.0) * z.pressure;
            (p - z.pressure) * (a / (p + b)).sqrt()
        } else {
            let exponent = 0.5 * (gamma - 1.0) / gamma;
            2.0 * z.sound_speed / (gamma - 1.0) * ((p / z.pressure).powf(exponent) - 1.0)
        }
    }

    fn wave_curve_derivative(&self, p: f64, z: &RiemannData) -> f64 {
        let gamma = self.system.gamma;
        if p >= z.pressure {
            let a = 2.0 / ((gamma + 1.0) * z.density);
            let b = (gamma - 1.0) / (gamma + 1.0) * z.pressure;
            (a / (p + b)).sqrt() * (1.0 - 0.5 * (p - z.pressure) / (p + b))
        } else {
            let exponent = -0.5 * (gamma + 1.0) / gamma;
            (p / z.pressure).powf(exponent) / (z.density * z.sound_speed)
        }
    }

    /// max((λ_3⁺)₊, (λ_1⁻)₋) evaluated at a star pressure bound.
    pub fn lambda_max_at(&self, p_star: f64, left: &RiemannData, right: &RiemannData) -> f64 {
        let gamma = self.system.gamma;
        let factor = 0.5 * (gamma + 1.0) / gamma;

        let lambda_1 = left.velocity
            - left.sound_speed
                * (1.0 + factor * positive_part((p_star - left.pressure) / left.pressure)).sqrt();
        let lambda_3 = right.velocity
            + right.sound_speed
                * (1.0 + factor * positive_part((p_star - right.pressure) / right.pressure)).sqrt();

        positive_part(lambda_3).max(negative_part(lambda_1))
    }

    /// Shrink the bracket `[p_1, p_2]` around `p*`.
    ///
    /// Newton steps from below keep `p_1` a lower bound and chord steps keep
    /// `p_2` an upper bound, because `φ` is increasing and concave. Any
    /// non-finite intermediate returns the closed-form bound.
    fn refine(&self, p_closed_form: f64, left: &RiemannData, right: &RiemannData) -> (f64, usize) {
        let p_min = left.pressure.min(right.pressure);
        let mut p_1 = if self.phi(p_min, left, right) >= 0.0 {
            0.0
        } else {
            p_min
        };
        let mut p_2 = p_closed_form;

        for iteration in 0..self.newton_max_iter {
            if p_2 - p_1 <= self.newton_tolerance * p_2 {
                return (p_2, iteration);
            }

            let phi_1 = self.phi(p_1, left, right);
            let phi_2 = self.phi(p_2, left, right);
            if phi_1 > 0.0 || phi_2 <= 0.0 {
                // Vacuum (no root above p_1) or p_2 already at the root.
                return (p_2, iteration);
            }

            let next_1 = p_1 - phi_1 / self.dphi(p_1, left, right);
            let next_2 = p_2 - phi_2 * (p_2 - p_1) / (phi_2 - phi_1);

            if !next_1.is_finite() || !next_2.is_finite() {
                return (p_closed_form, iteration);
            }
            if next_2 < next_1 {
                return (p_2, iteration);
            }

            p_1 = p_1.max(next_1);
            p_2 = p_2.min(next_2);
        }

        (p_2, self.newton_max_iter)
    }
}

impl<const DIM: usize, const N: usize> RiemannSolver<DIM, N> for EulerRiemannSolver<DIM>
where
    Euler<DIM>: HyperbolicSystem<DIM, N>,
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

    fn sod() -> (Euler<1>, State<3>, State<3>) {
        let euler = Euler::<1>::air();
        let left = euler.from_primitive(&State::new([1.0, 0.0, 1.0]));
        let right = euler.from_primitive(&State::new([0.125, 0.0, 0.1]));
        (euler, left, right)
    }

    #[test]
    fn test_sod_closed_form() {
        let (euler, left, right) = sod();
        let solver = EulerRiemannSolver::new(euler);
        let estimate = solver.estimate(&left, &right, &[1.0]);

        // p* of Sod is 0.30313; the closed form bounds it from above
        assert!(estimate.p_star >= 0.30313);
        assert_relative_eq!(estimate.p_star, 0.306767, max_relative = 1e-5);
        assert_relative_eq!(estimate.lambda_max, 1.76209, max_relative = 1e-5);
        assert_eq!(estimate.iterations, 0);
    }

    #[test]
    fn test_refinement_tightens_bound() {
        let (euler, left, right) = sod();
        let closed = EulerRiemannSolver::new(euler).estimate(&left, &right, &[1.0]);
        let refined = EulerRiemannSolver::new(euler)
            .with_newton(20, 1e-12)
            .estimate(&left, &right, &[1.0]);

        assert!(refined.p_star <= closed.p_star);
        assert!(refined.lambda_max <= closed.lambda_max);
        assert_relative_eq!(refined.p_star, 0.303130, max_relative = 1e-5);
        // Exact right shock speed
        assert_relative_eq!(refined.lambda_max, 1.752155, max_relative = 1e-5);
        assert!(refined.iterations > 0);
    }

    #[test]
    fn test_uniform_state_is_sound_speed() {
        let euler = Euler::<2>::air();
        let solver = EulerRiemannSolver::new(euler);
        let u = euler.from_primitive(&State::new([0.7, 0.3, -0.2, 2.0]));
        let n = [0.6, 0.8];

        let lambda = solver.lambda_max(&u, &u, &n);
        let expected = (0.3 * 0.6 - 0.2 * 0.8_f64).abs() + euler.sound_speed(&u);
        assert_relative_eq!(lambda, expected, max_relative = 1e-12);
    }

    #[test]
    fn test_vacuum_generating_data_stays_finite() {
        let euler = Euler::<1>::air();
        let solver = EulerRiemannSolver::new(euler).with_newton(5, 1e-12);
        let left = euler.from_primitive(&State::new([1.0, -10.0, 0.4]));
        let right = euler.from_primitive(&State::new([1.0, 10.0, 0.4]));

        let estimate = solver.estimate(&left, &right, &[1.0]);
        assert_eq!(estimate.p_star, 0.0);
        assert!(estimate.lambda_max.is_finite());
        assert_relative_eq!(estimate.lambda_max, 10.0 + euler.sound_speed(&right));
    }
}
