//! Compressible Euler equations with a polytropic gas law.
//!
//! ∂ρ/∂t + ∇·m = 0
//! ∂m/∂t + ∇·(m ⊗ v + p I) = 0
//! ∂E/∂t + ∇·(v (E + p)) = 0
//!
//! where:
//! - ρ = density, m = ρv = momentum, E = total energy
//! - p = (γ - 1) ρe, with ρe = E - |m|²/(2ρ) the internal energy density
//!
//! The conserved state is `[ρ, m_1, .., m_DIM, E]`, so `N = DIM + 2`.

use super::{HyperbolicSystem, RiemannData};
use crate::types::{FluxTensor, Point, State, dot};

/// Euler equations of gas dynamics in `DIM` dimensions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Euler<const DIM: usize> {
    /// Ratio of specific heats
    pub gamma: f64,
}

impl<const DIM: usize> Euler<DIM> {
    /// Create with a given ratio of specific heats.
    pub fn new(gamma: f64) -> Self {
        debug_assert!(gamma > 1.0, "gamma must exceed 1");
        Self { gamma }
    }

    /// Diatomic ideal gas (γ = 1.4).
    pub fn air() -> Self {
        Self::new(1.4)
    }

    /// Momentum vector.
    #[inline]
    pub fn momentum<const N: usize>(&self, u: &State<N>) -> Point<DIM> {
        std::array::from_fn(|d| u[1 + d])
    }

    /// Internal energy density ρe = E - |m|²/(2ρ).
    #[inline]
    pub fn internal_energy<const N: usize>(&self, u: &State<N>) -> f64 {
        let m = self.momentum(u);
        u[DIM + 1] - 0.5 * dot(&m, &m) / u[0]
    }

    /// Pressure p = (γ - 1) ρe.
    #[inline]
    pub fn pressure<const N: usize>(&self, u: &State<N>) -> f64 {
        (self.gamma - 1.0) * self.internal_energy(u)
    }

    /// Speed of sound a = sqrt(γ p / ρ).
    #[inline]
    pub fn sound_speed<const N: usize>(&self, u: &State<N>) -> f64 {
        (self.gamma * self.pressure(u) / u[0]).sqrt()
    }

    /// Specific entropy surrogate s = ρe ρ^(-γ).
    ///
    /// Monotone in the physical specific entropy, and `ρe - s ρ^γ` is
    /// concave in the conserved variables, which is what the limiter needs.
    #[inline]
    pub fn specific_entropy<const N: usize>(&self, u: &State<N>) -> f64 {
        self.internal_energy(u) * u[0].powf(-self.gamma)
    }

    fn flux_impl<const N: usize>(&self, u: &State<N>) -> FluxTensor<DIM, N> {
        debug_assert_eq!(N, DIM + 2);
        let rho = u[0];
        let m = self.momentum(u);
        let energy = u[DIM + 1];
        let p = self.pressure(u);

        std::array::from_fn(|d| {
            let v_d = m[d] / rho;
            let mut column = State::zero();
            column[0] = m[d];
            for k in 0..DIM {
                column[1 + k] = m[k] * v_d;
            }
            column[1 + d] += p;
            column[DIM + 1] = v_d * (energy + p);
            column
        })
    }

    fn is_admissible_impl<const N: usize>(&self, u: &State<N>) -> bool {
        if !u.is_finite() || u[0] <= 0.0 {
            return false;
        }
        self.internal_energy(u) > 0.0
    }

    fn riemann_data_impl<const N: usize>(&self, u: &State<N>, n: &Point<DIM>) -> RiemannData {
        let rho = u[0];
        let p = self.pressure(u);
        RiemannData {
            density: rho,
            velocity: dot(&self.momentum(u), n) / rho,
            pressure: p,
            sound_speed: (self.gamma * p / rho).sqrt(),
        }
    }

    fn to_primitive_impl<const N: usize>(&self, u: &State<N>) -> State<N> {
        let rho = u[0];
        let mut w = State::zero();
        w[0] = rho;
        for d in 0..DIM {
            w[1 + d] = u[1 + d] / rho;
        }
        w[DIM + 1] = self.pressure(u);
        w
    }

    fn from_primitive_impl<const N: usize>(&self, w: &State<N>) -> State<N> {
        let rho = w[0];
        let mut u = State::zero();
        u[0] = rho;
        let mut kinetic = 0.0;
        for d in 0..DIM {
            u[1 + d] = rho * w[1 + d];
            kinetic += 0.5 * rho * w[1 + d] * w[1 + d];
        }
        u[DIM + 1] = w[DIM + 1] / (self.gamma - 1.0) + kinetic;
        u
    }
}

macro_rules! impl_euler_system {
    ($dim:literal, $n:literal) => {
        impl HyperbolicSystem<$dim, $n> for Euler<$dim> {
            fn name(&self) -> &'static str {
                "euler"
            }

            fn flux(&self, u: &State<$n>) -> FluxTensor<$dim, $n> {
                self.flux_impl(u)
            }

            fn is_admissible(&self, u: &State<$n>) -> bool {
                self.is_admissible_impl(u)
            }

            fn riemann_data(&self, u: &State<$n>, n: &Point<$dim>) -> RiemannData {
                self.riemann_data_impl(u, n)
            }

            fn to_primitive(&self, u: &State<$n>) -> State<$n> {
                self.to_primitive_impl(u)
            }

            fn from_primitive(&self, w: &State<$n>) -> State<$n> {
                self.from_primitive_impl(w)
            }
        }
    };
}

impl_euler_system!(1, 3);
impl_euler_system!(2, 4);
impl_euler_system!(3, 5);
