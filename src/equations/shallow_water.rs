//! Shallow water equations over a flat bottom.
//!
//! ∂h/∂t + ∇·q = 0
//! ∂q/∂t + ∇·(q ⊗ v + ½ g h² I) = 0
//!
//! where:
//! - h = water depth
//! - q = hv = discharge
//! - g = gravitational acceleration
//!
//! The conserved state is `[h, q_1, .., q_DIM]`, so `N = DIM + 1`.

use super::{HyperbolicSystem, RiemannData};
use crate::types::{FluxTensor, Point, State, dot};

/// Shallow water equations in `DIM` dimensions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShallowWater<const DIM: usize> {
    /// Gravitational acceleration (default 9.81 m/s²)
    pub gravity: f64,
    /// Depth below which a node counts as dry (default 1e-6)
    pub dry_tolerance: f64,
}

impl<const DIM: usize> ShallowWater<DIM> {
    /// Create with a given gravitational acceleration.
    pub fn new(gravity: f64) -> Self {
        Self {
            gravity,
            dry_tolerance: 1e-6,
        }
    }

    /// Create with a custom dry tolerance.
    pub fn with_dry_tolerance(mut self, dry_tolerance: f64) -> Self {
        self.dry_tolerance = dry_tolerance;
        self
    }

    /// Standard gravity (9.81 m/s²).
    pub fn standard() -> Self {
        Self::new(9.81)
    }

    /// Discharge vector.
    #[inline]
    pub fn discharge<const N: usize>(&self, u: &State<N>) -> Point<DIM> {
        std::array::from_fn(|d| u[1 + d])
    }

    /// Velocity with desingularization.
    ///
    /// v = 2 h q / (h² + max(h, h_dry)²)
    #[inline]
    pub fn velocity<const N: usize>(&self, u: &State<N>) -> Point<DIM> {
        let h = u[0];
        let h_reg = h.max(self.dry_tolerance);
        let factor = 2.0 * h / (h * h + h_reg * h_reg);
        std::array::from_fn(|d| factor * u[1 + d])
    }

    /// Wave celerity c = sqrt(g h).
    #[inline]
    pub fn celerity(&self, h: f64) -> f64 {
        (self.gravity * h.max(0.0)).sqrt()
    }

    /// Kinetic energy density ½ q·v, zero on dry nodes.
    #[inline]
    pub fn kinetic_energy<const N: usize>(&self, u: &State<N>) -> f64 {
        0.5 * dot(&self.discharge(u), &self.velocity(u))
    }

    /// Whether the node counts as dry.
    #[inline]
    pub fn is_dry(&self, h: f64) -> bool {
        h <= self.dry_tolerance
    }

    /// Transported discharge `h v` with the desingularized velocity.
    ///
    /// Equal to `q` on wet nodes, vanishing with `h²` on dry ones. The flux
    /// transports this instead of `q`, matching the velocity the wave speed
    /// estimate sees.
    #[inline]
    pub fn transported_discharge<const N: usize>(&self, u: &State<N>) -> Point<DIM> {
        let h = u[0];
        let v = self.velocity(u);
        std::array::from_fn(|d| h * v[d])
    }

    fn flux_impl<const N: usize>(&self, u: &State<N>) -> FluxTensor<DIM, N> {
        debug_assert_eq!(N, DIM + 1);
        let h = u[0];
        let q = self.transported_discharge(u);
        let v = self.velocity(u);
        let p = 0.5 * self.gravity * h * h;

        std::array::from_fn(|d| {
            let mut column = State::zero();
            column[0] = q[d];
            for k in 0..DIM {
                column[1 + k] = q[k] * v[d];
            }
            column[1 + d] += p;
            column
        })
    }

    fn is_admissible_impl<const N: usize>(&self, u: &State<N>) -> bool {
        u.is_finite() && u[0] >= 0.0
    }

    fn riemann_data_impl<const N: usize>(&self, u: &State<N>, n: &Point<DIM>) -> RiemannData {
        let h = u[0];
        RiemannData {
            density: h,
            velocity: dot(&self.velocity(u), n),
            pressure: 0.5 * self.gravity * h * h,
            sound_speed: self.celerity(h),
        }
    }

    fn to_primitive_impl<const N: usize>(&self, u: &State<N>) -> State<N> {
        let v = self.velocity(u);
        let mut w = State::zero();
        w[0] = u[0];
        for d in 0..DIM {
            w[1 + d] = v[d];
        }
        w
    }

    fn from_primitive_impl<const N: usize>(&self, w: &State<N>) -> State<N> {
        let mut u = State::zero();
        u[0] = w[0];
        for d in 0..DIM {
            u[1 + d] = w[0] * w[1 + d];
        }
        u
    }
}

impl<const DIM: usize> Default for ShallowWater<DIM> {
    fn default() -> Self {
        Self::standard()
    }
}

macro_rules! impl_shallow_water_system {
    ($dim:literal, $n:literal) => {
        impl HyperbolicSystem<$dim, $n> for ShallowWater<$dim> {
            fn name(&self) -> &'static str {
                "shallow water"
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

impl_shallow_water_system!(1, 2);
impl_shallow_water_system!(2, 3);
