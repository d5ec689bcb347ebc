//! Hyperbolic systems of conservation laws.
//!
//! Provides a trait-based interface for systems of the form
//!
//! ∂U/∂t + ∇·f(U) = 0
//!
//! where U is the state vector and f the flux tensor. The time stepper needs
//! exactly four capabilities from an equation family: the flux, an
//! admissibility predicate, the projection of a state onto a direction as
//! 1D Riemann data, and conversions between conserved and primitive
//! variables. Everything else (wave speed estimates, limiter bounds) lives
//! in the [`crate::riemann`] and [`crate::limiter`] modules and is bundled
//! with the system by a [`Description`].

mod description;
mod euler;
mod shallow_water;

pub use description::{
    Description, EquationDescription, EulerDescription, ShallowWaterDescription,
};
pub use euler::Euler;
pub use shallow_water::ShallowWater;

use crate::types::{FluxTensor, Point, State};

/// One-dimensional Riemann data of a state projected onto a direction.
///
/// For Euler `pressure` is the thermodynamic pressure; for shallow water it
/// is the hydrostatic pressure `g h² / 2` and `density` is the water depth.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RiemannData {
    /// Density (or water depth)
    pub density: f64,
    /// Velocity component along the direction
    pub velocity: f64,
    /// Pressure
    pub pressure: f64,
    /// Speed of sound (or gravity wave celerity)
    pub sound_speed: f64,
}

/// A hyperbolic system of conservation laws in `DIM` dimensions with `N`
/// conserved variables.
///
/// # Example
///
/// ```
/// use idp_rs::equations::{Euler, HyperbolicSystem};
/// use idp_rs::types::State;
///
/// let euler = Euler::<1>::new(1.4);
/// let u = euler.from_primitive(&State::new([1.0, 0.0, 1.0]));
/// assert!(euler.is_admissible(&u));
///
/// let data = euler.riemann_data(&u, &[1.0]);
/// assert!((data.sound_speed - 1.4_f64.sqrt()).abs() < 1e-14);
/// ```
pub trait HyperbolicSystem<const DIM: usize, const N: usize>: Clone + Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &'static str;

    /// Compute the flux tensor f(U); column `d` is the flux in direction `d`.
    fn flux(&self, u: &State<N>) -> FluxTensor<DIM, N>;

    /// Whether `u` lies in the invariant domain.
    fn is_admissible(&self, u: &State<N>) -> bool;

    /// Project `u` onto the unit direction `n`.
    ///
    /// # Arguments
    /// * `u` - Admissible conserved state
    /// * `n` - Unit direction
    fn riemann_data(&self, u: &State<N>, n: &Point<DIM>) -> RiemannData;

    /// Conserved to primitive variables.
    fn to_primitive(&self, u: &State<N>) -> State<N>;

    /// Primitive to conserved variables.
    fn from_primitive(&self, w: &State<N>) -> State<N>;

    /// Scalar inspected by the smoothness indicator (density or depth).
    fn indicator_variable(&self, u: &State<N>) -> f64 {
        u[0]
    }
}
