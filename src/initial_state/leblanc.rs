//! Exact solution of the LeBlanc shock tube.
//!
//! γ = 5/3, left (ρ, u, p) = (1, 0, 1/15), right (ρ, u, p) =
//! (10⁻³, 0, 2/3·10⁻¹⁰), diaphragm at `x = 0`. The fan consists of a left
//! rarefaction, a contact discontinuity and a very strong right shock.
//! The solution depends on `x_1 / t` only; the other velocity components
//! are zero.

use super::InitialState;
use crate::equations::{Euler, HyperbolicSystem};
use crate::types::{Point, State};

const RAREFACTION_SPEED: f64 = 0.49578489518897934;
const CONTACT_VELOCITY: f64 = 0.62183867139173454;
const RIGHT_SHOCK_SPEED: f64 = 0.82911836253346982;

const PRE_CONTACT_DENSITY: f64 = 5.4079335349316249e-02;
const POST_CONTACT_DENSITY: f64 = 3.9999980604299963e-03;
const CONTACT_PRESSURE: f64 = 0.51557792765096996e-03;

/// LeBlanc shock tube for a gas with γ = 5/3.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LeBlanc<const DIM: usize> {
    pub system: Euler<DIM>,
}

impl<const DIM: usize> LeBlanc<DIM> {
    pub fn new() -> Self {
        Self {
            system: Euler::new(5.0 / 3.0),
        }
    }

    /// Primitive `(ρ, u, p)` at `x` and `t`.
    pub fn primitive(x: f64, t: f64) -> [f64; 3] {
        if x <= -t / 3.0 {
            [1.0, 0.0, 1.0 / 15.0]
        } else if x < RAREFACTION_SPEED * t {
            let chi = x / t;
            let base = 0.75 - 0.75 * chi;
            [
                base.powi(3),
                0.75 * (1.0 / 3.0 + chi),
                base.powi(5) / 15.0,
            ]
        } else if x < CONTACT_VELOCITY * t {
            [PRE_CONTACT_DENSITY, CONTACT_VELOCITY, CONTACT_PRESSURE]
        } else if x < RIGHT_SHOCK_SPEED * t {
            [POST_CONTACT_DENSITY, CONTACT_VELOCITY, CONTACT_PRESSURE]
        } else {
            [0.001, 0.0, 2.0 / 3.0 * 1e-10]
        }
    }
}

impl<const DIM: usize> Default for LeBlanc<DIM> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const DIM: usize, const N: usize> InitialState<DIM, N> for LeBlanc<DIM>
where
    Euler<DIM>: HyperbolicSystem<DIM, N>,
{
    fn name(&self) -> &'static str {
        "leblanc"
    }

    fn compute(&self, x: &Point<DIM>, t: f64) -> State<N> {
        let [rho, u, p] = Self::primitive(x[0], t);
        let mut w = State::zero();
        w[0] = rho;
        w[1] = u;
        w[N - 1] = p;
        self.system.from_primitive(&w)
    }
}
