//! Two constant states separated by a plane.

use super::InitialState;
use crate::equations::{Euler, HyperbolicSystem, ShallowWater};
use crate::types::{Point, State, dot, unit};

/// Left state where `(x - position)·normal < 0`, right state otherwise.
///
/// The state does not evolve: `compute` ignores `t`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contrast<const DIM: usize, const N: usize> {
    pub left: State<N>,
    pub right: State<N>,
    pub position: Point<DIM>,
    pub normal: Point<DIM>,
}

impl<const DIM: usize, const N: usize> Contrast<DIM, N> {
    /// Split along the first coordinate axis at `x = position`.
    pub fn new(left: State<N>, right: State<N>, position: f64) -> Self {
        let mut point = [0.0; DIM];
        let mut normal = [0.0; DIM];
        point[0] = position;
        normal[0] = 1.0;
        Self {
            left,
            right,
            position: point,
            normal,
        }
    }

    /// Split by an arbitrary plane; `normal` need not be normalized.
    pub fn with_plane(mut self, position: Point<DIM>, normal: Point<DIM>) -> Self {
        self.position = position;
        self.normal = unit(&normal);
        self
    }
}

impl<const DIM: usize, const N: usize> Contrast<DIM, N>
where
    Euler<DIM>: HyperbolicSystem<DIM, N>,
{
    /// Sod shock tube at rest, split at `x = 0.5`.
    ///
    /// Left (ρ, p) = (1, 1), right (ρ, p) = (0.125, 0.1).
    pub fn sod(euler: &Euler<DIM>) -> Self {
        let primitive = |rho: f64, p: f64| {
            let mut w = State::zero();
            w[0] = rho;
            w[N - 1] = p;
            euler.from_primitive(&w)
        };
        Self::new(primitive(1.0, 1.0), primitive(0.125, 0.1), 0.5)
    }
}

impl<const DIM: usize, const N: usize> Contrast<DIM, N>
where
    ShallowWater<DIM>: HyperbolicSystem<DIM, N>,
{
    /// Dam break at rest with depths `h_left` and `h_right`, split at `x = 0`.
    pub fn dam_break(h_left: f64, h_right: f64) -> Self {
        let depth = |h: f64| {
            let mut u = State::zero();
            u[0] = h;
            u
        };
        Self::new(depth(h_left), depth(h_right), 0.0)
    }
}

impl<const DIM: usize, const N: usize> InitialState<DIM, N> for Contrast<DIM, N> {
    fn name(&self) -> &'static str {
        "contrast"
    }

    fn compute(&self, x: &Point<DIM>, _t: f64) -> State<N> {
        let offset: Point<DIM> = std::array::from_fn(|d| x[d] - self.position[d]);
        if dot(&offset, &self.normal) < 0.0 {
            self.left
        } else {
            self.right
        }
    }
}
