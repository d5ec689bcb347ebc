//! Initial and analytic states.
//!
//! An [`InitialState`] evaluates a conserved state at a point and time.
//! Analytic solutions (e.g. [`LeBlanc`]) are valid for every `t ≥ 0` and
//! double as Dirichlet data or as reference solutions in error studies.
//!
//! | State | Equations | Description |
//! |-------|-----------|-------------|
//! | [`Uniform`] | any | constant state |
//! | [`Contrast`] | any | two states separated by a plane (Sod, dam break) |
//! | [`LeBlanc`] | Euler | exact solution of the LeBlanc shock tube |

mod contrast;
mod leblanc;

pub use contrast::Contrast;
pub use leblanc::LeBlanc;

use crate::graph::GraphOperators;
use crate::types::{Point, State};

/// A state field `U(x, t)`.
pub trait InitialState<const DIM: usize, const N: usize>: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &'static str;

    /// Conserved state at `x` and time `t`.
    fn compute(&self, x: &Point<DIM>, t: f64) -> State<N>;

    /// Evaluate at every graph node.
    fn interpolate<G>(&self, graph: &G, t: f64) -> Vec<State<N>>
    where
        G: GraphOperators<DIM>,
        Self: Sized,
    {
        (0..graph.n_nodes())
            .map(|i| self.compute(&graph.position(i), t))
            .collect()
    }
}

/// A constant conserved state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Uniform<const N: usize> {
    pub state: State<N>,
}

impl<const N: usize> Uniform<N> {
    pub fn new(state: State<N>) -> Self {
        Self { state }
    }
}

impl<const DIM: usize, const N: usize> InitialState<DIM, N> for Uniform<N> {
    fn name(&self) -> &'static str {
        "uniform"
    }

    fn compute(&self, _x: &Point<DIM>, _t: f64) -> State<N> {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::OfflineData;
    use crate::mesh::SimplexMesh;

    #[test]
    fn test_uniform_interpolation() {
        let graph = OfflineData::assemble(&SimplexMesh::rectangle(0.0, 1.0, 0.0, 1.0, 2, 2)).unwrap();
        let uniform = Uniform::new(State::new([1.0, 0.0, 0.0, 2.5]));
        let u = uniform.interpolate(&graph, 0.3);
        assert_eq!(u.len(), graph.n_nodes());
        assert!(u.iter().all(|u_i| *u_i == uniform.state));
    }
}
