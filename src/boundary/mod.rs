//! Boundary postprocessing of the nodal state.
//!
//! Graph-based schemes impose boundary conditions strongly: after an
//! accepted step the state at boundary nodes is overwritten or projected.
//!
//! | Condition | Effect on a boundary node |
//! |-----------|---------------------------|
//! | [`NoBoundaryConditions`] | none (periodic or do-nothing boundaries) |
//! | [`DirichletBoundary`] | state set to a prescribed field `U(x, t)` |
//! | [`SlipBoundary`] | normal momentum component removed |
//!
//! The outward normal of a boundary node is read from the diagonal entry
//! `c_ii = ½ ∮ φ_i² n`, which vanishes in the interior.

use crate::graph::GraphOperators;
use crate::initial_state::InitialState;
use crate::types::{Point, State, dot};

/// A node on the domain boundary.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundaryNode<const DIM: usize> {
    pub index: usize,
    pub position: Point<DIM>,
    /// Outward unit normal
    pub normal: Point<DIM>,
}

/// Boundary condition applied node by node.
pub trait BoundaryConditions<const DIM: usize, const N: usize>: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &'static str;

    /// Postprocess the state of one boundary node at time `t`.
    fn apply(&self, node: &BoundaryNode<DIM>, u: &mut State<N>, t: f64);
}

/// Apply `conditions` to every locally owned boundary node of `graph`.
pub fn apply_boundary_conditions<B, G, const DIM: usize, const N: usize>(
    conditions: &B,
    graph: &G,
    state: &mut [State<N>],
    t: f64,
) where
    B: BoundaryConditions<DIM, N> + ?Sized,
    G: GraphOperators<DIM>,
{
    let pattern = graph.sparsity();
    let n_owned = graph.n_locally_owned();
    for &i in graph.boundary_nodes().iter().filter(|&&i| i < n_owned) {
        let node = BoundaryNode {
            index: i,
            position: graph.position(i),
            normal: graph.normal(pattern.row_start(i)),
        };
        conditions.apply(&node, &mut state[i], t);
    }
}

/// Leaves the state untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NoBoundaryConditions;

impl<const DIM: usize, const N: usize> BoundaryConditions<DIM, N> for NoBoundaryConditions {
    fn name(&self) -> &'static str {
        "none"
    }

    fn apply(&self, _node: &BoundaryNode<DIM>, _u: &mut State<N>, _t: f64) {}
}

/// Overwrites boundary nodes with a prescribed state field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirichletBoundary<I> {
    pub data: I,
}

impl<I> DirichletBoundary<I> {
    pub fn new(data: I) -> Self {
        Self { data }
    }
}

impl<I, const DIM: usize, const N: usize> BoundaryConditions<DIM, N> for DirichletBoundary<I>
where
    I: InitialState<DIM, N>,
{
    fn name(&self) -> &'static str {
        "dirichlet"
    }

    fn apply(&self, node: &BoundaryNode<DIM>, u: &mut State<N>, t: f64) {
        *u = self.data.compute(&node.position, t);
    }
}

/// Slip wall: removes the normal component of the momentum (or
/// discharge), stored in components `1..=DIM` by both equation families.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SlipBoundary;

impl<const DIM: usize, const N: usize> BoundaryConditions<DIM, N> for SlipBoundary {
    fn name(&self) -> &'static str {
        "slip"
    }

    fn apply(&self, node: &BoundaryNode<DIM>, u: &mut State<N>, _t: f64) {
        let m: Point<DIM> = std::array::from_fn(|d| u[1 + d]);
        let m_n = dot(&m, &node.normal);
        for d in 0..DIM {
            u[1 + d] -= m_n * node.normal[d];
        }
    }
}
