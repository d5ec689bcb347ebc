//! Conservation and admissibility diagnostics.

use crate::equations::HyperbolicSystem;
use crate::graph::GraphOperators;
use crate::types::State;

/// Totals `Σ_i m_i U_i` over locally owned nodes.
pub fn conserved_totals<G, const DIM: usize, const N: usize>(graph: &G, u: &[State<N>]) -> State<N>
where
    G: GraphOperators<DIM>,
{
    let mut total = State::zero();
    for (i, u_i) in u.iter().enumerate().take(graph.n_locally_owned()) {
        total.add_scaled(graph.lumped_mass(i), u_i);
    }
    total
}

/// Number of locally owned nodes outside the invariant domain.
pub fn count_inadmissible<S, G, const DIM: usize, const N: usize>(
    system: &S,
    graph: &G,
    u: &[State<N>],
) -> usize
where
    S: HyperbolicSystem<DIM, N>,
    G: GraphOperators<DIM>,
{
    u.iter()
        .take(graph.n_locally_owned())
        .filter(|u_i| !system.is_admissible(u_i))
        .count()
}
