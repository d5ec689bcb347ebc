//! Smoothness indicator controlling the high-order viscosity.
//!
//! ```text
//! α_i = ( |Σ_j (ρ_j - ρ_i)| / Σ_j |ρ_j - ρ_i| )^p
//! ```
//!
//! α vanishes where the indicator variable is linear along the stencil and
//! reaches one at local extrema. The high-order viscosity is
//! `d^H_ij = d_ij max(α_i, α_j)`.

use super::parallel::for_each_node;
use crate::equations::HyperbolicSystem;
use crate::graph::GraphOperators;
use crate::types::State;

/// Compute `α_i` for every node into `alpha`.
///
/// # Arguments
/// * `system` - Provides the indicator variable
/// * `graph` - Row structure
/// * `u` - Current state
/// * `power` - Exponent `p ≥ 1`
/// * `alpha` - Output, one entry per node
pub fn smoothness_indicator<S, G, const DIM: usize, const N: usize>(
    system: &S,
    graph: &G,
    u: &[State<N>],
    power: i32,
    alpha: &mut [f64],
) where
    S: HyperbolicSystem<DIM, N>,
    G: GraphOperators<DIM>,
{
    let pattern = graph.sparsity();
    for_each_node(alpha, |i, alpha_i| {
        let rho_i = system.indicator_variable(&u[i]);
        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for &j in &pattern.columns(i)[1..] {
            let jump = system.indicator_variable(&u[j]) - rho_i;
            numerator += jump;
            denominator += jump.abs();
        }
        *alpha_i = if denominator > 0.0 {
            (numerator.abs() / denominator).min(1.0).powi(power)
        } else {
            0.0
        };
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equations::ShallowWater;
    use crate::graph::OfflineData;
    use crate::mesh::SimplexMesh;

    #[test]
    fn test_linear_profile_is_smooth_and_extremum_is_not() {
        let graph = OfflineData::assemble(&SimplexMesh::interval(0.0, 1.0, 6)).unwrap();
        let swe = ShallowWater::<1>::new(1.0);

        let mut u: Vec<State<2>> = (0..7).map(|i| State::new([1.0 + i as f64, 0.0])).collect();
        let mut alpha = vec![0.0; 7];
        smoothness_indicator(&swe, &graph, &u, 2, &mut alpha);
        for &a in &alpha[1..6] {
            assert!(a < 1e-14);
        }
        // One-sided rows at the boundary see a monotone jump
        assert_eq!(alpha[0], 1.0);

        u[3] = State::new([10.0, 0.0]);
        smoothness_indicator(&swe, &graph, &u, 2, &mut alpha);
        assert_eq!(alpha[3], 1.0);
    }

    #[test]
    fn test_constant_state_has_zero_indicator() {
        let graph = OfflineData::assemble(&SimplexMesh::periodic_interval(0.0, 1.0, 5)).unwrap();
        let swe = ShallowWater::<1>::new(1.0);
        let u = vec![State::new([2.0, 1.0]); 5];
        let mut alpha = vec![1.0; 5];
        smoothness_indicator(&swe, &graph, &u, 1, &mut alpha);
        assert!(alpha.iter().all(|&a| a == 0.0));
    }
}
