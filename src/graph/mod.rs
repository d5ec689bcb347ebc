//! The computational graph and its geometric operators.
//!
//! The time stepper sees the discretization only through the
//! [`GraphOperators`] trait: per directed entry `(i, j)` of a CSR pattern it
//! needs the vector `c_ij`, its norm, the unit direction `n_ij`, the
//! consistent mass `m_ij`, and per node the lumped mass `m_i`. Everything is
//! read-only during a step.
//!
//! [`OfflineData`] is a P1 finite-element implementation assembled from a
//! [`crate::mesh::SimplexMesh`]; other discretizations can implement the
//! trait directly.
//!
//! # Example
//!
//! ```
//! use idp_rs::graph::{GraphOperators, OfflineData};
//! use idp_rs::mesh::SimplexMesh;
//!
//! let mesh = SimplexMesh::interval(0.0, 1.0, 8);
//! let graph = OfflineData::assemble(&mesh).unwrap();
//!
//! // Every row sums to zero: Σ_j c_ij = 0
//! let row_sum: f64 = graph.neighbors(3).map(|e| e.c_ij[0]).sum();
//! assert!(row_sum.abs() < 1e-14);
//! ```

mod offline_data;
mod sparse_matrix;
mod sparsity;

use std::sync::Arc;

pub use offline_data::OfflineData;
pub use sparse_matrix::SparseMatrix;
pub use sparsity::SparsityPattern;

use crate::types::Point;

/// One directed entry `(i, j)` of a graph row, diagonal included.
#[derive(Clone, Copy, Debug)]
pub struct Edge<const DIM: usize> {
    /// CSR position of the entry
    pub entry: usize,
    /// Column index `j`
    pub column: usize,
    /// `c_ij`
    pub c_ij: Point<DIM>,
    /// `|c_ij|`
    pub weight: f64,
    /// `c_ij / |c_ij|`, zero if `c_ij` vanishes
    pub normal: Point<DIM>,
}

/// Read-only graph operators of a discretization.
///
/// Entries are addressed by CSR position `k`; rows are addressed by node.
/// Iteration order over a row is fixed by the pattern, which makes every
/// row sum reproducible.
pub trait GraphOperators<const DIM: usize>: Sync {
    /// The sparsity pattern, shared with every matrix the stepper allocates.
    fn sparsity(&self) -> &Arc<SparsityPattern>;

    /// Lumped mass `m_i`.
    fn lumped_mass(&self, i: usize) -> f64;

    /// Consistent mass `m_ij` of entry `k`.
    fn consistent_mass(&self, k: usize) -> f64;

    /// `c_ij` of entry `k`.
    fn c_ij(&self, k: usize) -> Point<DIM>;

    /// `|c_ij|` of entry `k`.
    fn weight(&self, k: usize) -> f64;

    /// `c_ij / |c_ij|` of entry `k`.
    fn normal(&self, k: usize) -> Point<DIM>;

    /// Position of node `i`.
    fn position(&self, i: usize) -> Point<DIM>;

    /// Nodes on the domain boundary, sorted.
    fn boundary_nodes(&self) -> &[usize];

    /// Number of graph nodes, ghost nodes included.
    fn n_nodes(&self) -> usize {
        self.sparsity().n_rows()
    }

    /// Number of nodes owned by this process. Owned nodes come first.
    fn n_locally_owned(&self) -> usize {
        self.n_nodes()
    }

    /// Total measure of the domain, `Σ_i m_i`.
    fn measure(&self) -> f64 {
        (0..self.n_nodes()).map(|i| self.lumped_mass(i)).sum()
    }

    /// Entries of row `i`, diagonal first.
    fn neighbors(&self, i: usize) -> impl Iterator<Item = Edge<DIM>> + '_ {
        let pattern = self.sparsity();
        pattern.row(i).map(move |k| Edge {
            entry: k,
            column: pattern.column(k),
            c_ij: self.c_ij(k),
            weight: self.weight(k),
            normal: self.normal(k),
        })
    }
}
