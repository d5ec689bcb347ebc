//! P1 finite-element assembly of the graph operators.
//!
//! For continuous piecewise-linear shape functions `φ_i` on a simplex mesh:
//!
//! ```text
//! m_i  = ∫ φ_i             (lumped mass)
//! m_ij = ∫ φ_i φ_j         (consistent mass)
//! c_ij = ∫ φ_i ∇φ_j
//! ```
//!
//! On a simplex `T` with `D + 1` vertices, `∫_T φ_i = |T| / (D + 1)`,
//! `∫_T φ_i φ_j = |T| (1 + δ_ij) / ((D + 1)(D + 2))`, and `∇φ_j` is constant,
//! so every integral is exact.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use faer::Mat;
use faer::linalg::solvers::Solve;

use super::{GraphOperators, SparseMatrix, SparsityPattern};
use crate::error::AssemblyError;
use crate::mesh::SimplexMesh;
use crate::types::{Point, norm, unit};

/// Assembled graph operators of a P1 discretization.
#[derive(Clone, Debug)]
pub struct OfflineData<const DIM: usize> {
    sparsity: Arc<SparsityPattern>,
    positions: Vec<Point<DIM>>,
    lumped_mass: Vec<f64>,
    mass: SparseMatrix<f64>,
    cij: SparseMatrix<Point<DIM>>,
    cij_norm: SparseMatrix<f64>,
    nij: SparseMatrix<Point<DIM>>,
    boundary_nodes: Vec<usize>,
    n_locally_owned: usize,
}

impl<const DIM: usize> OfflineData<DIM> {
    /// Assemble all operators from a mesh.
    pub fn assemble(mesh: &SimplexMesh<DIM>) -> Result<Self, AssemblyError> {
        let n_cells = mesh.n_cells();
        let n_nodes = mesh.n_nodes();
        if n_cells == 0 {
            return Err(AssemblyError::EmptyMesh);
        }

        let mut adjacency = vec![BTreeSet::new(); n_nodes];
        for k in 0..n_cells {
            let cell = mesh.cell(k);
            for &node in cell {
                if node >= n_nodes {
                    return Err(AssemblyError::NodeOutOfRange {
                        cell: k,
                        node,
                        n_nodes,
                    });
                }
            }
            for &i in cell {
                adjacency[i].extend(cell.iter().copied());
            }
        }
        let sparsity = Arc::new(SparsityPattern::from_adjacency(&adjacency));

        let mut lumped_mass = vec![0.0; n_nodes];
        let mut mass = SparseMatrix::new(sparsity.clone(), 0.0);
        let mut cij = SparseMatrix::new(sparsity.clone(), [0.0; DIM]);

        let n_local = DIM + 1;
        let mass_factor = 1.0 / ((n_local * (n_local + 1)) as f64);

        for k in 0..n_cells {
            let (volume, gradients) = local_geometry(mesh.vertices(k), k)?;
            let cell = mesh.cell(k);

            for (a, &i) in cell.iter().enumerate() {
                lumped_mass[i] += volume / n_local as f64;

                for (b, &j) in cell.iter().enumerate() {
                    // Present by construction of the adjacency.
                    let Some(entry) = sparsity.find(i, j) else {
                        continue;
                    };
                    let delta = if a == b { 2.0 } else { 1.0 };
                    mass[entry] += volume * mass_factor * delta;

                    for d in 0..DIM {
                        cij[entry][d] += volume / n_local as f64 * gradients[(d, b)];
                    }
                }
            }
        }

        let mut cij_norm = SparseMatrix::new(sparsity.clone(), 0.0);
        let mut nij = SparseMatrix::new(sparsity.clone(), [0.0; DIM]);
        for k in 0..sparsity.n_entries() {
            cij_norm[k] = norm(&cij[k]);
            nij[k] = unit(&cij[k]);
        }

        let boundary_nodes = find_boundary_nodes(mesh);

        Ok(Self {
            sparsity,
            positions: mesh.positions.clone(),
            lumped_mass,
            mass,
            cij,
            cij_norm,
            nij,
            boundary_nodes,
            n_locally_owned: n_nodes,
        })
    }

    /// Treat only the first `n` nodes as locally owned.
    ///
    /// The remaining nodes behave like ghost nodes of a partitioned run:
    /// they are read as neighbor data but never updated or used for the
    /// step-size reduction.
    pub fn with_locally_owned(mut self, n: usize) -> Self {
        self.n_locally_owned = n.min(self.sparsity.n_rows());
        self
    }

    /// The full `c_ij` matrix.
    pub fn cij_matrix(&self) -> &SparseMatrix<Point<DIM>> {
        &self.cij
    }

    /// The full consistent mass matrix.
    pub fn mass_matrix(&self) -> &SparseMatrix<f64> {
        &self.mass
    }
}

impl<const DIM: usize> GraphOperators<DIM> for OfflineData<DIM> {
    fn sparsity(&self) -> &Arc<SparsityPattern> {
        &self.sparsity
    }

    fn lumped_mass(&self, i: usize) -> f64 {
        self.lumped_mass[i]
    }

    fn consistent_mass(&self, k: usize) -> f64 {
        self.mass[k]
    }

    fn c_ij(&self, k: usize) -> Point<DIM> {
        self.cij[k]
    }

    fn weight(&self, k: usize) -> f64 {
        self.cij_norm[k]
    }

    fn normal(&self, k: usize) -> Point<DIM> {
        self.nij[k]
    }

    fn position(&self, i: usize) -> Point<DIM> {
        self.positions[i]
    }

    fn boundary_nodes(&self) -> &[usize] {
        &self.boundary_nodes
    }

    fn n_locally_owned(&self) -> usize {
        self.n_locally_owned
    }
}

/// Volume and shape function gradients of one simplex.
///
/// Returns `(|T|, G)` where column `a` of `G` is `∇φ_a`.
fn local_geometry<const DIM: usize>(
    vertices: &[Point<DIM>],
    cell: usize,
) -> Result<(f64, Mat<f64>), AssemblyError> {
    // Row a of J^T is the edge x_{a+1} - x_0.
    let mut jacobian_t = Mat::<f64>::zeros(DIM, DIM);
    for a in 0..DIM {
        for d in 0..DIM {
            jacobian_t[(a, d)] = vertices[a + 1][d] - vertices[0][d];
        }
    }

    let det = jacobian_t.determinant();
    let scale: f64 = (0..DIM)
        .map(|a| (0..DIM).map(|d| jacobian_t[(a, d)].abs()).fold(0.0, f64::max))
        .product();
    if !(det.abs() > 1e-12 * scale) {
        return Err(AssemblyError::DegenerateCell {
            cell,
            determinant: det,
        });
    }
    let factorial: f64 = (1..=DIM).map(|d| d as f64).product();
    let volume = det.abs() / factorial;

    // Reference gradients: ∇φ_0 = -(1, .., 1), ∇φ_a = e_a.
    let mut reference = Mat::<f64>::zeros(DIM, DIM + 1);
    for d in 0..DIM {
        reference[(d, 0)] = -1.0;
        reference[(d, d + 1)] = 1.0;
    }

    // J^T ∇φ = ∇_ref φ
    let lu = jacobian_t.as_ref().full_piv_lu();
    let gradients = lu.solve(&reference);

    Ok((volume, gradients))
}

/// Nodes on facets that belong to exactly one cell.
fn find_boundary_nodes<const DIM: usize>(mesh: &SimplexMesh<DIM>) -> Vec<usize> {
    let mut facet_count: BTreeMap<Vec<usize>, usize> = BTreeMap::new();
    for k in 0..mesh.n_cells() {
        let cell = mesh.cell(k);
        for omitted in 0..cell.len() {
            let mut facet: Vec<usize> = cell
                .iter()
                .enumerate()
                .filter(|&(a, _)| a != omitted)
                .map(|(_, &n)| n)
                .collect();
            facet.sort_unstable();
            *facet_count.entry(facet).or_insert(0) += 1;
        }
    }

    let nodes: BTreeSet<usize> = facet_count
        .into_iter()
        .filter(|&(_, count)| count == 1)
        .flat_map(|(facet, _)| facet)
        .collect();
    nodes.into_iter().collect()
}
