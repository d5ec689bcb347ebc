//! Conforming simplex meshes (intervals, triangles).
//!
//! A mesh stores node positions and, per cell, the `DIM + 1` node indices
//! together with the cell's own vertex coordinates. Keeping coordinates per
//! cell lets periodic meshes identify nodes across the domain boundary while
//! cells keep their true geometry.

use crate::types::Point;

/// Simplex mesh in `DIM` dimensions.
#[derive(Clone, Debug)]
pub struct SimplexMesh<const DIM: usize> {
    /// Node positions
    pub positions: Vec<Point<DIM>>,
    /// Cell node indices, flat with stride `DIM + 1`
    pub cell_nodes: Vec<usize>,
    /// Cell vertex coordinates, flat with stride `DIM + 1`
    pub cell_vertices: Vec<Point<DIM>>,
    /// Whether the mesh wraps around in every direction
    pub is_periodic: bool,
}

impl<const DIM: usize> SimplexMesh<DIM> {
    /// Number of nodes per cell.
    pub const NODES_PER_CELL: usize = DIM + 1;

    /// Number of graph nodes.
    pub fn n_nodes(&self) -> usize {
        self.positions.len()
    }

    /// Number of cells.
    pub fn n_cells(&self) -> usize {
        self.cell_nodes.len() / Self::NODES_PER_CELL
    }

    /// Node indices of cell `k`.
    pub fn cell(&self, k: usize) -> &[usize] {
        let s = Self::NODES_PER_CELL;
        &self.cell_nodes[k * s..(k + 1) * s]
    }

    /// Vertex coordinates of cell `k`.
    pub fn vertices(&self, k: usize) -> &[Point<DIM>] {
        let s = Self::NODES_PER_CELL;
        &self.cell_vertices[k * s..(k + 1) * s]
    }

    /// Smallest distance between two vertices of the same cell.
    pub fn h_min(&self) -> f64 {
        let mut h = f64::INFINITY;
        for k in 0..self.n_cells() {
            let v = self.vertices(k);
            for a in 0..v.len() {
                for b in (a + 1)..v.len() {
                    let d: f64 = v[a]
                        .iter()
                        .zip(v[b].iter())
                        .map(|(x, y)| (x - y) * (x - y))
                        .sum();
                    h = h.min(d.sqrt());
                }
            }
        }
        h
    }
}

impl SimplexMesh<1> {
    /// Uniform partition of `[x_min, x_max]` into `n_cells` intervals.
    pub fn interval(x_min: f64, x_max: f64, n_cells: usize) -> Self {
        assert!(n_cells > 0, "Need at least one cell");
        assert!(x_max > x_min, "x_max must be greater than x_min");

        let h = (x_max - x_min) / n_cells as f64;
        let positions: Vec<Point<1>> = (0..=n_cells).map(|i| [x_min + i as f64 * h]).collect();

        let mut cell_nodes = Vec::with_capacity(2 * n_cells);
        let mut cell_vertices = Vec::with_capacity(2 * n_cells);
        for k in 0..n_cells {
            cell_nodes.extend_from_slice(&[k, k + 1]);
            cell_vertices.extend_from_slice(&[positions[k], positions[k + 1]]);
        }

        Self {
            positions,
            cell_nodes,
            cell_vertices,
            is_periodic: false,
        }
    }

    /// Uniform periodic partition of `[x_min, x_max)`.
    ///
    /// The node at `x_max` is identified with the node at `x_min`, so the
    /// mesh has `n_cells` nodes and no boundary.
    pub fn periodic_interval(x_min: f64, x_max: f64, n_cells: usize) -> Self {
        assert!(n_cells > 2, "Need at least three cells for a periodic mesh");
        assert!(x_max > x_min, "x_max must be greater than x_min");

        let h = (x_max - x_min) / n_cells as f64;
        let positions: Vec<Point<1>> = (0..n_cells).map(|i| [x_min + i as f64 * h]).collect();

        let mut cell_nodes = Vec::with_capacity(2 * n_cells);
        let mut cell_vertices = Vec::with_capacity(2 * n_cells);
        for k in 0..n_cells {
            let right = (k + 1) % n_cells; // wrap to first node
            cell_nodes.extend_from_slice(&[k, right]);
            cell_vertices.extend_from_slice(&[[x_min + k as f64 * h], [x_min + (k + 1) as f64 * h]]);
        }

        Self {
            positions,
            cell_nodes,
            cell_vertices,
            is_periodic: true,
        }
    }
}

impl SimplexMesh<2> {
    /// Structured triangulation of `[x_min, x_max] × [y_min, y_max]`.
    ///
    /// Each of the `nx × ny` rectangles is split along its diagonal into two
    /// counter-clockwise triangles.
    pub fn rectangle(x_min: f64, x_max: f64, y_min: f64, y_max: f64, nx: usize, ny: usize) -> Self {
        assert!(nx > 0 && ny > 0, "Need at least one cell per direction");
        assert!(x_max > x_min && y_max > y_min, "Degenerate rectangle");

        let dx = (x_max - x_min) / nx as f64;
        let dy = (y_max - y_min) / ny as f64;
        let node = |i: usize, j: usize| j * (nx + 1) + i;

        let mut positions = Vec::with_capacity((nx + 1) * (ny + 1));
        for j in 0..=ny {
            for i in 0..=nx {
                positions.push([x_min + i as f64 * dx, y_min + j as f64 * dy]);
            }
        }

        let mut cell_nodes = Vec::with_capacity(6 * nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                let (a, b, c, d) = (node(i, j), node(i + 1, j), node(i + 1, j + 1), node(i, j + 1));
                cell_nodes.extend_from_slice(&[a, b, c]);
                cell_nodes.extend_from_slice(&[a, c, d]);
            }
        }
        let cell_vertices = cell_nodes.iter().map(|&n| positions[n]).collect();

        Self {
            positions,
            cell_nodes,
            cell_vertices,
            is_periodic: false,
        }
    }
}
