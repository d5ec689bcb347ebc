//! Compressed sparse row pattern of the computational graph.
//!
//! Every row stores its diagonal entry first, followed by the off-diagonal
//! columns in increasing order. For each entry `(i, j)` the index of the
//! entry `(j, i)` is precomputed, so symmetric quantities can be looked up
//! from either endpoint without a search.

use std::collections::BTreeSet;
use std::ops::Range;

/// CSR sparsity pattern with structural symmetry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SparsityPattern {
    row_starts: Vec<usize>,
    columns: Vec<usize>,
    transposed: Vec<usize>,
}

impl SparsityPattern {
    /// Build a pattern from per-row neighbor sets.
    ///
    /// The diagonal is always inserted and every coupling is mirrored, so the
    /// result is structurally symmetric even if `adjacency` is not.
    pub fn from_adjacency(adjacency: &[BTreeSet<usize>]) -> Self {
        let n = adjacency.len();
        let mut symmetric: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); n];
        for (i, row) in adjacency.iter().enumerate() {
            for &j in row {
                assert!(j < n, "column {j} out of range for {n} rows");
                if i != j {
                    symmetric[i].insert(j);
                    symmetric[j].insert(i);
                }
            }
        }

        let mut row_starts = Vec::with_capacity(n + 1);
        let mut columns = Vec::new();
        row_starts.push(0);
        for (i, row) in symmetric.iter().enumerate() {
            columns.push(i);
            columns.extend(row.iter().copied());
            row_starts.push(columns.len());
        }

        let mut pattern = Self {
            row_starts,
            columns,
            transposed: Vec::new(),
        };
        pattern.transposed = pattern.compute_transposed();
        pattern
    }

    fn compute_transposed(&self) -> Vec<usize> {
        let mut transposed = vec![0; self.columns.len()];
        for i in 0..self.n_rows() {
            for k in self.row(i) {
                let j = self.columns[k];
                // Off-diagonal columns are sorted after the diagonal.
                let row_j = &self.columns[self.row(j)];
                let offset = if i == j {
                    0
                } else {
                    1 + row_j[1..].partition_point(|&c| c < i)
                };
                transposed[k] = self.row_starts[j] + offset;
            }
        }
        transposed
    }

    /// Number of rows (graph nodes).
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.row_starts.len() - 1
    }

    /// Number of stored entries, diagonal included.
    #[inline]
    pub fn n_entries(&self) -> usize {
        self.columns.len()
    }

    /// Entry range of row `i`.
    #[inline]
    pub fn row(&self, i: usize) -> Range<usize> {
        self.row_starts[i]..self.row_starts[i + 1]
    }

    /// First entry index of row `i`; `row_start(n_rows())` is `n_entries()`.
    #[inline]
    pub fn row_start(&self, i: usize) -> usize {
        self.row_starts[i]
    }

    /// Number of entries in row `i`, diagonal included.
    #[inline]
    pub fn row_length(&self, i: usize) -> usize {
        self.row_starts[i + 1] - self.row_starts[i]
    }

    /// Column indices of row `i`; the first is always `i`.
    #[inline]
    pub fn columns(&self, i: usize) -> &[usize] {
        &self.columns[self.row(i)]
    }

    /// Column of entry `k`.
    #[inline]
    pub fn column(&self, k: usize) -> usize {
        self.columns[k]
    }

    /// Entry index of `(i, j)`, if it is stored.
    pub fn find(&self, i: usize, j: usize) -> Option<usize> {
        let start = self.row_starts[i];
        if i == j {
            return Some(start);
        }
        let off_diagonal = &self.columns[start + 1..self.row_starts[i + 1]];
        off_diagonal
            .binary_search(&j)
            .ok()
            .map(|offset| start + 1 + offset)
    }

    /// Entry index of the transpose of entry `k`.
    #[inline]
    pub fn transposed(&self, k: usize) -> usize {
        self.transposed[k]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(n: usize) -> SparsityPattern {
        let adjacency: Vec<BTreeSet<usize>> = (0..n)
            .map(|i| if i + 1 < n { BTreeSet::from([i + 1]) } else { BTreeSet::new() })
            .collect();
        SparsityPattern::from_adjacency(&adjacency)
    }

    #[test]
    fn test_diagonal_first_and_symmetric() {
        let p = chain(4);
        assert_eq!(p.n_rows(), 4);
        assert_eq!(p.n_entries(), 4 + 2 * 3);
        assert_eq!(p.columns(0), &[0, 1]);
        assert_eq!(p.columns(1), &[1, 0, 2]);
        assert_eq!(p.columns(3), &[3, 2]);
    }

    #[test]
    fn test_transposed_entries() {
        let p = chain(5);
        for i in 0..p.n_rows() {
            for k in p.row(i) {
                let t = p.transposed(k);
                assert_eq!(p.column(t), i);
                assert_eq!(p.transposed(t), k);
            }
        }
    }

    #[test]
    fn test_find() {
        let p = chain(4);
        assert_eq!(p.find(2, 2), Some(p.row_start(2)));
        assert_eq!(p.find(2, 3), Some(p.row_start(2) + 2));
        assert_eq!(p.find(0, 3), None);
    }

    #[test]
    fn test_isolated_node() {
        let adjacency = vec![BTreeSet::from([1]), BTreeSet::new(), BTreeSet::new()];
        let p = SparsityPattern::from_adjacency(&adjacency);
        assert_eq!(p.row_length(2), 1);
        assert_eq!(p.columns(2), &[2]);
    }
}
