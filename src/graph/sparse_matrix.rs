//! Values stored on a [`SparsityPattern`].

use std::ops::{Index, IndexMut};
use std::sync::Arc;

use super::SparsityPattern;

/// A sparse matrix with entries of type `T` on a shared pattern.
///
/// Entries are addressed by their position `k` in the CSR layout, which is
/// how the row loops of the time stepper visit them.
#[derive(Clone, Debug)]
pub struct SparseMatrix<T> {
    pattern: Arc<SparsityPattern>,
    values: Vec<T>,
}

impl<T: Clone> SparseMatrix<T> {
    /// Allocate a matrix with every entry set to `fill`.
    pub fn new(pattern: Arc<SparsityPattern>, fill: T) -> Self {
        let values = vec![fill; pattern.n_entries()];
        Self { pattern, values }
    }

    /// Reset every entry to `value` without reallocating.
    pub fn fill(&mut self, value: T) {
        self.values.fill(value);
    }
}

impl<T: Copy> SparseMatrix<T> {
    /// Copy all values from a matrix on the same pattern.
    pub fn copy_from(&mut self, other: &Self) {
        debug_assert!(Arc::ptr_eq(&self.pattern, &other.pattern) || *self.pattern == *other.pattern);
        self.values.copy_from_slice(&other.values);
    }

    /// Value of the transposed entry of `k`.
    #[inline]
    pub fn transposed(&self, k: usize) -> T {
        self.values[self.pattern.transposed(k)]
    }
}

impl<T> SparseMatrix<T> {
    /// The underlying pattern.
    pub fn pattern(&self) -> &Arc<SparsityPattern> {
        &self.pattern
    }

    /// Entries of row `i`, diagonal first.
    #[inline]
    pub fn row(&self, i: usize) -> &[T] {
        &self.values[self.pattern.row(i)]
    }

    /// Mutable entries of row `i`.
    #[inline]
    pub fn row_mut(&mut self, i: usize) -> &mut [T] {
        let range = self.pattern.row(i);
        &mut self.values[range]
    }

    /// All stored values in CSR order.
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// All stored values in CSR order, mutable.
    pub fn values_mut(&mut self) -> &mut [T] {
        &mut self.values
    }

    /// Split into the pattern and the mutable values, for row-parallel loops.
    pub fn split_mut(&mut self) -> (&SparsityPattern, &mut [T]) {
        (self.pattern.as_ref(), self.values.as_mut_slice())
    }
}

impl<T> Index<usize> for SparseMatrix<T> {
    type Output = T;

    #[inline]
    fn index(&self, k: usize) -> &T {
        &self.values[k]
    }
}

impl<T> IndexMut<usize> for SparseMatrix<T> {
    #[inline]
    fn index_mut(&mut self, k: usize) -> &mut T {
        &mut self.values[k]
    }
}
