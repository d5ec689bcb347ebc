//! Node and row loops, serial or on the rayon pool.
//!
//! Every loop body writes only to the element (or row) it is handed, and
//! the only reduction is a minimum, so serial and parallel runs produce
//! bitwise identical results.

use crate::graph::SparsityPattern;

/// Run `f(i, &mut values[i])` for every node.
pub(crate) fn for_each_node<T, F>(values: &mut [T], f: F)
where
    T: Send,
    F: Fn(usize, &mut T) + Send + Sync,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        values.par_iter_mut().enumerate().for_each(|(i, v)| f(i, v));
    }

    #[cfg(not(feature = "parallel"))]
    values.iter_mut().enumerate().for_each(|(i, v)| f(i, v));
}

/// Run `f(i, row_i)` for every row of a matrix stored in CSR order.
///
/// Rows are carved off `values` in place; nothing is allocated.
pub(crate) fn for_each_row<T, F>(pattern: &SparsityPattern, values: &mut [T], f: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Send + Sync,
{
    debug_assert_eq!(values.len(), pattern.n_entries());

    #[cfg(feature = "parallel")]
    split_rows(pattern, 0, pattern.n_rows(), values, &f);

    #[cfg(not(feature = "parallel"))]
    rows_serial(pattern, 0, pattern.n_rows(), values, &f);
}

/// Rows per task below which the parallel split stops.
#[cfg(feature = "parallel")]
const ROWS_PER_TASK: usize = 256;

/// Halve `first..last` at a row boundary until the ranges are small.
#[cfg(feature = "parallel")]
fn split_rows<T, F>(pattern: &SparsityPattern, first: usize, last: usize, values: &mut [T], f: &F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Sync,
{
    if last - first <= ROWS_PER_TASK {
        rows_serial(pattern, first, last, values, f);
        return;
    }
    let mid = first + (last - first) / 2;
    let (left, right) = values.split_at_mut(pattern.row_start(mid) - pattern.row_start(first));
    rayon::join(
        || split_rows(pattern, first, mid, left, f),
        || split_rows(pattern, mid, last, right, f),
    );
}

/// Visit rows `first..last`; `values` starts at the first entry of `first`.
fn rows_serial<T, F>(pattern: &SparsityPattern, first: usize, last: usize, values: &mut [T], f: &F)
where
    F: Fn(usize, &mut [T]),
{
    let mut rest = values;
    for i in first..last {
        let (row, tail) = std::mem::take(&mut rest).split_at_mut(pattern.row_length(i));
        f(i, row);
        rest = tail;
    }
}

/// Minimum of `f(i)` over `0..n`, `+∞` for `n = 0`.
pub(crate) fn min_over_nodes<F>(n: usize, f: F) -> f64
where
    F: Fn(usize) -> f64 + Send + Sync,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        (0..n).into_par_iter().map(f).reduce(|| f64::INFINITY, f64::min)
    }

    #[cfg(not(feature = "parallel"))]
    (0..n).map(f).fold(f64::INFINITY, f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn chain(n: usize) -> SparsityPattern {
        let adjacency: Vec<BTreeSet<usize>> = (0..n)
            .map(|i| {
                let mut row = BTreeSet::new();
                if i > 0 {
                    row.insert(i - 1);
                }
                if i + 1 < n {
                    row.insert(i + 1);
                }
                row
            })
            .collect();
        SparsityPattern::from_adjacency(&adjacency)
    }

    #[test]
    fn test_for_each_row_visits_each_row_once() {
        let pattern = chain(5);
        let mut values = vec![0usize; pattern.n_entries()];
        for_each_row(&pattern, &mut values, |i, row| {
            for v in row.iter_mut() {
                *v += i;
            }
        });

        for i in 0..5 {
            for k in pattern.row(i) {
                assert_eq!(values[k], i);
            }
        }
    }

    #[test]
    fn test_for_each_row_hands_out_matching_rows() {
        let pattern = chain(1000);
        let mut values: Vec<usize> = (0..pattern.n_entries()).map(|k| pattern.column(k)).collect();
        for_each_row(&pattern, &mut values, |i, row| {
            assert_eq!(row, pattern.columns(i));
            row.iter_mut().for_each(|v| *v = i);
        });

        assert!(values.iter().enumerate().all(|(k, &v)| pattern.row(v).contains(&k)));
    }

    #[test]
    fn test_min_over_nodes() {
        assert_eq!(min_over_nodes(0, |_| 1.0), f64::INFINITY);
        assert_eq!(min_over_nodes(4, |i| (i as f64 - 2.0).abs()), 0.0);
    }
}
