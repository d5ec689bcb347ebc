//! Conserved state vectors.
//!
//! `State<N>` carries the `N` conserved quantities of one graph node:
//! `[ρ, m_1, .., m_d, E]` for Euler, `[h, q_1, .., q_d]` for shallow water.
//! It supports the vector space operations the update formulas need and
//! nothing else; interpreting components is left to the equation types.

use std::ops::{Add, AddAssign, Index, IndexMut, Mul, Neg, Sub, SubAssign};

use super::Point;

/// Conserved variables at a single node.
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(transparent)]
pub struct State<const N: usize>(pub [f64; N]);

/// Flux tensor: column `d` is the flux in coordinate direction `d`.
pub type FluxTensor<const DIM: usize, const N: usize> = [State<N>; DIM];

impl<const N: usize> State<N> {
    /// Create a state from its components.
    #[inline]
    pub const fn new(values: [f64; N]) -> Self {
        Self(values)
    }

    /// The zero state.
    #[inline]
    pub const fn zero() -> Self {
        Self([0.0; N])
    }

    /// Borrow the components.
    #[inline]
    pub fn as_array(&self) -> &[f64; N] {
        &self.0
    }

    /// Iterate over the components.
    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.0.iter()
    }

    /// `self += c * other`
    #[inline]
    pub fn add_scaled(&mut self, c: f64, other: &Self) {
        for (a, b) in self.0.iter_mut().zip(other.0.iter()) {
            *a += c * b;
        }
    }

    /// Whether every component is finite.
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|x| x.is_finite())
    }

    /// Largest absolute component.
    pub fn max_abs(&self) -> f64 {
        self.0.iter().fold(0.0, |acc: f64, x| acc.max(x.abs()))
    }
}

impl<const N: usize> Default for State<N> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<const N: usize> From<[f64; N]> for State<N> {
    fn from(values: [f64; N]) -> Self {
        Self(values)
    }
}

impl<const N: usize> Index<usize> for State<N> {
    type Output = f64;

    #[inline]
    fn index(&self, k: usize) -> &f64 {
        &self.0[k]
    }
}

impl<const N: usize> IndexMut<usize> for State<N> {
    #[inline]
    fn index_mut(&mut self, k: usize) -> &mut f64 {
        &mut self.0[k]
    }
}

impl<const N: usize> Add for State<N> {
    type Output = Self;

    #[inline]
    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}

impl<const N: usize> Sub for State<N> {
    type Output = Self;

    #[inline]
    fn sub(mut self, other: Self) -> Self {
        self -= other;
        self
    }
}

impl<const N: usize> AddAssign for State<N> {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        for (a, b) in self.0.iter_mut().zip(other.0.iter()) {
            *a += b;
        }
    }
}

impl<const N: usize> SubAssign for State<N> {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        for (a, b) in self.0.iter_mut().zip(other.0.iter()) {
            *a -= b;
        }
    }
}

impl<const N: usize> Mul<f64> for State<N> {
    type Output = Self;

    #[inline]
    fn mul(mut self, s: f64) -> Self {
        for a in &mut self.0 {
            *a *= s;
        }
        self
    }
}

impl<const N: usize> Mul<State<N>> for f64 {
    type Output = State<N>;

    #[inline]
    fn mul(self, u: State<N>) -> State<N> {
        u * self
    }
}

impl<const N: usize> Neg for State<N> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        self * -1.0
    }
}

/// Contract a flux tensor with a direction: `Σ_d f_d c_d`.
#[inline]
pub fn contract<const DIM: usize, const N: usize>(
    flux: &FluxTensor<DIM, N>,
    c: &Point<DIM>,
) -> State<N> {
    let mut out = State::zero();
    for (column, c_d) in flux.iter().zip(c.iter()) {
        out.add_scaled(*c_d, column);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_arithmetic() {
        let a = State::new([1.0, 2.0, 3.0]);
        let b = State::new([0.5, -1.0, 2.0]);

        assert_eq!(a + b, State::new([1.5, 1.0, 5.0]));
        assert_eq!(a - b, State::new([0.5, 3.0, 1.0]));
        assert_eq!(2.0 * a, State::new([2.0, 4.0, 6.0]));
        assert_eq!(-b, State::new([-0.5, 1.0, -2.0]));
    }

    #[test]
    fn test_add_scaled() {
        let mut a = State::new([1.0, 1.0]);
        a.add_scaled(0.5, &State::new([2.0, -4.0]));
        assert_eq!(a, State::new([2.0, -1.0]));
    }

    #[test]
    fn test_contract_2d() {
        let flux = [State::new([1.0, 0.0]), State::new([0.0, 2.0])];
        let out = contract(&flux, &[0.25, 0.5]);
        assert_relative_eq!(out[0], 0.25);
        assert_relative_eq!(out[1], 1.0);
    }

    #[test]
    fn test_max_abs_and_finite() {
        let a = State::new([1.0, -3.0, 2.0]);
        assert_eq!(a.max_abs(), 3.0);
        assert!(a.is_finite());
        assert!(!State::new([f64::NAN, 0.0]).is_finite());
    }
}
