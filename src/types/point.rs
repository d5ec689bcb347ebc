//! Fixed-size spatial vectors.

/// A position or direction in `DIM` spatial dimensions.
pub type Point<const DIM: usize> = [f64; DIM];

/// Euclidean inner product.
#[inline]
pub fn dot<const DIM: usize>(a: &Point<DIM>, b: &Point<DIM>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Euclidean norm.
#[inline]
pub fn norm<const DIM: usize>(a: &Point<DIM>) -> f64 {
    dot(a, a).sqrt()
}

/// Multiply every component by `s`.
#[inline]
pub fn scale<const DIM: usize>(a: &Point<DIM>, s: f64) -> Point<DIM> {
    let mut out = *a;
    for x in &mut out {
        *x *= s;
    }
    out
}

/// Normalize to unit length. The zero vector maps to itself.
#[inline]
pub fn unit<const DIM: usize>(a: &Point<DIM>) -> Point<DIM> {
    let n = norm(a);
    if n > 0.0 { scale(a, 1.0 / n) } else { [0.0; DIM] }
}
