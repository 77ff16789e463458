//! Dense integer matrices with exact elimination helpers.
//!
//! Purpose
//! - Carry halfspace lists, candidate coordinates and subspace bases as
//!   row-major `i64` matrices, with checked fast-path arithmetic.
//! - Answer the exact questions the dual algorithm asks: the rank of an
//!   integer matrix, the integer kernel of a single functional, and
//!   gcd-primitive row normalization.
//!
//! Why this design
//! - Machine words keep the hot loops cheap; every multiply/add on the fast
//!   path is checked and surfaces as `DualError::Overflow` instead of
//!   wrapping silently.
//! - Rank and kernel run in `BigInt` (fraction-free elimination), so the
//!   exact side can never overflow; results are narrowed back to `i64` with
//!   checks where the caller needs machine words again.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, ToPrimitive, Zero};

use crate::error::DualError;

/// Dense row-major integer matrix.
///
/// Invariants:
/// - `data.len() == rows * cols`; `cols` is fixed at construction.
/// - Rows are plain `i64` slices; exactness beyond machine words is handled
///   by the `BigInt`-based queries below, never by the storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntMatrix {
    data: Vec<i64>,
    rows: usize,
    cols: usize,
}

impl IntMatrix {
    pub fn zero(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![0; rows * cols],
            rows,
            cols,
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut m = Self::zero(n, n);
        for i in 0..n {
            m.data[i * n + i] = 1;
        }
        m
    }

    /// Build from explicit rows; `cols` disambiguates the empty case.
    pub fn from_rows(rows: Vec<Vec<i64>>, cols: usize) -> Result<Self, DualError> {
        if cols == 0 {
            return Err(DualError::EmptyMatrix);
        }
        let mut data = Vec::with_capacity(rows.len() * cols);
        let nr = rows.len();
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != cols {
                return Err(DualError::RowLength {
                    row: i,
                    expected: cols,
                    found: row.len(),
                });
            }
            data.extend(row);
        }
        Ok(Self {
            data,
            rows: nr,
            cols,
        })
    }

    #[inline]
    pub fn nr_rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn nr_cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn row(&self, i: usize) -> &[i64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn rows_iter(&self) -> impl Iterator<Item = &[i64]> {
        self.data.chunks_exact(self.cols)
    }

    pub fn push_row(&mut self, row: &[i64]) {
        debug_assert_eq!(row.len(), self.cols);
        self.data.extend_from_slice(row);
        self.rows += 1;
    }

    pub fn submatrix_of_rows(&self, indices: &[usize]) -> IntMatrix {
        let mut out = Self::zero(0, self.cols);
        for &i in indices {
            out.push_row(self.row(i));
        }
        out
    }

    pub fn to_rows(&self) -> Vec<Vec<i64>> {
        self.rows_iter().map(<[i64]>::to_vec).collect()
    }

    /// Exact rank over the rationals.
    ///
    /// Fraction-free elimination in `BigInt`; rows are gcd-reduced after each
    /// step to tame coefficient growth.
    pub fn rank(&self) -> usize {
        let mut m: Vec<Vec<BigInt>> = self
            .rows_iter()
            .map(|r| r.iter().map(|&x| BigInt::from(x)).collect())
            .collect();
        rank_big(&mut m)
    }

    /// `coeffs · rows`: one ambient vector from a coefficient row.
    pub fn linear_combination(&self, coeffs: &[i64]) -> Result<Vec<i64>, DualError> {
        debug_assert_eq!(coeffs.len(), self.rows);
        let mut out = vec![0i64; self.cols];
        for (c, row) in coeffs.iter().zip(self.rows_iter()) {
            for (acc, x) in out.iter_mut().zip(row) {
                let term = c.checked_mul(*x).ok_or(DualError::Overflow {
                    stage: "basis combination",
                })?;
                *acc = acc.checked_add(term).ok_or(DualError::Overflow {
                    stage: "basis combination",
                })?;
            }
        }
        Ok(out)
    }
}

fn rank_big(m: &mut [Vec<BigInt>]) -> usize {
    let rows = m.len();
    if rows == 0 {
        return 0;
    }
    let cols = m[0].len();
    let mut rank = 0usize;
    for col in 0..cols {
        let Some(pivot) = (rank..rows).find(|&r| !m[r][col].is_zero()) else {
            continue;
        };
        m.swap(rank, pivot);
        for r in rank + 1..rows {
            if m[r][col].is_zero() {
                continue;
            }
            let a = m[rank][col].clone();
            let b = m[r][col].clone();
            for c in col..cols {
                let updated = &m[r][c] * &a - &m[rank][c] * &b;
                m[r][c] = updated;
            }
            reduce_big_row(&mut m[r]);
        }
        rank += 1;
        if rank == rows {
            break;
        }
    }
    rank
}

fn reduce_big_row(row: &mut [BigInt]) {
    let mut g = BigInt::zero();
    for x in row.iter() {
        g = g.gcd(x);
    }
    if g.is_zero() || g == BigInt::from(1) {
        return;
    }
    for x in row.iter_mut() {
        *x = &*x / &g;
    }
}

/// Extended gcd: `(d, u, v)` with `d = u*a + v*b` and `d > 0` for nonzero input.
pub(crate) fn extended_gcd(a: &BigInt, b: &BigInt) -> (BigInt, BigInt, BigInt) {
    if a.is_zero() {
        let sign = if b.is_negative() { -1 } else { 1 };
        return (b.abs(), BigInt::zero(), BigInt::from(sign));
    }
    if b.is_zero() {
        let sign = if a.is_negative() { -1 } else { 1 };
        return (a.abs(), BigInt::from(sign), BigInt::zero());
    }
    let (mut old_r, mut r) = (a.clone(), b.clone());
    let (mut old_s, mut s) = (BigInt::from(1), BigInt::zero());
    let (mut old_t, mut t) = (BigInt::zero(), BigInt::from(1));
    while !r.is_zero() {
        let q = &old_r / &r;
        let tmp = &old_r - &q * &r;
        old_r = std::mem::replace(&mut r, tmp);
        let tmp = &old_s - &q * &s;
        old_s = std::mem::replace(&mut s, tmp);
        let tmp = &old_t - &q * &t;
        old_t = std::mem::replace(&mut t, tmp);
    }
    if old_r.is_negative() {
        (-old_r, -old_s, -old_t)
    } else {
        (old_r, old_s, old_t)
    }
}

/// Gcd, witness combination and kernel lattice of one integer functional.
pub struct FunctionalKernel {
    /// Positive gcd of the functional's entries.
    pub gcd: i64,
    /// Coefficients `c` with `c · r = gcd`.
    pub combination: Vec<i64>,
    /// Lattice basis of `{ w : w · r = 0 }`, one row per kernel direction.
    pub kernel: IntMatrix,
}

/// Fold extended gcd across `r` while maintaining a unimodular transform `U`
/// with `U · r = (g, 0, ..., 0)`; row 0 is the witness, the rest span the
/// kernel lattice. `r` must be nonzero.
pub fn kernel_of_functional(r: &[i64]) -> Result<FunctionalKernel, DualError> {
    let s = r.len();
    debug_assert!(r.iter().any(|&x| x != 0));
    let mut u: Vec<Vec<BigInt>> = (0..s)
        .map(|i| {
            let mut row = vec![BigInt::zero(); s];
            row[i] = BigInt::from(1);
            row
        })
        .collect();
    let mut g = BigInt::from(r[0]);
    if g.is_negative() {
        g = -g;
        negate_big_row(&mut u[0]);
    }
    for j in 1..s {
        let rj = BigInt::from(r[j]);
        if rj.is_zero() {
            continue;
        }
        if g.is_zero() {
            u.swap(0, j);
            g = rj;
            if g.is_negative() {
                g = -g;
                negate_big_row(&mut u[0]);
            }
            continue;
        }
        let (d, a, b) = extended_gcd(&g, &rj);
        // The 2x2 block [[a, b], [-rj/d, g/d]] has determinant 1, so U stays
        // unimodular and the kernel rows remain a lattice basis.
        let co_j = -&rj / &d;
        let co_0 = &g / &d;
        for c in 0..s {
            let new0 = &a * &u[0][c] + &b * &u[j][c];
            let newj = &co_j * &u[0][c] + &co_0 * &u[j][c];
            u[0][c] = new0;
            u[j][c] = newj;
        }
        g = d;
    }
    let gcd = g.to_i64().ok_or(DualError::Overflow {
        stage: "kernel of functional",
    })?;
    let mut rows_i64 = Vec::with_capacity(s);
    for row in &u {
        let narrowed: Option<Vec<i64>> = row.iter().map(ToPrimitive::to_i64).collect();
        rows_i64.push(narrowed.ok_or(DualError::Overflow {
            stage: "kernel of functional",
        })?);
    }
    let combination = rows_i64.remove(0);
    let kernel = IntMatrix::from_rows(rows_i64, s)?;
    Ok(FunctionalKernel {
        gcd,
        combination,
        kernel,
    })
}

fn negate_big_row(row: &mut [BigInt]) {
    for x in row.iter_mut() {
        let neg = -&*x;
        *x = neg;
    }
}

/// Checked scalar product of two equal-length `i64` slices.
#[inline]
pub fn checked_dot(a: &[i64], b: &[i64]) -> Result<i64, DualError> {
    debug_assert_eq!(a.len(), b.len());
    let mut acc = 0i64;
    for (x, y) in a.iter().zip(b) {
        let term = x.checked_mul(*y).ok_or(DualError::Overflow {
            stage: "scalar product",
        })?;
        acc = acc.checked_add(term).ok_or(DualError::Overflow {
            stage: "scalar product",
        })?;
    }
    Ok(acc)
}

/// Checked entrywise sum; `Ok(None)` when the sum is the zero vector.
#[inline]
pub fn checked_add_rows(a: &[i64], b: &[i64]) -> Result<Option<Vec<i64>>, DualError> {
    debug_assert_eq!(a.len(), b.len());
    let mut out = Vec::with_capacity(a.len());
    let mut all_zero = true;
    for (x, y) in a.iter().zip(b) {
        let s = x.checked_add(*y).ok_or(DualError::Overflow {
            stage: "vector addition",
        })?;
        all_zero &= s == 0;
        out.push(s);
    }
    Ok(if all_zero { None } else { Some(out) })
}

/// Divide a row by the gcd of its entries; returns false for the zero row.
pub fn primitivize(row: &mut [i64]) -> bool {
    let mut g: i64 = 0;
    for &x in row.iter() {
        g = g.gcd(&x);
    }
    if g == 0 {
        return false;
    }
    if g > 1 {
        for x in row.iter_mut() {
            *x /= g;
        }
    }
    true
}

/// Coordinate change into a previously computed sublattice basis.
///
/// The caller owns the sublattice bookkeeping; this type only carries the
/// two maps the driver applies: points go through `point_map / point_denom`
/// (exact division required), functionals through `dual_map`.
#[derive(Clone, Debug)]
pub struct SublatticeTransform {
    pub point_map: IntMatrix,
    pub point_denom: i64,
    pub dual_map: IntMatrix,
}

impl SublatticeTransform {
    pub fn image_point(&self, v: &[i64]) -> Result<Vec<i64>, DualError> {
        if v.len() != self.point_map.nr_cols() || self.point_denom == 0 {
            return Err(DualError::TransformMismatch);
        }
        let mut out = Vec::with_capacity(self.point_map.nr_rows());
        for row in self.point_map.rows_iter() {
            let x = checked_dot(row, v)?;
            if x % self.point_denom != 0 {
                return Err(DualError::TransformMismatch);
            }
            out.push(x / self.point_denom);
        }
        Ok(out)
    }

    pub fn image_dual(&self, h: &[i64]) -> Result<Vec<i64>, DualError> {
        if h.len() != self.dual_map.nr_cols() {
            return Err(DualError::TransformMismatch);
        }
        let mut out = Vec::with_capacity(self.dual_map.nr_rows());
        for row in self.dual_map.rows_iter() {
            out.push(checked_dot(row, h)?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_of_identity_and_deficient() {
        assert_eq!(IntMatrix::identity(4).rank(), 4);
        let m = IntMatrix::from_rows(vec![vec![1, 2, 3], vec![2, 4, 6], vec![0, 1, 1]], 3)
            .unwrap();
        assert_eq!(m.rank(), 2);
        assert_eq!(IntMatrix::zero(0, 3).rank(), 0);
    }

    #[test]
    fn rank_survives_large_intermediates() {
        // Entries chosen so naive i64 cross-multiplication would wrap.
        let big = 3_000_000_000i64;
        let m = IntMatrix::from_rows(
            vec![vec![big, 1, 0], vec![1, big, 0], vec![0, 0, 1]],
            3,
        )
        .unwrap();
        assert_eq!(m.rank(), 3);
    }

    #[test]
    fn extended_gcd_matches_bezout() {
        let cases = [(35i64, 15i64), (12, 8), (0, 5), (-6, 4), (7, -3)];
        for (a, b) in cases {
            let (d, u, v) = extended_gcd(&BigInt::from(a), &BigInt::from(b));
            assert_eq!(d, BigInt::from(a.gcd(&b)));
            assert_eq!(BigInt::from(a) * u + BigInt::from(b) * v, d);
        }
    }

    #[test]
    fn kernel_of_functional_splits_lattice() {
        let r = vec![2i64, -1, 4];
        let fk = kernel_of_functional(&r).unwrap();
        assert_eq!(fk.gcd, 1);
        assert_eq!(checked_dot(&fk.combination, &r).unwrap(), 1);
        assert_eq!(fk.kernel.nr_rows(), 2);
        for w in fk.kernel.rows_iter() {
            assert_eq!(checked_dot(w, &r).unwrap(), 0);
        }
    }

    #[test]
    fn kernel_gcd_positive_for_negative_leading_entry() {
        let r = vec![-4i64, 6];
        let fk = kernel_of_functional(&r).unwrap();
        assert_eq!(fk.gcd, 2);
        assert_eq!(checked_dot(&fk.combination, &r).unwrap(), 2);
        assert_eq!(checked_dot(fk.kernel.row(0), &r).unwrap(), 0);
    }

    #[test]
    fn primitivize_divides_by_gcd() {
        let mut row = vec![4i64, -6, 10];
        assert!(primitivize(&mut row));
        assert_eq!(row, vec![2, -3, 5]);
        let mut zero = vec![0i64, 0];
        assert!(!primitivize(&mut zero));
    }

    #[test]
    fn checked_dot_reports_overflow() {
        let a = vec![i64::MAX, 1];
        let b = vec![2i64, 0];
        assert!(matches!(
            checked_dot(&a, &b),
            Err(DualError::Overflow { .. })
        ));
    }

    #[test]
    fn sublattice_maps_require_exact_division() {
        let t = SublatticeTransform {
            point_map: IntMatrix::from_rows(vec![vec![1, 1], vec![1, -1]], 2).unwrap(),
            point_denom: 2,
            dual_map: IntMatrix::identity(2),
        };
        assert_eq!(t.image_point(&[3, 1]).unwrap(), vec![2, 1]);
        assert!(matches!(
            t.image_point(&[1, 0]),
            Err(DualError::TransformMismatch)
        ));
    }
}
