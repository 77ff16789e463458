//! Extreme-ray and relevant-hyperplane extraction over the finished basis.
//!
//! Both passes are pure parallel filters over already-computed data: the
//! value table of the basis tells which halfspaces vanish where, and exact
//! rank queries decide extremality and relevance.

use rayon::prelude::*;

use super::types::Candidate;
use crate::matrix::IntMatrix;

/// A basis vector is an extreme ray iff the halfspace rows vanishing on it
/// have rank at least `dim − 1`.
pub(crate) fn extreme_ray_flags(
    basis: &[Candidate],
    halfspaces: &IntMatrix,
    dim: usize,
) -> Vec<bool> {
    basis
        .par_iter()
        .map(|c| {
            let zero_rows: Vec<usize> = (0..halfspaces.nr_rows())
                .filter(|&i| c.values[i] == 0)
                .collect();
            if zero_rows.len() + 1 < dim {
                return false;
            }
            halfspaces.submatrix_of_rows(&zero_rows).rank() + 1 >= dim
        })
        .collect()
}

/// A halfspace stays relevant iff the generators vanishing on it attain rank
/// `dim − 1`, i.e. it cuts out a facet.
pub(crate) fn relevant_hyperplane_flags(
    basis: &[Candidate],
    halfspaces: &IntMatrix,
    dim: usize,
) -> Vec<bool> {
    (0..halfspaces.nr_rows())
        .into_par_iter()
        .map(|i| {
            let mut vanishing = IntMatrix::zero(0, dim);
            for c in basis.iter().filter(|c| c.values[i] == 0) {
                vanishing.push_row(&c.coords);
            }
            if vanishing.nr_rows() + 1 < dim {
                return false;
            }
            vanishing.rank() + 1 >= dim
        })
        .collect()
}
