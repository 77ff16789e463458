//! Maximal-subspace lifting for cuts applied while the intersection of the
//! processed halfspaces still contains a line.
//!
//! The degenerate direction is split into its two half-line generators: the
//! incoming halfspace restricted to the running subspace basis yields a gcd
//! witness `v` with value `g > 0`; `+v` and `−v` are injected into the
//! positive and negative buckets and the subspace shrinks to the kernel of
//! the restriction.

use super::types::Candidate;
use crate::error::DualError;
use crate::matrix::{checked_dot, kernel_of_functional, IntMatrix};

pub(crate) struct Lift {
    pub injected: (Candidate, Candidate),
    pub new_subspace: IntMatrix,
}

/// `None` when the subspace is already trivial or lies inside the halfspace's
/// hyperplane; the cut then proceeds unchanged.
pub(crate) fn lift_through(
    subspace: &IntMatrix,
    halfspace: &[i64],
    cut: usize,
    nr_halfspaces: usize,
) -> Result<Option<Lift>, DualError> {
    if subspace.nr_rows() == 0 {
        return Ok(None);
    }
    let restriction: Vec<i64> = subspace
        .rows_iter()
        .map(|b| checked_dot(halfspace, b))
        .collect::<Result<_, _>>()?;
    if restriction.iter().all(|&v| v == 0) {
        return Ok(None);
    }
    let fk = kernel_of_functional(&restriction)?;
    let coords = subspace.linear_combination(&fk.combination)?;
    let minus_coords: Vec<i64> = coords
        .iter()
        .map(|&x| {
            x.checked_neg().ok_or(DualError::Overflow {
                stage: "lifted generator",
            })
        })
        .collect::<Result<_, _>>()?;

    // `v` lies in every previously processed hyperplane, so only the current
    // value slot and the degree are nonzero.
    let mut plus = Candidate::seed(coords, nr_halfspaces);
    plus.values[cut] = fk.gcd;
    plus.degree = fk.gcd;
    let mut minus = Candidate::seed(minus_coords, nr_halfspaces);
    minus.values[cut] = -fk.gcd;
    minus.degree = fk.gcd;

    let mut new_subspace = IntMatrix::zero(0, subspace.nr_cols());
    for w in fk.kernel.rows_iter() {
        new_subspace.push_row(&subspace.linear_combination(w)?);
    }
    Ok(Some(Lift {
        injected: (plus, minus),
        new_subspace,
    }))
}
