//! Dual algorithm: the Hilbert basis of a pointed rational cone computed
//! from its halfspace description.
//!
//! Purpose
//! - Feed halfspaces one at a time into the intersection engine, keeping the
//!   running candidate set reduced, then extract extreme rays and the
//!   irredundant support-hyperplane list from the finished basis.
//!
//! Why this design
//! - The engine works on contiguous candidate arenas with explicit bucket
//!   membership; merges and filters are index re-tagging, never pointer
//!   surgery.
//! - Lifting, cutting, reduction and extraction live in their own files:
//!   `types.rs` (data model), `cut.rs` (intersection engine), `reduce.rs`
//!   (domination), `lift.rs` (subspace splitting), `extract.rs`
//!   (post-processing).

mod cut;
mod extract;
mod lift;
mod reduce;
mod types;

pub use types::{CutPolicy, DualCfg, Phase};

use tracing::debug;

use crate::error::DualError;
use crate::matrix::{checked_dot, primitivize, IntMatrix, SublatticeTransform};
use types::Candidate;

#[cfg(test)]
mod tests;

/// Driver and state container for one dual-algorithm run.
///
/// Construction normalizes the halfspace list (zero rows removed, rows
/// gcd-primitive, exact duplicates dropped) and fails unless the normals
/// have full column rank, i.e. the cone is pointed. `compute` walks the
/// halfspaces first to last and is consumed by its first call; accessors
/// return the finished results afterwards.
#[derive(Debug)]
pub struct DualCone {
    dim: usize,
    halfspaces: IntMatrix,
    cfg: DualCfg,
    phase: Phase,
    /// Basis of the maximal linear subspace of the halfspaces processed so
    /// far; starts as the ambient lattice and shrinks through lifting.
    subspace: IntMatrix,
    basis: Vec<Candidate>,
    generators: IntMatrix,
    support: IntMatrix,
    extreme: Vec<bool>,
}

impl DualCone {
    pub fn from_inequalities(normals: IntMatrix) -> Result<Self, DualError> {
        Self::with_cfg(normals, DualCfg::default())
    }

    pub fn with_cfg(normals: IntMatrix, cfg: DualCfg) -> Result<Self, DualError> {
        let dim = normals.nr_cols();
        if dim == 0 {
            return Err(DualError::EmptyMatrix);
        }
        if let Some(g) = &cfg.truncation {
            if g.len() != dim {
                return Err(DualError::GradingLength {
                    expected: dim,
                    found: g.len(),
                });
            }
        }
        let mut rows: Vec<Vec<i64>> = Vec::new();
        for r in normals.rows_iter() {
            let mut row = r.to_vec();
            if !primitivize(&mut row) {
                continue;
            }
            // Duplicates are dropped so the reported hyperplane list can be
            // irredundant.
            if rows.iter().any(|kept| kept == &row) {
                continue;
            }
            rows.push(row);
        }
        let halfspaces = IntMatrix::from_rows(rows, dim)?;
        let rank = halfspaces.rank();
        if rank < dim {
            return Err(DualError::NotPointed { dim, rank });
        }
        Ok(Self {
            dim,
            halfspaces,
            cfg,
            phase: Phase::Constructed,
            subspace: IntMatrix::identity(dim),
            basis: Vec::new(),
            generators: IntMatrix::zero(0, dim),
            support: IntMatrix::zero(0, dim),
            extreme: Vec::new(),
        })
    }

    /// Run every cut and the post-processing passes. One-shot: a second call
    /// fails, and any error leaves the cone in the terminal `Failed` phase.
    pub fn compute(&mut self) -> Result<(), DualError> {
        if self.phase != Phase::Constructed {
            return Err(DualError::AlreadyRun);
        }
        match self.run() {
            Ok(()) => {
                self.phase = Phase::Done;
                Ok(())
            }
            Err(e) => {
                self.phase = Phase::Failed;
                Err(e)
            }
        }
    }

    fn run(&mut self) -> Result<(), DualError> {
        let nr = self.halfspaces.nr_rows();
        let mut candidates: Vec<Candidate> = Vec::new();
        for idx in 0..nr {
            self.phase = Phase::Cutting(idx);
            let halfspace = self.halfspaces.row(idx).to_vec();
            let injected = match lift::lift_through(&self.subspace, &halfspace, idx, nr)? {
                Some(l) => {
                    debug!(
                        cut = idx,
                        subspace = l.new_subspace.nr_rows(),
                        "split line into half-line generators"
                    );
                    self.subspace = l.new_subspace;
                    Some(l.injected)
                }
                None => None,
            };
            candidates = cut::apply_halfspace(
                candidates,
                &halfspace,
                idx,
                injected,
                self.cfg.truncation.as_deref(),
                self.cfg.max_candidates,
            )?;
        }
        // Full column rank guarantees the subspace is consumed.
        debug_assert_eq!(self.subspace.nr_rows(), 0);

        self.phase = Phase::Finalizing;
        if let Some(g) = self.cfg.truncation.as_deref() {
            let mut kept = Vec::with_capacity(candidates.len());
            for c in candidates {
                if checked_dot(g, &c.coords)? == 1 {
                    kept.push(c);
                }
            }
            candidates = kept;
        }
        candidates.sort_unstable_by(|a, b| a.coords.cmp(&b.coords));

        self.extreme = extract::extreme_ray_flags(&candidates, &self.halfspaces, self.dim);
        let relevant =
            extract::relevant_hyperplane_flags(&candidates, &self.halfspaces, self.dim);
        let keep: Vec<usize> = relevant
            .iter()
            .enumerate()
            .filter_map(|(i, &r)| r.then_some(i))
            .collect();
        self.support = self.halfspaces.submatrix_of_rows(&keep);

        let mut generators = IntMatrix::zero(0, self.dim);
        for c in &candidates {
            generators.push_row(&c.coords);
        }
        self.generators = generators;
        self.basis = candidates;
        debug!(
            basis = self.basis.len(),
            extreme = self.extreme.iter().filter(|&&e| e).count(),
            support = self.support.nr_rows(),
            "dual algorithm finished"
        );
        Ok(())
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The irredundant support-hyperplane list (rows).
    pub fn support_hyperplanes(&self) -> &IntMatrix {
        &self.support
    }

    /// The generator matrix; `extreme_ray_flags` marks its extreme rows.
    pub fn generators(&self) -> &IntMatrix {
        &self.generators
    }

    /// Parallel marker for `generators`: true on extreme rays.
    pub fn extreme_ray_flags(&self) -> &[bool] {
        &self.extreme
    }

    /// The completed Hilbert basis, one element per row.
    pub fn hilbert_basis(&self) -> &IntMatrix {
        &self.generators
    }

    /// Rewrite all stored coordinates into a caller-provided sublattice
    /// basis. Points go through the point map, hyperplanes through the dual
    /// map; the value tables are pairings and survive unchanged.
    pub fn to_sublattice(&mut self, t: &SublatticeTransform) -> Result<(), DualError> {
        if self.phase != Phase::Done {
            return Err(DualError::NothingComputed);
        }
        let new_dim = t.point_map.nr_rows();
        if t.dual_map.nr_rows() != new_dim || new_dim == 0 {
            return Err(DualError::TransformMismatch);
        }
        let mut new_coords = Vec::with_capacity(self.basis.len());
        for c in &self.basis {
            new_coords.push(t.image_point(&c.coords)?);
        }
        let mut new_support = IntMatrix::zero(0, new_dim);
        for h in self.support.rows_iter() {
            let mut img = t.image_dual(h)?;
            primitivize(&mut img);
            new_support.push_row(&img);
        }
        let mut new_generators = IntMatrix::zero(0, new_dim);
        for row in &new_coords {
            new_generators.push_row(row);
        }
        for (c, coords) in self.basis.iter_mut().zip(new_coords) {
            c.coords = coords;
        }
        self.generators = new_generators;
        self.support = new_support;
        self.dim = new_dim;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn basis_candidates(&self) -> &[Candidate] {
        &self.basis
    }

    #[cfg(test)]
    pub(crate) fn raw_halfspaces(&self) -> &IntMatrix {
        &self.halfspaces
    }
}
