//! Data types for the dual algorithm and its driver state.
//!
//! Kept small and explicit to make `cut` and `reduce` easy to read.

use std::cmp::Ordering;

/// Augmented lattice vector processed by the cut loop.
///
/// One struct field per slot group of the flat working vector:
/// degree, per-halfspace values, generation, parent value, coordinates.
///
/// Invariants:
/// - `values[i]` is the exact value of halfspace `i` on `coords` once that
///   halfspace has been processed, and 0 before.
/// - `degree` equals the sum of `|values[i]|` over processed halfspaces; it
///   is maintained incrementally and is a pure function of the value window,
///   which is what makes the strict-degree domination tiebreak equivalent to
///   "entrywise no larger and not equal".
/// - `generation`: 2 = created this round, 1 = created last round, 0 = older.
/// - `parent_value`: for vectors created during the current cut, the larger
///   halfspace-value among the two parents (the positive parent's value);
///   0 otherwise.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub degree: i64,
    pub values: Vec<i64>,
    pub generation: u8,
    pub parent_value: i64,
    pub coords: Vec<i64>,
}

impl Candidate {
    /// A vector no halfspace has seen yet.
    pub(crate) fn seed(coords: Vec<i64>, nr_halfspaces: usize) -> Self {
        Self {
            degree: 0,
            values: vec![0; nr_halfspaces],
            generation: 1,
            parent_value: 0,
            coords,
        }
    }

    /// Scan order for reduction: ascending degree so that potential
    /// dominators come first, coordinates as a deterministic tiebreak.
    pub(crate) fn cmp_for_reduction(&self, other: &Self) -> Ordering {
        self.degree
            .cmp(&other.degree)
            .then_with(|| self.coords.cmp(&other.coords))
    }
}

/// Per-cut policy, computed once per halfspace and threaded explicitly
/// through the engine and reduction calls.
#[derive(Clone, Copy, Debug, Default)]
pub struct CutPolicy {
    /// Only grading-value-one elements are wanted.
    pub truncate: bool,
    /// No positive candidate currently has grading value one, so negative
    /// candidates with nonzero grading value cannot contribute anymore.
    pub no_degree_one_positives: bool,
}

/// Driver configuration.
#[derive(Clone, Debug)]
pub struct DualCfg {
    /// Optional grading row; when set, the run truncates to grading-value-one
    /// elements (degree-bounded mode).
    pub truncation: Option<Vec<i64>>,
    /// Hard cap on the candidate set, checked once per combination round.
    pub max_candidates: usize,
}

impl Default for DualCfg {
    fn default() -> Self {
        Self {
            truncation: None,
            max_candidates: 5_000_000,
        }
    }
}

/// Driver lifecycle. Every transition is one-way; `Failed` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Constructed,
    Cutting(usize),
    Finalizing,
    Done,
    Failed,
}
