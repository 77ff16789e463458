//! Error taxonomy for the dual algorithm.
//!
//! Three families, none of them retried:
//! - structural input errors, detected once at construction or when a
//!   sublattice transform is applied;
//! - arithmetic overflow on the `i64` fast path, raised after the parallel
//!   region that observed it;
//! - resource exhaustion when the candidate set outgrows the configured cap.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DualError {
    #[error("input matrix has no columns")]
    EmptyMatrix,

    #[error("row {row} has {found} entries, expected {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("halfspace matrix has rank {rank} but ambient dimension is {dim}; the cone is not pointed")]
    NotPointed { dim: usize, rank: usize },

    #[error("grading row has {found} entries, expected {expected}")]
    GradingLength { expected: usize, found: usize },

    #[error("computation already ran; construct a new cone for another pass")]
    AlreadyRun,

    #[error("no finished computation to transform")]
    NothingComputed,

    #[error("sublattice transform does not map the stored vectors to integer coordinates")]
    TransformMismatch,

    #[error("arithmetic overflow during {stage}")]
    Overflow { stage: &'static str },

    #[error("candidate set exceeded the configured limit of {limit} vectors")]
    CandidateLimit { limit: usize },
}
