//! Hilbert bases of pointed rational cones by the dual algorithm.
//!
//! The cone is given by homogeneous integer inequalities (its facet
//! description); the core maintains a growing, self-reducing set of lattice
//! vectors under one halfspace cut at a time and yields the minimal
//! generating set of the cone's lattice-point monoid, together with the
//! extreme rays and the irredundant support-hyperplane list.
//!
//! Arithmetic runs on checked machine words with exact big-integer
//! elimination behind the rank and kernel queries; overflow aborts the whole
//! computation rather than ever wrapping. The pairwise combination loops are
//! data-parallel with no shared mutable state.

pub mod api;
pub mod dual;
pub mod error;
pub mod matrix;
pub mod rand_cone;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use dual::{DualCfg, DualCone, Phase};
pub use error::DualError;
pub use matrix::{IntMatrix, SublatticeTransform};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::dual::{CutPolicy, DualCfg, DualCone, Phase};
    pub use crate::error::DualError;
    pub use crate::matrix::{checked_dot, IntMatrix, SublatticeTransform};
    pub use crate::rand_cone::{draw_cone_matrix, RandConeCfg};
}
