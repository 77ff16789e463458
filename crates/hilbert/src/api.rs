//! Curated re-exports for downstream callers.
//!
//! Prefer these over deep module paths; the module layout may shift while
//! this surface stays put.

pub use crate::dual::{CutPolicy, DualCfg, DualCone, Phase};
pub use crate::error::DualError;
pub use crate::matrix::{checked_dot, kernel_of_functional, IntMatrix, SublatticeTransform};
pub use crate::rand_cone::{draw_cone_matrix, RandConeCfg};
