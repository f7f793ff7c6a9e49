//! Regularization paths for sparse-group penalties.
//!
//! Each Lagrange value on a decreasing grid is processed as
//!
//! 1. **screen**: the strong rule ([`strong`]) proposes candidate groups
//!    from the gradient at the previous value, using the dual-norm gate
//!    ([`gate`]);
//! 2. **solve**: the problem restricted to the candidates ([`restricted`])
//!    is solved warm-started from the previous solution;
//! 3. **verify**: the KKT checks ([`kkt`]) run over every group;
//! 4. **expand**: groups failing the checks join the candidate set and
//!    the value is solved again.
//!
//! # Example
//!
//! ```rust,ignore
//! use sgl_path::path::multiresponse_gaussian;
//! use sgl_path::core::PathOptions;
//!
//! let mut path = multiresponse_gaussian(x, y, l1, l2, None, PathOptions::default())?;
//! let result = path.fit(None)?;
//! for step in &result.steps {
//!     println!("λ = {:.3}: {} active groups", step.lagrange, step.n_active());
//! }
//! ```

mod driver;
pub mod gate;
pub mod kkt;
pub mod restricted;
mod sparse_group;
pub mod strong;

pub use driver::{default_lagrange_sequence, validate_lagrange_sequence};
pub use gate::{dual_gauge, gauge_value, inside_strong_set, GaugeDecomposition};
pub use kkt::{check_kkt, KktStatus, DEFAULT_KKT_TOLERANCE};
pub use restricted::{
    candidate_mask, restricted_elastic_net, restricted_problem, RestrictedLoss, RestrictedProblem,
};
pub use sparse_group::{
    multinomial, multiresponse_gaussian, stacked_gaussian, BlockPath, CommonPath, SparseGroupPath,
    SubproblemSolution, BIG,
};
pub use strong::{strong_set, strong_threshold, StrongSet, DEFAULT_SLOPE};
