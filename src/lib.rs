//! Sparse-group regularized GLM solution paths.
//!
//! This library computes solutions of
//!
//! ```text
//! minimize  ℓ(Xβ) + λ Σ_g ( l1_g ‖β_g‖₁ + l2_g ‖β_g‖₂ )
//! ```
//!
//! over a decreasing grid of Lagrange values `λ`, where `β_g` is row `g` of
//! a `(groups, responses)` coefficient matrix. Each value is screened with
//! the strong rule, solved on the candidate groups only, and certified by
//! KKT checks over all groups.
//!
//! # Example
//!
//! ```rust,ignore
//! use sgl_path::prelude::*;
//!
//! let options = PathOptions::builder()
//!     .n_lagrange(50)
//!     .lagrange_proportion(0.01)
//!     .build()?;
//!
//! let mut path = multinomial(x, counts, l1, l2, None, options)?;
//! let result = path.fit(None)?;
//!
//! for step in &result.steps {
//!     println!("λ = {:.4}: {} active groups", step.lagrange, step.n_active());
//! }
//! for warning in result.diagnostics.iter().filter(|d| d.kind.is_warning()) {
//!     println!("{}", warning.message);
//! }
//! ```

pub mod core;
pub mod design;
pub mod diagnostics;
pub mod estimator;
pub mod loss;
pub mod path;
pub mod penalty;
pub mod solvers;
pub mod utils;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::{
        Link, NonConvergencePolicy, OptionsError, PathOptions, PathOptionsBuilder, PathResult,
        PathStep, Shape, SolveOptions, StepStatus,
    };
    pub use crate::design::{BlockDesign, DenseDesign, Design};
    pub use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticLog};
    pub use crate::estimator::{
        ClassificationScorer, CloglogFactory, CloglogScorer, FittedPathEstimator, LossFactory,
        PathEstimator, PathEstimatorBuilder, Response, ScoreMethod, Scorer,
    };
    pub use crate::loss::{
        CloglogLoss, GaussianLoss, MultinomialLoss, PoissonLoss, SaturatedLoss, SmoothLoss,
    };
    pub use crate::path::{
        multinomial, multiresponse_gaussian, stacked_gaussian, BlockPath, CommonPath, KktStatus,
        SparseGroupPath, StrongSet,
    };
    pub use crate::penalty::SparseGroupBlock;
    pub use crate::solvers::{PathError, SimpleProblem};
}

pub use crate::core::{PathOptions, PathOptionsBuilder, PathResult, PathStep, Shape};
pub use crate::path::SparseGroupPath;
pub use crate::penalty::SparseGroupBlock;
pub use crate::solvers::PathError;
