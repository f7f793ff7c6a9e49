//! Error type shared by the path, its collaborators, and the solver.

use crate::core::Shape;
use thiserror::Error;

/// Errors that can occur while building or running a regularization path.
#[derive(Debug, Error)]
pub enum PathError {
    #[error("shape mismatch in {context}: expected {expected}, found {found}")]
    ShapeMismatch {
        context: &'static str,
        expected: Shape,
        found: Shape,
    },

    #[error("length mismatch in {context}: expected {expected}, found {found}")]
    LengthMismatch {
        context: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("invalid weights: {0}")]
    InvalidWeights(String),

    #[error("candidate group {index} is out of range or duplicated (model has {n_groups} groups)")]
    InvalidCandidate { index: usize, n_groups: usize },

    #[error("case index {index} out of bounds for loss with {n_cases} cases")]
    CaseIndexOutOfBounds { index: usize, n_cases: usize },

    #[error("subsample selects no cases")]
    EmptySubsample,

    #[error("invalid Lagrange sequence: {0}")]
    InvalidLagrangeSequence(String),

    #[error("invalid options: {0}")]
    InvalidOptions(#[from] crate::core::OptionsError),

    #[error("convergence failed after {iterations} iterations")]
    ConvergenceFailed { iterations: usize },

    #[error("KKT conditions still violated at lagrange {lagrange} after {retries} retries")]
    KktRetriesExceeded { lagrange: f64, retries: usize },

    #[error("numerical error: {0}")]
    NumericalError(String),
}

impl PathError {
    /// Whether the driver may recover from this error by adjusting the solve.
    pub fn is_convergence_failure(&self) -> bool {
        matches!(self, PathError::ConvergenceFailed { .. })
    }
}
