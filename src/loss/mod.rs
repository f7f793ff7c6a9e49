//! Smooth losses consumed by the path.
//!
//! Two levels of loss appear in a path:
//!
//! - [`SaturatedLoss`]: a likelihood parameterized directly by the `(n, q)`
//!   linear predictor (Gaussian, multinomial, Poisson, cloglog).
//! - [`SmoothLoss`]: a smooth function of the `(groups, q)` coefficients,
//!   such as a saturated loss composed with a design ([`AffineSmooth`]) or
//!   the elastic-net ridge term ([`DiagonalQuadratic`]).
//!
//! All saturated losses carry case weights; [`SaturatedLoss::subsample`]
//! reweights them so that only the selected cases contribute.

mod affine;
mod cloglog;
mod gaussian;
mod multinomial;
mod poisson;
mod quadratic;

pub use affine::AffineSmooth;
pub use cloglog::CloglogLoss;
pub use gaussian::GaussianLoss;
pub use multinomial::MultinomialLoss;
pub use poisson::PoissonLoss;
pub use quadratic::DiagonalQuadratic;

use crate::core::Shape;
use crate::solvers::PathError;
use faer::Mat;

/// Which parts of a smooth objective to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Func,
    Grad,
    Both,
}

/// Result of [`SaturatedLoss::smooth_objective`] / [`SmoothLoss::smooth_objective`].
#[derive(Debug, Clone)]
pub enum Objective {
    Func(f64),
    Grad(Mat<f64>),
    Both(f64, Mat<f64>),
}

impl Objective {
    /// Objective value, if it was requested.
    pub fn value(&self) -> Option<f64> {
        match self {
            Objective::Func(v) | Objective::Both(v, _) => Some(*v),
            Objective::Grad(_) => None,
        }
    }

    /// Gradient, if it was requested.
    pub fn into_gradient(self) -> Option<Mat<f64>> {
        match self {
            Objective::Grad(g) | Objective::Both(_, g) => Some(g),
            Objective::Func(_) => None,
        }
    }
}

/// A likelihood-type loss of the linear predictor.
pub trait SaturatedLoss: Clone {
    /// Shape `(n_cases, n_responses)` of the linear predictor.
    fn shape(&self) -> Shape;

    /// Loss value at linear predictor `eta`.
    fn value(&self, eta: &Mat<f64>) -> f64;

    /// Gradient with respect to `eta`, same shape as `eta`.
    fn gradient(&self, eta: &Mat<f64>) -> Mat<f64>;

    /// Per-case weights (length `n_cases`).
    fn case_weights(&self) -> &[f64];

    /// Copy of this loss with replaced case weights.
    fn with_case_weights(&self, case_weights: Vec<f64>) -> Self;

    /// Evaluate value and/or gradient.
    fn smooth_objective(&self, eta: &Mat<f64>, mode: Mode) -> Objective {
        match mode {
            Mode::Func => Objective::Func(self.value(eta)),
            Mode::Grad => Objective::Grad(self.gradient(eta)),
            Mode::Both => Objective::Both(self.value(eta), self.gradient(eta)),
        }
    }

    /// Loss over a subset of cases.
    ///
    /// Weights of cases outside `case_idx` become zero. A case listed more
    /// than once counts once per occurrence, so bootstrap resamples work.
    fn subsample(&self, case_idx: &[usize]) -> Result<Self, PathError> {
        let weights = subsample_weights(self.case_weights(), case_idx)?;
        Ok(self.with_case_weights(weights))
    }
}

/// A smooth function of the coefficients.
pub trait SmoothLoss {
    /// Shape `(n_groups, n_responses)` of the coefficients.
    fn shape(&self) -> Shape;

    fn value(&self, coef: &Mat<f64>) -> f64;

    fn gradient(&self, coef: &Mat<f64>) -> Mat<f64>;

    /// Evaluate value and/or gradient.
    fn smooth_objective(&self, coef: &Mat<f64>, mode: Mode) -> Objective {
        match mode {
            Mode::Func => Objective::Func(self.value(coef)),
            Mode::Grad => Objective::Grad(self.gradient(coef)),
            Mode::Both => Objective::Both(self.value(coef), self.gradient(coef)),
        }
    }
}

pub(crate) fn subsample_weights(weights: &[f64], case_idx: &[usize]) -> Result<Vec<f64>, PathError> {
    if case_idx.is_empty() {
        return Err(PathError::EmptySubsample);
    }
    let n_cases = weights.len();
    let mut new_weights = vec![0.0; n_cases];
    for &i in case_idx {
        if i >= n_cases {
            return Err(PathError::CaseIndexOutOfBounds { index: i, n_cases });
        }
        new_weights[i] += weights[i];
    }
    Ok(new_weights)
}

pub(crate) fn validate_case_weights(weights: &[f64], n_cases: usize) -> Result<(), PathError> {
    if weights.len() != n_cases {
        return Err(PathError::LengthMismatch {
            context: "case weights",
            expected: n_cases,
            found: weights.len(),
        });
    }
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(PathError::InvalidWeights(
            "case weights must be finite and non-negative".to_string(),
        ));
    }
    Ok(())
}
