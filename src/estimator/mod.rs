//! Estimators fitted by running a path down to a target Lagrange value.
//!
//! An estimator is the composition of a [`LossFactory`], which turns a
//! [`Response`] into a saturated loss, and a [`Scorer`], which scores
//! linear predictors against a response.
//!
//! # Example
//!
//! ```rust,ignore
//! use sgl_path::estimator::{CloglogFactory, CloglogScorer, PathEstimator, Response};
//!
//! let estimator = PathEstimator::builder(CloglogFactory, CloglogScorer::default())
//!     .lagrange(0.1)
//!     .with_intercept(true)
//!     .build();
//! let fitted = estimator.fit(&x, &Response::from_labels(&labels))?;
//! let probs = fitted.predict_proba(&x)?;
//! ```

mod cloglog;
mod response;

pub use cloglog::{ClassificationScorer, CloglogFactory, CloglogScorer, ScoreMethod};
pub use response::Response;

use crate::core::{Link, PathOptions, PathResult};
use crate::design::DenseDesign;
use crate::loss::SaturatedLoss;
use crate::path::{default_lagrange_sequence, SparseGroupPath};
use crate::solvers::PathError;
use faer::{Col, Mat};

/// Builds the saturated loss for a response.
pub trait LossFactory {
    type Loss: SaturatedLoss;

    fn loss(&self, response: &Response) -> Result<Self::Loss, PathError>;

    /// Link mapping linear predictors to means.
    fn link(&self) -> Link;
}

/// Scores linear predictors against a response; larger is not
/// necessarily better (deviances are losses).
pub trait Scorer {
    fn score(&self, eta: &Col<f64>, response: &Response) -> Result<f64, PathError>;
}

/// Single-response sparse-group estimator.
///
/// Each feature is its own group. The intercept, when enabled, is an
/// unpenalized column of ones.
#[derive(Debug, Clone)]
pub struct PathEstimator<F, S> {
    factory: F,
    scorer: S,
    lagrange: f64,
    l1_weight: Option<Vec<f64>>,
    l2_weight: Option<Vec<f64>>,
    fit_intercept: bool,
    options: PathOptions,
}

impl<F: LossFactory, S: Scorer + Clone> PathEstimator<F, S> {
    /// Estimator with default weights and options that fits down to `lagrange`.
    pub fn new(factory: F, scorer: S, lagrange: f64) -> Self {
        Self::builder(factory, scorer).lagrange(lagrange).build()
    }

    /// Create a builder for the given loss and scoring strategies.
    pub fn builder(factory: F, scorer: S) -> PathEstimatorBuilder<F, S> {
        PathEstimatorBuilder::new(factory, scorer)
    }

    pub fn lagrange(&self) -> f64 {
        self.lagrange
    }

    /// Run the path from `lagrange_max` down to the target value.
    pub fn fit(&self, x: &Mat<f64>, response: &Response) -> Result<FittedPathEstimator<S>, PathError> {
        if !(self.lagrange.is_finite() && self.lagrange > 0.0) {
            return Err(PathError::InvalidLagrangeSequence(format!(
                "target lagrange must be finite and positive, got {}",
                self.lagrange
            )));
        }
        let p = x.ncols();
        let mut l1 = self.l1_weight.clone().unwrap_or_else(|| vec![1.0; p]);
        let mut l2 = self.l2_weight.clone().unwrap_or_else(|| vec![0.0; p]);
        let design = if self.fit_intercept {
            l1.insert(0, 0.0);
            l2.insert(0, 0.0);
            DenseDesign::with_intercept(x, 1)
        } else {
            DenseDesign::new(x.clone(), 1)
        };

        let loss = self.factory.loss(response)?;
        let mut path = SparseGroupPath::new(loss, design, l1, l2, None, self.options.clone())?;

        let lagrange_max = path.lagrange_max();
        let seq = if lagrange_max > self.lagrange {
            default_lagrange_sequence(
                lagrange_max,
                self.lagrange / lagrange_max,
                self.options.n_lagrange,
            )
        } else {
            vec![self.lagrange]
        };
        let result = path.fit(Some(seq.as_slice()))?;

        let offset = usize::from(self.fit_intercept);
        let solution = path.solution();
        let coefficients = Col::from_fn(p, |j| solution[(j + offset, 0)]);
        let intercept = if self.fit_intercept { solution[(0, 0)] } else { 0.0 };

        Ok(FittedPathEstimator {
            coefficients,
            intercept,
            link: self.factory.link(),
            scorer: self.scorer.clone(),
            result,
        })
    }
}

/// Builder for [`PathEstimator`].
#[derive(Debug, Clone)]
pub struct PathEstimatorBuilder<F, S> {
    estimator: PathEstimator<F, S>,
}

impl<F: LossFactory, S: Scorer + Clone> PathEstimatorBuilder<F, S> {
    /// Builder with an intercept, default weights and `lagrange = 1`.
    pub fn new(factory: F, scorer: S) -> Self {
        Self {
            estimator: PathEstimator {
                factory,
                scorer,
                lagrange: 1.0,
                l1_weight: None,
                l2_weight: None,
                fit_intercept: true,
                options: PathOptions::default(),
            },
        }
    }

    /// Set the target Lagrange value the path runs down to.
    pub fn lagrange(mut self, lagrange: f64) -> Self {
        self.estimator.lagrange = lagrange;
        self
    }

    /// Set whether to include an unpenalized intercept.
    pub fn with_intercept(mut self, include: bool) -> Self {
        self.estimator.fit_intercept = include;
        self
    }

    /// Per-feature weights. Defaults to `l1 = 1`, `l2 = 0` for every feature.
    pub fn weights(mut self, l1_weight: Vec<f64>, l2_weight: Vec<f64>) -> Self {
        self.estimator.l1_weight = Some(l1_weight);
        self.estimator.l2_weight = Some(l2_weight);
        self
    }

    /// Set the path options.
    pub fn options(mut self, options: PathOptions) -> Self {
        self.estimator.options = options;
        self
    }

    /// Build the estimator. Options and weights are validated by `fit`.
    pub fn build(self) -> PathEstimator<F, S> {
        self.estimator
    }
}

/// Estimator fitted at its target Lagrange value.
#[derive(Debug, Clone)]
pub struct FittedPathEstimator<S> {
    coefficients: Col<f64>,
    intercept: f64,
    link: Link,
    scorer: S,
    result: PathResult,
}

impl<S: Scorer> FittedPathEstimator<S> {
    /// Feature coefficients, excluding the intercept.
    pub fn coefficients(&self) -> &Col<f64> {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Linear predictor `intercept + Xβ`.
    ///
    /// `x` must have one column per coefficient.
    pub fn predict(&self, x: &Mat<f64>) -> Result<Col<f64>, PathError> {
        if x.ncols() != self.coefficients.nrows() {
            return Err(PathError::LengthMismatch {
                context: "features vs coefficients",
                expected: self.coefficients.nrows(),
                found: x.ncols(),
            });
        }
        let xb = x * &self.coefficients;
        Ok(Col::from_fn(x.nrows(), |i| self.intercept + xb[i]))
    }

    /// Mean response through the inverse link.
    pub fn predict_proba(&self, x: &Mat<f64>) -> Result<Col<f64>, PathError> {
        let eta = self.predict(x)?;
        Ok(Col::from_fn(eta.nrows(), |i| self.link.link_inverse(eta[i])))
    }

    /// Score predictions for `x` against `response`.
    pub fn score(&self, x: &Mat<f64>, response: &Response) -> Result<f64, PathError> {
        self.scorer.score(&self.predict(x)?, response)
    }

    /// Full path leading to this fit.
    pub fn path(&self) -> &PathResult {
        &self.result
    }

    /// Number of nonzero feature coefficients.
    pub fn n_nonzero(&self) -> usize {
        (0..self.coefficients.nrows())
            .filter(|&j| self.coefficients[j] != 0.0)
            .count()
    }
}
