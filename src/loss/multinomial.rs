//! Multinomial log-likelihood over `q` categories.

use super::{validate_case_weights, SaturatedLoss};
use crate::core::Shape;
use crate::solvers::PathError;
use faer::Mat;

/// Negative multinomial log-likelihood with a free natural parameter for
/// every category.
///
/// With counts `y` and `Nᵢ = Σₖ yᵢₖ`, the loss is
/// `Σᵢ wᵢ (Nᵢ · logsumexp(ηᵢ) - Σₖ yᵢₖ ηᵢₖ)`.
#[derive(Debug, Clone)]
pub struct MultinomialLoss {
    counts: Mat<f64>,
    case_weights: Vec<f64>,
}

impl MultinomialLoss {
    /// Loss from an `(n, q)` matrix of non-negative counts.
    pub fn new(counts: Mat<f64>) -> Result<Self, PathError> {
        for j in 0..counts.ncols() {
            for i in 0..counts.nrows() {
                let c = counts[(i, j)];
                if !c.is_finite() || c < 0.0 {
                    return Err(PathError::InvalidWeights(format!(
                        "multinomial counts must be finite and non-negative, got {} at ({}, {})",
                        c, i, j
                    )));
                }
            }
        }
        let n = counts.nrows();
        Ok(Self {
            counts,
            case_weights: vec![1.0; n],
        })
    }

    /// Loss from class labels in `0..n_classes` (one-hot counts).
    pub fn from_labels(labels: &[usize], n_classes: usize) -> Result<Self, PathError> {
        if let Some(&bad) = labels.iter().find(|&&l| l >= n_classes) {
            return Err(PathError::LengthMismatch {
                context: "multinomial label vs number of classes",
                expected: n_classes,
                found: bad + 1,
            });
        }
        let counts = Mat::from_fn(labels.len(), n_classes, |i, k| {
            if labels[i] == k {
                1.0
            } else {
                0.0
            }
        });
        Self::new(counts)
    }

    /// Loss with explicit case weights.
    pub fn with_weights(counts: Mat<f64>, case_weights: Vec<f64>) -> Result<Self, PathError> {
        validate_case_weights(&case_weights, counts.nrows())?;
        let mut loss = Self::new(counts)?;
        loss.case_weights = case_weights;
        Ok(loss)
    }

    pub fn counts(&self) -> &Mat<f64> {
        &self.counts
    }

    /// Category probabilities implied by `eta` (softmax of each row).
    pub fn probabilities(&self, eta: &Mat<f64>) -> Mat<f64> {
        let mut probs = Mat::zeros(eta.nrows(), eta.ncols());
        for i in 0..eta.nrows() {
            let (max, sum) = row_exp_sum(eta, i);
            for k in 0..eta.ncols() {
                probs[(i, k)] = (eta[(i, k)] - max).exp() / sum;
            }
        }
        probs
    }
}

/// Row maximum and Σₖ exp(ηᵢₖ - max).
fn row_exp_sum(eta: &Mat<f64>, i: usize) -> (f64, f64) {
    let max = (0..eta.ncols())
        .map(|k| eta[(i, k)])
        .fold(f64::NEG_INFINITY, f64::max);
    let sum = (0..eta.ncols()).map(|k| (eta[(i, k)] - max).exp()).sum();
    (max, sum)
}

impl SaturatedLoss for MultinomialLoss {
    fn shape(&self) -> Shape {
        Shape::of(&self.counts)
    }

    fn value(&self, eta: &Mat<f64>) -> f64 {
        let mut total = 0.0;
        for i in 0..self.counts.nrows() {
            let w = self.case_weights[i];
            if w == 0.0 {
                continue;
            }
            let (max, sum) = row_exp_sum(eta, i);
            let logsumexp = max + sum.ln();
            let mut n_i = 0.0;
            let mut linear = 0.0;
            for k in 0..self.counts.ncols() {
                n_i += self.counts[(i, k)];
                linear += self.counts[(i, k)] * eta[(i, k)];
            }
            total += w * (n_i * logsumexp - linear);
        }
        total
    }

    fn gradient(&self, eta: &Mat<f64>) -> Mat<f64> {
        let probs = self.probabilities(eta);
        let mut grad = Mat::zeros(self.counts.nrows(), self.counts.ncols());
        for i in 0..self.counts.nrows() {
            let w = self.case_weights[i];
            let n_i: f64 = (0..self.counts.ncols()).map(|k| self.counts[(i, k)]).sum();
            for k in 0..self.counts.ncols() {
                grad[(i, k)] = w * (n_i * probs[(i, k)] - self.counts[(i, k)]);
            }
        }
        grad
    }

    fn case_weights(&self) -> &[f64] {
        &self.case_weights
    }

    fn with_case_weights(&self, case_weights: Vec<f64>) -> Self {
        Self {
            counts: self.counts.clone(),
            case_weights,
        }
    }
}
