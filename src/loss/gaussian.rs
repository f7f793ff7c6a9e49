//! Gaussian (squared-error) loss for one or more responses.

use super::{validate_case_weights, SaturatedLoss};
use crate::core::Shape;
use crate::solvers::PathError;
use faer::{Col, Mat};

/// Weighted squared-error loss: ½ Σᵢ wᵢ Σₖ (ηᵢₖ - yᵢₖ)².
///
/// Responses are the columns of `response`; a single response is an
/// `(n, 1)` matrix.
#[derive(Debug, Clone)]
pub struct GaussianLoss {
    response: Mat<f64>,
    case_weights: Vec<f64>,
}

impl GaussianLoss {
    /// Unweighted loss for a multi-response matrix.
    pub fn new(response: Mat<f64>) -> Self {
        let n = response.nrows();
        Self {
            response,
            case_weights: vec![1.0; n],
        }
    }

    /// Unweighted loss for a single response vector.
    pub fn from_column(y: &Col<f64>) -> Self {
        Self::new(Mat::from_fn(y.nrows(), 1, |i, _| y[i]))
    }

    /// Loss with explicit case weights.
    pub fn with_weights(response: Mat<f64>, case_weights: Vec<f64>) -> Result<Self, PathError> {
        validate_case_weights(&case_weights, response.nrows())?;
        Ok(Self {
            response,
            case_weights,
        })
    }

    pub fn response(&self) -> &Mat<f64> {
        &self.response
    }
}

impl SaturatedLoss for GaussianLoss {
    fn shape(&self) -> Shape {
        Shape::of(&self.response)
    }

    fn value(&self, eta: &Mat<f64>) -> f64 {
        let mut total = 0.0;
        for k in 0..self.response.ncols() {
            for i in 0..self.response.nrows() {
                let r = eta[(i, k)] - self.response[(i, k)];
                total += self.case_weights[i] * r * r;
            }
        }
        0.5 * total
    }

    fn gradient(&self, eta: &Mat<f64>) -> Mat<f64> {
        Mat::from_fn(self.response.nrows(), self.response.ncols(), |i, k| {
            self.case_weights[i] * (eta[(i, k)] - self.response[(i, k)])
        })
    }

    fn case_weights(&self) -> &[f64] {
        &self.case_weights
    }

    fn with_case_weights(&self, case_weights: Vec<f64>) -> Self {
        Self {
            response: self.response.clone(),
            case_weights,
        }
    }
}
