//! Poisson log-likelihood with log link.

use super::{validate_case_weights, SaturatedLoss};
use crate::core::{Link, Shape};
use crate::solvers::PathError;
use faer::{Col, Mat};

/// Negative Poisson log-likelihood (up to constants):
/// `Σᵢ wᵢ (exp(ηᵢ + oᵢ) - yᵢ (ηᵢ + oᵢ))`.
#[derive(Debug, Clone)]
pub struct PoissonLoss {
    counts: Col<f64>,
    offset: Option<Col<f64>>,
    case_weights: Vec<f64>,
}

impl PoissonLoss {
    pub fn new(counts: Col<f64>) -> Result<Self, PathError> {
        if counts.iter().any(|c| !c.is_finite() || *c < 0.0) {
            return Err(PathError::InvalidWeights(
                "Poisson counts must be finite and non-negative".to_string(),
            ));
        }
        let n = counts.nrows();
        Ok(Self {
            counts,
            offset: None,
            case_weights: vec![1.0; n],
        })
    }

    /// Add an offset to the linear predictor (e.g. log exposure).
    pub fn with_offset(mut self, offset: Col<f64>) -> Result<Self, PathError> {
        if offset.nrows() != self.counts.nrows() {
            return Err(PathError::LengthMismatch {
                context: "Poisson offset",
                expected: self.counts.nrows(),
                found: offset.nrows(),
            });
        }
        self.offset = Some(offset);
        Ok(self)
    }

    pub fn with_case_weights_checked(self, case_weights: Vec<f64>) -> Result<Self, PathError> {
        validate_case_weights(&case_weights, self.counts.nrows())?;
        Ok(Self {
            case_weights,
            ..self
        })
    }

    #[inline]
    fn shifted(&self, eta: &Mat<f64>, i: usize) -> f64 {
        match &self.offset {
            Some(o) => eta[(i, 0)] + o[i],
            None => eta[(i, 0)],
        }
    }
}

impl SaturatedLoss for PoissonLoss {
    fn shape(&self) -> Shape {
        Shape::new(self.counts.nrows(), 1)
    }

    fn value(&self, eta: &Mat<f64>) -> f64 {
        (0..self.counts.nrows())
            .map(|i| {
                let e = self.shifted(eta, i);
                self.case_weights[i] * (Link::Log.link_inverse(e) - self.counts[i] * e)
            })
            .sum()
    }

    fn gradient(&self, eta: &Mat<f64>) -> Mat<f64> {
        Mat::from_fn(self.counts.nrows(), 1, |i, _| {
            let mu = Link::Log.link_inverse(self.shifted(eta, i));
            self.case_weights[i] * (mu - self.counts[i])
        })
    }

    fn case_weights(&self) -> &[f64] {
        &self.case_weights
    }

    fn with_case_weights(&self, case_weights: Vec<f64>) -> Self {
        Self {
            counts: self.counts.clone(),
            offset: self.offset.clone(),
            case_weights,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_zero_at_log_counts() {
        let counts = Col::from_fn(3, |i| (i + 1) as f64);
        let loss = PoissonLoss::new(counts.clone()).unwrap();
        let eta = Mat::from_fn(3, 1, |i, _| counts[i].ln());
        let g = loss.gradient(&eta);
        for i in 0..3 {
            assert!(g[(i, 0)].abs() < 1e-12);
        }
    }

    #[test]
    fn test_offset_shifts_predictor() {
        let counts = Col::from_fn(2, |_| 2.0);
        let loss = PoissonLoss::new(counts)
            .unwrap()
            .with_offset(Col::from_fn(2, |_| 2.0f64.ln()))
            .unwrap();
        let g = loss.gradient(&Mat::zeros(2, 1));
        assert!(g[(0, 0)].abs() < 1e-12);
    }

    #[test]
    fn test_negative_counts_rejected() {
        assert!(PoissonLoss::new(Col::from_fn(2, |i| i as f64 - 1.0)).is_err());
    }
}
