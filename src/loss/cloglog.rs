//! Binomial log-likelihood with complementary log-log link.

use super::{validate_case_weights, SaturatedLoss};
use crate::core::Shape;
use crate::solvers::PathError;
use faer::{Col, Mat};

/// Linear predictors above this are clamped before exponentiation.
const ETA_MAX: f64 = 700.0;

/// Negative binomial log-likelihood with `p = 1 - exp(-exp(η))`.
///
/// For `s` successes out of `m` trials the case loss is
/// `-s·log(1 - exp(-exp(η))) + (m - s)·exp(η)`.
#[derive(Debug, Clone)]
pub struct CloglogLoss {
    successes: Col<f64>,
    trials: Col<f64>,
    offset: Option<Col<f64>>,
    case_weights: Vec<f64>,
}

impl CloglogLoss {
    /// Binary responses (one trial per case).
    pub fn new(successes: Col<f64>) -> Result<Self, PathError> {
        let n = successes.nrows();
        Self::with_trials(successes, Col::from_fn(n, |_| 1.0))
    }

    /// Binomial responses with `trials[i]` trials per case.
    pub fn with_trials(successes: Col<f64>, trials: Col<f64>) -> Result<Self, PathError> {
        if trials.nrows() != successes.nrows() {
            return Err(PathError::LengthMismatch {
                context: "cloglog trials",
                expected: successes.nrows(),
                found: trials.nrows(),
            });
        }
        for i in 0..successes.nrows() {
            let (s, m) = (successes[i], trials[i]);
            if !(s.is_finite() && m.is_finite() && s >= 0.0 && s <= m) {
                return Err(PathError::InvalidWeights(format!(
                    "case {}: need 0 <= successes <= trials, got {} of {}",
                    i, s, m
                )));
            }
        }
        let n = successes.nrows();
        Ok(Self {
            successes,
            trials,
            offset: None,
            case_weights: vec![1.0; n],
        })
    }

    /// Add a saturated offset to the linear predictor.
    pub fn with_offset(mut self, offset: Col<f64>) -> Result<Self, PathError> {
        if offset.nrows() != self.successes.nrows() {
            return Err(PathError::LengthMismatch {
                context: "cloglog offset",
                expected: self.successes.nrows(),
                found: offset.nrows(),
            });
        }
        self.offset = Some(offset);
        Ok(self)
    }

    pub fn with_case_weights_checked(self, case_weights: Vec<f64>) -> Result<Self, PathError> {
        validate_case_weights(&case_weights, self.successes.nrows())?;
        Ok(Self {
            case_weights,
            ..self
        })
    }

    pub fn successes(&self) -> &Col<f64> {
        &self.successes
    }

    pub fn trials(&self) -> &Col<f64> {
        &self.trials
    }

    #[inline]
    fn shifted(&self, eta: f64, i: usize) -> f64 {
        let e = match &self.offset {
            Some(o) => eta + o[i],
            None => eta,
        };
        e.min(ETA_MAX)
    }

    /// Weighted loss of each case at linear predictor `eta` (length n).
    pub fn case_losses(&self, eta: &[f64]) -> Vec<f64> {
        eta.iter()
            .enumerate()
            .map(|(i, &e)| {
                let exp_eta = self.shifted(e, i).exp();
                let s = self.successes[i];
                let m = self.trials[i];
                // log p = log(1 - exp(-exp(η)))
                let log_p = if s > 0.0 {
                    (-(-exp_eta).exp_m1()).ln()
                } else {
                    0.0
                };
                self.case_weights[i] * (-s * log_p + (m - s) * exp_eta)
            })
            .collect()
    }
}

impl SaturatedLoss for CloglogLoss {
    fn shape(&self) -> Shape {
        Shape::new(self.successes.nrows(), 1)
    }

    fn value(&self, eta: &Mat<f64>) -> f64 {
        let eta: Vec<f64> = (0..eta.nrows()).map(|i| eta[(i, 0)]).collect();
        self.case_losses(&eta).iter().sum()
    }

    fn gradient(&self, eta: &Mat<f64>) -> Mat<f64> {
        Mat::from_fn(self.successes.nrows(), 1, |i, _| {
            let exp_eta = self.shifted(eta[(i, 0)], i).exp();
            let s = self.successes[i];
            let m = self.trials[i];
            // d/dη log p = exp(η) / (exp(exp(η)) - 1)
            let ratio = if exp_eta < 1e-12 {
                1.0
            } else {
                exp_eta / exp_eta.exp_m1()
            };
            self.case_weights[i] * (-s * ratio + (m - s) * exp_eta)
        })
    }

    fn case_weights(&self) -> &[f64] {
        &self.case_weights
    }

    fn with_case_weights(&self, case_weights: Vec<f64>) -> Self {
        Self {
            successes: self.successes.clone(),
            trials: self.trials.clone(),
            offset: self.offset.clone(),
            case_weights,
        }
    }
}
