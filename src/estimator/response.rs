//! Binomial responses for the estimator adapters.

use crate::solvers::PathError;
use faer::Col;

/// Successes per case, with optional trials, case weights and offset.
///
/// All parts have one entry per case; lengths are checked as parts are
/// added.
#[derive(Debug, Clone)]
pub struct Response {
    successes: Col<f64>,
    trials: Option<Col<f64>>,
    case_weights: Option<Vec<f64>>,
    offset: Option<Col<f64>>,
}

impl Response {
    /// Binary (0/1) or binomial success counts, one trial per case.
    pub fn new(successes: Col<f64>) -> Self {
        Self {
            successes,
            trials: None,
            case_weights: None,
            offset: None,
        }
    }

    /// Binary response from labels.
    pub fn from_labels(labels: &[bool]) -> Self {
        Self::new(Col::from_fn(labels.len(), |i| if labels[i] { 1.0 } else { 0.0 }))
    }

    pub fn with_trials(mut self, trials: Col<f64>) -> Result<Self, PathError> {
        self.check_len("response trials", trials.nrows())?;
        self.trials = Some(trials);
        Ok(self)
    }

    pub fn with_case_weights(mut self, case_weights: Vec<f64>) -> Result<Self, PathError> {
        self.check_len("response case weights", case_weights.len())?;
        self.case_weights = Some(case_weights);
        Ok(self)
    }

    pub fn with_offset(mut self, offset: Col<f64>) -> Result<Self, PathError> {
        self.check_len("response offset", offset.nrows())?;
        self.offset = Some(offset);
        Ok(self)
    }

    fn check_len(&self, context: &'static str, found: usize) -> Result<(), PathError> {
        if found != self.len() {
            return Err(PathError::LengthMismatch {
                context,
                expected: self.len(),
                found,
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.successes.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn successes(&self) -> &Col<f64> {
        &self.successes
    }

    pub fn trials(&self) -> Option<&Col<f64>> {
        self.trials.as_ref()
    }

    pub fn case_weights(&self) -> Option<&[f64]> {
        self.case_weights.as_deref()
    }

    pub fn offset(&self) -> Option<&Col<f64>> {
        self.offset.as_ref()
    }

    /// Trials of case `i` (1 when no trials were given).
    pub fn trials_at(&self, i: usize) -> f64 {
        self.trials.as_ref().map_or(1.0, |t| t[i])
    }

    /// Offset of case `i` (0 when no offset was given).
    pub fn offset_at(&self, i: usize) -> f64 {
        self.offset.as_ref().map_or(0.0, |o| o[i])
    }

    /// Observed success proportion of each case.
    pub fn proportions(&self) -> Vec<f64> {
        (0..self.len())
            .map(|i| {
                let m = self.trials_at(i);
                if m > 0.0 {
                    self.successes[i] / m
                } else {
                    0.0
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_checks() {
        let r = Response::new(Col::from_fn(3, |i| i as f64));
        assert!(r.clone().with_trials(Col::from_fn(3, |_| 4.0)).is_ok());
        assert!(matches!(
            r.clone().with_offset(Col::zeros(2)),
            Err(PathError::LengthMismatch { expected: 3, found: 2, .. })
        ));
        assert!(r.with_case_weights(vec![1.0; 4]).is_err());
    }

    #[test]
    fn test_proportions() {
        let r = Response::new(Col::from_fn(2, |i| i as f64 + 1.0))
            .with_trials(Col::from_fn(2, |_| 4.0))
            .unwrap();
        assert_eq!(r.proportions(), vec![0.25, 0.5]);
        assert_eq!(r.offset_at(1), 0.0);
        let labels = Response::from_labels(&[true, false]);
        assert_eq!(labels.successes()[0], 1.0);
        assert_eq!(labels.trials_at(1), 1.0);
    }
}
