//! Complementary log-log loss factory and scorers.

use super::{LossFactory, Response, Scorer};
use crate::core::Link;
use crate::loss::CloglogLoss;
use crate::solvers::PathError;
use faer::Col;

/// Builds a [`CloglogLoss`] from a [`Response`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CloglogFactory;

impl CloglogFactory {
    fn build(response: &Response, with_offset: bool) -> Result<CloglogLoss, PathError> {
        let successes = response.successes().clone();
        let mut loss = match response.trials() {
            Some(trials) => CloglogLoss::with_trials(successes, trials.clone())?,
            None => CloglogLoss::new(successes)?,
        };
        if let Some(weights) = response.case_weights() {
            loss = loss.with_case_weights_checked(weights.to_vec())?;
        }
        if with_offset {
            if let Some(offset) = response.offset() {
                loss = loss.with_offset(offset.clone())?;
            }
        }
        Ok(loss)
    }
}

impl LossFactory for CloglogFactory {
    type Loss = CloglogLoss;

    fn loss(&self, response: &Response) -> Result<CloglogLoss, PathError> {
        Self::build(response, true)
    }

    fn link(&self) -> Link {
        Link::Cloglog
    }
}

/// How a regression fit is scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoreMethod {
    /// Sum of case losses.
    #[default]
    Deviance,
    /// Mean of case losses.
    MeanDeviance,
    /// `1 − SSE/SST` with SST from the constant predictor that reproduces
    /// the mean response.
    R2,
    /// Fraction of cases where `η > 0` matches the observed label.
    Accuracy,
}

/// Scores cloglog regression fits.
#[derive(Debug, Clone, Copy, Default)]
pub struct CloglogScorer {
    pub method: ScoreMethod,
}

impl CloglogScorer {
    pub fn new(method: ScoreMethod) -> Self {
        Self { method }
    }
}

impl Scorer for CloglogScorer {
    fn score(&self, eta: &Col<f64>, response: &Response) -> Result<f64, PathError> {
        check_len(eta, response)?;
        let n = response.len();
        let eta: Vec<f64> = (0..n).map(|i| eta[i]).collect();

        match self.method {
            ScoreMethod::Deviance => {
                Ok(CloglogFactory::build(response, true)?.case_losses(&eta).iter().sum())
            }
            ScoreMethod::MeanDeviance => {
                let losses = CloglogFactory::build(response, true)?.case_losses(&eta);
                Ok(losses.iter().sum::<f64>() / n as f64)
            }
            ScoreMethod::R2 => {
                let sse: f64 = CloglogFactory::build(response, true)?
                    .case_losses(&eta)
                    .iter()
                    .sum();
                let (s_total, m_total) = (0..n).fold((0.0, 0.0), |(s, m), i| {
                    let w = response.case_weights().map_or(1.0, |w| w[i]);
                    (s + w * response.successes()[i], m + w * response.trials_at(i))
                });
                let mean = if m_total > 0.0 { s_total / m_total } else { 0.0 };
                let null_eta = vec![Link::Cloglog.link(mean); n];
                let sst: f64 = CloglogFactory::build(response, false)?
                    .case_losses(&null_eta)
                    .iter()
                    .sum();
                Ok(1.0 - sse / sst)
            }
            ScoreMethod::Accuracy => {
                let observed = response.proportions();
                let hits = (0..n)
                    .filter(|&i| (eta[i] + response.offset_at(i) > 0.0) == (observed[i] > 0.5))
                    .count();
                Ok(hits as f64 / n as f64)
            }
        }
    }
}

/// Accuracy of labels `p > 0.5`, with `p` from the cloglog inverse link.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassificationScorer;

impl Scorer for ClassificationScorer {
    fn score(&self, eta: &Col<f64>, response: &Response) -> Result<f64, PathError> {
        check_len(eta, response)?;
        let n = response.len();
        let observed = response.proportions();
        let hits = (0..n)
            .filter(|&i| {
                let p = Link::Cloglog.link_inverse(eta[i] + response.offset_at(i));
                (p > 0.5) == (observed[i] > 0.5)
            })
            .count();
        Ok(hits as f64 / n as f64)
    }
}

fn check_len(eta: &Col<f64>, response: &Response) -> Result<(), PathError> {
    if eta.nrows() != response.len() {
        return Err(PathError::LengthMismatch {
            context: "predictions vs response",
            expected: response.len(),
            found: eta.nrows(),
        });
    }
    if response.is_empty() {
        return Err(PathError::EmptySubsample);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn response() -> Response {
        Response::from_labels(&[true, false, true, false])
    }

    #[test]
    fn test_factory_applies_weights() {
        let r = response().with_case_weights(vec![2.0, 1.0, 1.0, 1.0]).unwrap();
        let loss = CloglogFactory.loss(&r).unwrap();
        let unweighted = CloglogFactory.loss(&response()).unwrap();
        let eta = [0.3, 0.3, 0.3, 0.3];
        let w = loss.case_losses(&eta);
        let u = unweighted.case_losses(&eta);
        assert_relative_eq!(w[0], 2.0 * u[0], epsilon = 1e-12);
        assert_eq!(CloglogFactory.link(), Link::Cloglog);
    }

    #[test]
    fn test_deviance_and_mean() {
        let r = response();
        let eta = Col::from_fn(4, |i| if i % 2 == 0 { 1.0 } else { -1.0 });
        let dev = CloglogScorer::new(ScoreMethod::Deviance).score(&eta, &r).unwrap();
        let mean = CloglogScorer::new(ScoreMethod::MeanDeviance).score(&eta, &r).unwrap();
        assert!(dev > 0.0);
        assert_relative_eq!(mean, dev / 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_r2_of_null_predictor_is_zero() {
        let r = response();
        let null = Col::from_fn(4, |_| Link::Cloglog.link(0.5));
        let r2 = CloglogScorer::new(ScoreMethod::R2).score(&null, &r).unwrap();
        assert_relative_eq!(r2, 0.0, epsilon = 1e-10);
        let good = Col::from_fn(4, |i| if i % 2 == 0 { 2.0 } else { -3.0 });
        assert!(CloglogScorer::new(ScoreMethod::R2).score(&good, &r).unwrap() > 0.5);
    }

    #[test]
    fn test_accuracy() {
        let r = response();
        let eta = Col::from_fn(4, |i| if i == 0 { 1.0 } else { -1.0 });
        let acc = CloglogScorer::new(ScoreMethod::Accuracy).score(&eta, &r).unwrap();
        assert_relative_eq!(acc, 0.75, epsilon = 1e-12);
        // p(η = 0) = 1 − e⁻¹ > 0.5, so the classifier threshold sits below zero
        let zero = Col::zeros(4);
        let acc = ClassificationScorer.score(&zero, &r).unwrap();
        assert_relative_eq!(acc, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_length_mismatch() {
        let err = ClassificationScorer.score(&Col::zeros(3), &response());
        assert!(matches!(err, Err(PathError::LengthMismatch { .. })));
    }
}
