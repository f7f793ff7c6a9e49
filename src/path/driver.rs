//! Path driver: screen, solve, verify, expand.

use super::sparse_group::{add, SparseGroupPath};
use crate::core::{NonConvergencePolicy, PathResult, PathStep, SolveOptions, StepStatus};
use crate::design::Design;
use crate::diagnostics::DiagnosticKind;
use crate::loss::SaturatedLoss;
use crate::solvers::PathError;
use crate::utils::{mask_to_indices, row_norms, scatter_rows};
use faer::Mat;

/// Floor for the inner tolerance when the driver tightens it.
const MIN_TOLERANCE: f64 = 1e-14;

/// `lagrange_max · exp(linspace(ln(proportion), 0, n))`, reversed.
///
/// Starts at `lagrange_max` and ends at `proportion · lagrange_max`.
pub fn default_lagrange_sequence(lagrange_max: f64, proportion: f64, n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![lagrange_max];
    }
    let log_p = proportion.ln();
    (0..n)
        .map(|i| lagrange_max * (log_p * i as f64 / (n - 1) as f64).exp())
        .collect()
}

/// Check that a Lagrange sequence is non-empty, finite, positive and
/// non-increasing.
pub fn validate_lagrange_sequence(seq: &[f64]) -> Result<(), PathError> {
    if seq.is_empty() {
        return Err(PathError::InvalidLagrangeSequence("sequence is empty".to_string()));
    }
    if let Some(bad) = seq.iter().find(|l| !l.is_finite() || **l <= 0.0) {
        return Err(PathError::InvalidLagrangeSequence(format!(
            "values must be finite and positive, got {}",
            bad
        )));
    }
    if let Some(w) = seq.windows(2).find(|w| w[1] > w[0]) {
        return Err(PathError::InvalidLagrangeSequence(format!(
            "values must be non-increasing, got {} followed by {}",
            w[0], w[1]
        )));
    }
    Ok(())
}

impl<L: SaturatedLoss, D: Design> SparseGroupPath<L, D> {
    /// Compute solutions along `lagrange_seq`, or along the default
    /// sequence from `lagrange_max` when `None`.
    ///
    /// Each value is screened with the strong rule, solved on the
    /// candidate set, and certified with the KKT checks. Groups failing
    /// the checks are added to the candidate set and the value is
    /// re-solved.
    pub fn fit(&mut self, lagrange_seq: Option<&[f64]>) -> Result<PathResult, PathError> {
        let lagrange_max = self.lagrange_max();
        let seq = match lagrange_seq {
            Some(seq) => seq.to_vec(),
            None => {
                if !(lagrange_max.is_finite() && lagrange_max > 0.0) {
                    return Err(PathError::InvalidLagrangeSequence(format!(
                        "cannot build a default sequence from lagrange_max = {}",
                        lagrange_max
                    )));
                }
                default_lagrange_sequence(
                    lagrange_max,
                    self.options().lagrange_proportion,
                    self.options().n_lagrange,
                )
            }
        };
        validate_lagrange_sequence(&seq)?;

        log::info!(
            "fitting sparse-group path: {} groups, {} Lagrange values from {:.4e} (lagrange_max {:.4e})",
            self.shape().rows,
            seq.len(),
            seq[0],
            lagrange_max
        );

        let mut lagrange_cur = lagrange_max;
        let mut steps = Vec::with_capacity(seq.len());
        for &lagrange_new in &seq {
            let step = self.fit_lagrange(lagrange_cur, lagrange_new)?;
            if step.status == StepStatus::Converged {
                lagrange_cur = lagrange_new;
            }
            steps.push(step);
        }

        let result = PathResult {
            lagrange_max,
            steps,
            diagnostics: self.diagnostics().entries().to_vec(),
        };
        log::info!(
            "path finished: {} steps, {} skipped, {} active groups at the end",
            result.len(),
            result.n_skipped(),
            result.last().map_or(0, |s| s.n_active())
        );
        Ok(result)
    }

    /// One Lagrange value, applying the non-convergence policy.
    fn fit_lagrange(&mut self, lagrange_cur: f64, lagrange_new: f64) -> Result<PathStep, PathError> {
        let mut solve_options = self.options().solve_options();
        let mut relaxations = 0;
        loop {
            let err = match self.screen_and_verify(lagrange_cur, lagrange_new, solve_options) {
                Ok(step) => return Ok(step),
                Err(e) if e.is_convergence_failure() => e,
                Err(e) => return Err(e),
            };

            match self.options().non_convergence {
                NonConvergencePolicy::Abort => return Err(err),
                NonConvergencePolicy::RelaxTolerance => {
                    if relaxations >= self.options().max_relaxations {
                        return Err(err);
                    }
                    relaxations += 1;
                    solve_options.tolerance *= 10.0;
                    solve_options.max_iterations = solve_options.max_iterations.saturating_mul(2);
                    self.diagnostics.push(
                        DiagnosticKind::ToleranceRelaxed,
                        Some(lagrange_new),
                        format!(
                            "solver did not converge at lagrange {:.4e}; retrying with tolerance {:e} and {} iterations",
                            lagrange_new, solve_options.tolerance, solve_options.max_iterations
                        ),
                    );
                }
                NonConvergencePolicy::SkipLagrange => {
                    self.diagnostics.push(
                        DiagnosticKind::LagrangeSkipped,
                        Some(lagrange_new),
                        format!(
                            "solver did not converge at lagrange {:.4e}; keeping previous solution",
                            lagrange_new
                        ),
                    );
                    return Ok(PathStep {
                        lagrange: lagrange_new,
                        solution: self.solution.clone(),
                        active_groups: active_groups(&self.solution),
                        candidate_size: 0,
                        kkt_rounds: 0,
                        final_step: self.final_step,
                        status: StepStatus::Skipped,
                    });
                }
            }
        }
    }

    fn screen_and_verify(
        &mut self,
        lagrange_cur: f64,
        lagrange_new: f64,
        solve_options: SolveOptions,
    ) -> Result<PathStep, PathError> {
        let alpha = self.options().alpha;
        let max_retries = self.options().max_kkt_retries;

        let strong = self.strong_set(alpha * lagrange_cur, alpha * lagrange_new, &self.grad_solution);
        let mut candidates = self.updated_ever_active(&strong.indices);
        candidates.extend(self.unpenalized().0);
        candidates.sort_unstable();
        candidates.dedup();
        log::debug!(
            "lagrange {:.4e}: strong set {} groups, {} candidates",
            lagrange_new,
            strong.len(),
            candidates.len()
        );

        let mut options = solve_options;
        let mut rounds = 0;
        loop {
            rounds += 1;
            let sub = self.solve_subproblem(&candidates, lagrange_new, &options)?;

            let shape = self.shape();
            let mut trial = Mat::zeros(shape.rows, shape.cols);
            scatter_rows(&mut trial, &candidates, &sub.solution);
            let grad = add(
                &self.full_gradient(&sub.linear_predictor),
                &self.enet_grad(&trial, lagrange_new),
            );

            let failing = self.check_kkt(&grad, &trial, alpha * lagrange_new, None);
            let violators = mask_to_indices(&failing);
            if violators.is_empty() {
                log::debug!(
                    "lagrange {:.4e}: KKT satisfied after {} round(s)",
                    lagrange_new,
                    rounds
                );
                let step = PathStep {
                    lagrange: lagrange_new,
                    active_groups: active_groups(&trial),
                    solution: trial.clone(),
                    candidate_size: candidates.len(),
                    kkt_rounds: rounds,
                    final_step: sub.final_step,
                    status: StepStatus::Converged,
                };
                self.solution = trial;
                self.grad_solution = grad;
                self.linear_predictor = sub.linear_predictor;
                self.final_step = sub.final_step;
                return Ok(step);
            }

            if rounds > max_retries {
                return Err(PathError::KktRetriesExceeded {
                    lagrange: lagrange_new,
                    retries: max_retries,
                });
            }

            let new_groups: Vec<usize> = violators
                .iter()
                .copied()
                .filter(|&g| !sub.candidate_mask[g])
                .collect();
            if new_groups.is_empty() {
                options.tolerance = (options.tolerance * 0.1).max(MIN_TOLERANCE);
                self.diagnostics.push(
                    DiagnosticKind::ToleranceTightened,
                    Some(lagrange_new),
                    format!(
                        "{} candidate group(s) fail KKT at lagrange {:.4e}; tolerance tightened to {:e}",
                        violators.len(),
                        lagrange_new,
                        options.tolerance
                    ),
                );
            } else {
                self.updated_ever_active(&new_groups);
                self.diagnostics.push(
                    DiagnosticKind::KktExpansion,
                    Some(lagrange_new),
                    format!(
                        "KKT added {} group(s) at lagrange {:.4e}",
                        new_groups.len(),
                        lagrange_new
                    ),
                );
                candidates.extend(new_groups);
                candidates.sort_unstable();
            }
        }
    }
}

fn active_groups(solution: &Mat<f64>) -> Vec<usize> {
    row_norms(solution)
        .iter()
        .enumerate()
        .filter(|(_, &n)| n > 0.0)
        .map(|(g, _)| g)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_sequence() {
        let seq = default_lagrange_sequence(2.0, 0.1, 5);
        assert_eq!(seq.len(), 5);
        assert_relative_eq!(seq[0], 2.0, epsilon = 1e-12);
        assert_relative_eq!(seq[4], 0.2, epsilon = 1e-12);
        assert_relative_eq!(seq[2], 2.0 * 0.1f64.sqrt(), epsilon = 1e-12);
        assert!(seq.windows(2).all(|w| w[1] < w[0]));
        assert_eq!(default_lagrange_sequence(3.0, 0.5, 1), vec![3.0]);
    }

    #[test]
    fn test_sequence_validation() {
        assert!(validate_lagrange_sequence(&[2.0, 1.0, 1.0, 0.5]).is_ok());
        for bad in [&[][..], &[1.0, 2.0][..], &[1.0, 0.0][..], &[f64::NAN][..]] {
            assert!(matches!(
                validate_lagrange_sequence(bad),
                Err(PathError::InvalidLagrangeSequence(_))
            ));
        }
    }

    #[test]
    fn test_active_groups() {
        let m = Mat::from_fn(3, 2, |i, j| if i == 1 && j == 0 { 0.5 } else { 0.0 });
        assert_eq!(active_groups(&m), vec![1]);
    }
}
