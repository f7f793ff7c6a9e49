//! Path result structures.

use crate::diagnostics::Diagnostic;
use faer::Mat;

/// Outcome of a single Lagrange value along the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// The restricted solution passed the KKT checks.
    Converged,
    /// The inner solver failed and the value was skipped; the solution is
    /// carried over from the previous step.
    Skipped,
}

/// Solution at one Lagrange value.
#[derive(Debug, Clone)]
pub struct PathStep {
    /// Lagrange value of this step.
    pub lagrange: f64,
    /// Full `(groups, responses)` solution.
    pub solution: Mat<f64>,
    /// Groups with a nonzero solution row.
    pub active_groups: Vec<usize>,
    /// Size of the final candidate set.
    pub candidate_size: usize,
    /// Number of restricted solves needed (1 when screening was right).
    pub kkt_rounds: usize,
    /// Last step size used by the inner solver.
    pub final_step: f64,
    pub status: StepStatus,
}

impl PathStep {
    /// Number of groups with a nonzero solution row.
    pub fn n_active(&self) -> usize {
        self.active_groups.len()
    }

    /// Whether the step needed more than one KKT round.
    pub fn was_expanded(&self) -> bool {
        self.kkt_rounds > 1
    }
}

/// Complete result from running a path.
#[derive(Debug, Clone)]
pub struct PathResult {
    /// Smallest Lagrange value at which every penalized group is zero.
    pub lagrange_max: f64,
    /// One entry per Lagrange value, in path order.
    pub steps: Vec<PathStep>,
    /// Warnings and events collected while running.
    pub diagnostics: Vec<Diagnostic>,
}

impl PathResult {
    /// Lagrange values of the steps in path order.
    pub fn lagrange(&self) -> Vec<f64> {
        self.steps.iter().map(|s| s.lagrange).collect()
    }

    /// Solutions of the steps in path order.
    pub fn coefficients(&self) -> Vec<&Mat<f64>> {
        self.steps.iter().map(|s| &s.solution).collect()
    }

    /// Last step of the path, if any.
    pub fn last(&self) -> Option<&PathStep> {
        self.steps.last()
    }

    /// Number of steps recorded as skipped.
    pub fn n_skipped(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.status == StepStatus::Skipped)
            .count()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(lagrange: f64, status: StepStatus, rounds: usize) -> PathStep {
        PathStep {
            lagrange,
            solution: Mat::zeros(2, 1),
            active_groups: vec![0],
            candidate_size: 1,
            kkt_rounds: rounds,
            final_step: 1.0,
            status,
        }
    }

    #[test]
    fn test_result_accessors() {
        let result = PathResult {
            lagrange_max: 2.0,
            steps: vec![
                step(2.0, StepStatus::Converged, 1),
                step(1.0, StepStatus::Skipped, 1),
                step(0.5, StepStatus::Converged, 3),
            ],
            diagnostics: Vec::new(),
        };

        assert_eq!(result.len(), 3);
        assert_eq!(result.lagrange(), vec![2.0, 1.0, 0.5]);
        assert_eq!(result.n_skipped(), 1);
        assert!(result.last().unwrap().was_expanded());
        assert_eq!(result.steps[0].n_active(), 1);
    }
}
