//! KKT verification of a candidate solution.
//!
//! A solution `β` with smooth gradient `∇f(β)` is optimal for
//! `f + λ Σ_g (l1_g‖β_g‖₁ + l2_g‖β_g‖₂)` when for every group
//!
//! - inactive (`β_g = 0`): the gate value of `−∇f_g` is at most `λ`;
//! - active: `−∇f_g = λ·l1_g·sign(β_g) + λ·l2_g·β_g/‖β_g‖₂` on the
//!   nonzero coordinates, so the gate value equals `λ`, the l1 part matches
//!   the signs and the l2 part is aligned with `β_g`;
//! - unpenalized: `∇f_g = 0`.

use super::gate::dual_gauge;
use crate::utils::{l2_norm, row, row_norms, sign};
use faer::Mat;

/// Default relative tolerance of the checks.
pub const DEFAULT_KKT_TOLERANCE: f64 = 1e-2;

/// Outcome of the KKT checks for one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KktStatus {
    Satisfied,
    /// Zero group whose gradient is outside the dual ball.
    Inactive,
    /// Active group whose l1 part disagrees with the signs of `β_g`.
    ActiveL1,
    /// Active group whose gate value is below `λ`.
    ActiveNorm,
    /// Active group whose l2 part is not aligned with `β_g`.
    ActiveL2,
}

impl KktStatus {
    /// Numeric code of the status.
    pub fn code(&self) -> u8 {
        match self {
            KktStatus::Satisfied => 0,
            KktStatus::Inactive => 2,
            KktStatus::ActiveL1 => 10,
            KktStatus::ActiveNorm => 11,
            KktStatus::ActiveL2 => 12,
        }
    }

    pub fn is_violation(&self) -> bool {
        *self != KktStatus::Satisfied
    }
}

/// Per-group KKT status of `solution` given the smooth gradient `grad`.
///
/// A group counts as active when `‖β_g‖ > tol · max(Σ_h ‖β_h‖, 1)`.
pub fn check_kkt(
    grad: &Mat<f64>,
    solution: &Mat<f64>,
    l1_weight: &[f64],
    l2_weight: &[f64],
    lagrange: f64,
    tol: f64,
) -> Vec<KktStatus> {
    let norms = row_norms(solution);
    let total: f64 = norms.iter().sum();
    let active_cutoff = tol * total.max(1.0);

    (0..solution.nrows())
        .map(|g| {
            let active = norms[g] > active_cutoff;
            let (l1, l2) = (l1_weight[g], l2_weight[g]);

            if l1 == 0.0 && l2 == 0.0 {
                let stationary = l2_norm(&row(grad, g)) <= tol * norms[g].max(1.0);
                return match (stationary, active) {
                    (true, _) => KktStatus::Satisfied,
                    (false, true) => KktStatus::ActiveNorm,
                    (false, false) => KktStatus::Inactive,
                };
            }

            let neg_grad: Vec<f64> = row(grad, g).iter().map(|x| -x).collect();
            let gauge = dual_gauge(&neg_grad, l1, l2);

            if !active {
                return if gauge.value >= lagrange * (1.0 + tol) {
                    KktStatus::Inactive
                } else {
                    KktStatus::Satisfied
                };
            }

            let beta = row(solution, g);
            if l2 > 0.0 && !l2_aligned(&gauge.l2_part, &beta, norms[g], tol) {
                return KktStatus::ActiveL2;
            }

            let l1_err: f64 = beta
                .iter()
                .zip(&gauge.l1_part)
                .filter(|(b, _)| **b != 0.0)
                .map(|(b, p)| (p - l1 * sign(*b) * lagrange).powi(2))
                .sum::<f64>()
                .sqrt();
            if l1_err > tol * norms[g].max(1.0) {
                return KktStatus::ActiveL1;
            }

            if gauge.value < lagrange * (1.0 - tol) {
                return KktStatus::ActiveNorm;
            }
            KktStatus::Satisfied
        })
        .collect()
}

fn l2_aligned(l2_part: &[f64], beta: &[f64], beta_norm: f64, tol: f64) -> bool {
    let part_norm = l2_norm(l2_part);
    if part_norm == 0.0 && beta_norm == 0.0 {
        return true;
    }
    let unit = |v: &[f64], n: f64| -> Vec<f64> {
        if n == 0.0 {
            vec![0.0; v.len()]
        } else {
            v.iter().map(|x| x / n).collect()
        }
    };
    let a = unit(l2_part, part_norm);
    let b = unit(beta, beta_norm);
    let diff: f64 = a
        .iter()
        .zip(&b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt();
    diff <= tol
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(values: &[f64]) -> Mat<f64> {
        Mat::from_fn(1, values.len(), |_, j| values[j])
    }

    #[test]
    fn test_codes() {
        assert_eq!(KktStatus::Satisfied.code(), 0);
        assert_eq!(KktStatus::Inactive.code(), 2);
        assert_eq!(KktStatus::ActiveL1.code(), 10);
        assert_eq!(KktStatus::ActiveNorm.code(), 11);
        assert_eq!(KktStatus::ActiveL2.code(), 12);
        assert!(!KktStatus::Satisfied.is_violation());
    }

    #[test]
    fn test_inactive_group() {
        let beta = single(&[0.0, 0.0]);
        let ok = check_kkt(&single(&[0.5, -0.5]), &beta, &[1.0], &[0.0], 1.0, 1e-2);
        assert_eq!(ok, vec![KktStatus::Satisfied]);
        let bad = check_kkt(&single(&[1.5, 0.0]), &beta, &[1.0], &[0.0], 1.0, 1e-2);
        assert_eq!(bad, vec![KktStatus::Inactive]);
    }

    #[test]
    fn test_active_group_at_optimum() {
        // β = (2, 0), λ = 1, l1 = l2 = 1: −∇f = (1 + 1, s) with |s| ≤ 1
        let beta = single(&[2.0, 0.0]);
        let grad = single(&[-2.0, 0.3]);
        let status = check_kkt(&grad, &beta, &[1.0], &[1.0], 1.0, 1e-2);
        assert_eq!(status, vec![KktStatus::Satisfied]);
    }

    #[test]
    fn test_active_norm_too_small() {
        let beta = single(&[1.0]);
        let status = check_kkt(&single(&[-0.5]), &beta, &[1.0], &[0.0], 1.0, 1e-2);
        assert_eq!(status, vec![KktStatus::ActiveL1]);
        // pure group penalty: l1 part vanishes, gate value too small
        let status = check_kkt(&single(&[-0.5]), &beta, &[0.0], &[1.0], 1.0, 1e-2);
        assert_eq!(status, vec![KktStatus::ActiveNorm]);
    }

    #[test]
    fn test_active_l2_misaligned() {
        let beta = single(&[1.0, 1.0]);
        let grad = single(&[-1.0, 0.0]);
        let status = check_kkt(&grad, &beta, &[0.0], &[1.0], 1.0, 1e-2);
        assert_eq!(status, vec![KktStatus::ActiveL2]);
    }

    #[test]
    fn test_unpenalized_stationarity() {
        let beta = Mat::from_fn(2, 1, |i, _| if i == 0 { 3.0 } else { 0.0 });
        let grad = Mat::from_fn(2, 1, |i, _| if i == 0 { 1e-4 } else { 0.5 });
        let status = check_kkt(&grad, &beta, &[0.0, 0.0], &[0.0, 0.0], 1.0, 1e-2);
        assert_eq!(status, vec![KktStatus::Satisfied, KktStatus::Inactive]);
    }

    #[test]
    fn test_alignment_of_zero_vectors() {
        assert!(l2_aligned(&[0.0, 0.0], &[0.0, 0.0], 0.0, 1e-2));
        assert!(!l2_aligned(&[0.0, 0.0], &[1.0, 0.0], 1.0, 1e-2));
    }
}
