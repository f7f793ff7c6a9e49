//! Strong-rule screening.

use super::gate::inside_strong_set;
use crate::utils::{mask_to_indices, row};
use faer::Mat;

/// Default slope of the strong rule.
pub const DEFAULT_SLOPE: f64 = 1.0;

/// Groups predicted to be active at the next Lagrange value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrongSet {
    /// Selected groups in ascending order.
    pub indices: Vec<usize>,
    /// Membership over all groups.
    pub mask: Vec<bool>,
}

impl StrongSet {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn contains(&self, group: usize) -> bool {
        self.mask.get(group).copied().unwrap_or(false)
    }
}

/// Strong-rule threshold `(slope + 1)·λ_new − slope·λ_cur`.
pub fn strong_threshold(lagrange_cur: f64, lagrange_new: f64, slope: f64) -> f64 {
    (slope + 1.0) * lagrange_new - slope * lagrange_cur
}

/// Select the groups whose gradient row is outside the dual ball at the
/// strong-rule threshold.
///
/// The rule is a heuristic: it can miss groups, which the KKT checks
/// catch afterwards.
pub fn strong_set(
    l1_weight: &[f64],
    l2_weight: &[f64],
    lagrange_cur: f64,
    lagrange_new: f64,
    grad: &Mat<f64>,
    slope: f64,
) -> StrongSet {
    let threshold = strong_threshold(lagrange_cur, lagrange_new, slope);
    let mask: Vec<bool> = (0..grad.nrows())
        .map(|g| !inside_strong_set(&row(grad, g), threshold, l1_weight[g], l2_weight[g]))
        .collect();
    StrongSet {
        indices: mask_to_indices(&mask),
        mask,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold() {
        assert!((strong_threshold(2.0, 1.5, 1.0) - 1.0).abs() < 1e-12);
        // slope -1 ignores the new value entirely
        assert!((strong_threshold(2.0, 1.5, -1.0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_selects_large_gradients() {
        let grad = Mat::from_fn(3, 1, |i, _| [3.0, 0.5, -1.5][i]);
        let set = strong_set(&[1.0; 3], &[0.0; 3], 2.0, 1.5, &grad, 1.0);
        // threshold 1.0
        assert_eq!(set.indices, vec![0, 2]);
        assert_eq!(set.mask, vec![true, false, true]);
        assert!(set.contains(2));
        assert!(!set.contains(5));
    }

    #[test]
    fn test_unpenalized_with_nonzero_gradient_is_selected() {
        let grad = Mat::from_fn(2, 1, |i, _| if i == 0 { 1e-6 } else { 0.0 });
        let set = strong_set(&[0.0, 1.0], &[0.0, 1.0], 1.0, 0.5, &grad, 1.0);
        assert_eq!(set.indices, vec![0]);
    }

    #[test]
    fn test_mask_and_indices_agree() {
        let grad = Mat::from_fn(5, 2, |i, j| (i as f64 - 2.0) * (j as f64 + 1.0));
        let set = strong_set(&[0.5; 5], &[0.5; 5], 3.0, 2.5, &grad, 1.0);
        assert_eq!(mask_to_indices(&set.mask), set.indices);
    }
}
