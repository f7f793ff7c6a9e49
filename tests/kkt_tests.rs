//! Property-based tests for screening, KKT verification and restriction.
//!
//! With an identity design and Gaussian loss, the solution at `λ` is the
//! proximal map of the response, so screening and the KKT checks can be
//! compared against a closed form.

use proptest::collection::vec as prop_vec;
use proptest::prelude::*;

use faer::Mat;
use sgl_path::core::Shape;
use sgl_path::design::{DenseDesign, Design};
use sgl_path::loss::GaussianLoss;
use sgl_path::path::{check_kkt, gauge_value, restricted_problem, strong_set, KktStatus};
use sgl_path::penalty::SparseGroupBlock;
use sgl_path::utils::{l2_norm, mask_to_indices, row_norm, soft_threshold};

// =============================================================================
// Strategies
// =============================================================================

/// A `(groups, responses)` problem: response rows and per-group weights.
fn arb_problem() -> impl Strategy<Value = (usize, usize, Vec<f64>, Vec<f64>, Vec<f64>)> {
    (2usize..7, 1usize..4).prop_flat_map(|(g, q)| {
        (
            Just(g),
            Just(q),
            prop_vec(-4.0f64..4.0, g * q),
            prop_vec(0.1f64..2.0, g),
            prop_vec(0.1f64..2.0, g),
        )
    })
}

fn to_mat(g: usize, q: usize, values: &[f64]) -> Mat<f64> {
    Mat::from_fn(g, q, |i, j| values[i * q + j])
}

/// Closed-form solution and smooth gradient for `½‖β − y‖² + P(β)`.
fn closed_form(penalty: &SparseGroupBlock, y: &Mat<f64>) -> (Mat<f64>, Mat<f64>) {
    let beta = penalty.proximal(y, 1.0);
    let grad = Mat::from_fn(y.nrows(), y.ncols(), |i, j| beta[(i, j)] - y[(i, j)]);
    (beta, grad)
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn strong_set_contains_true_active_set(
        (g, q, y, l1, l2) in arb_problem(),
        lagrange_cur in 0.2f64..3.0,
        ratio in 0.5f64..0.95,
    ) {
        let y = to_mat(g, q, &y);
        let lagrange_new = ratio * lagrange_cur;
        let shape = Shape::new(g, q);

        let at_cur = SparseGroupBlock::new(shape, l1.clone(), l2.clone(), lagrange_cur).unwrap();
        let (_, grad_cur) = closed_form(&at_cur, &y);
        let at_new = at_cur.with_lagrange(lagrange_new);
        let (beta_new, _) = closed_form(&at_new, &y);

        let strong = strong_set(&l1, &l2, lagrange_cur, lagrange_new, &grad_cur, 1.0);
        for group in 0..g {
            if row_norm(&beta_new, group) > 0.0 {
                prop_assert!(strong.mask[group], "active group {} not screened", group);
            }
        }
        prop_assert_eq!(mask_to_indices(&strong.mask), strong.indices);
    }

    #[test]
    fn kkt_satisfied_at_closed_form_optimum(
        (g, q, y, l1, l2) in arb_problem(),
        lagrange in 0.1f64..3.0,
    ) {
        let y = to_mat(g, q, &y);
        let penalty = SparseGroupBlock::new(Shape::new(g, q), l1.clone(), l2.clone(), lagrange).unwrap();
        let (beta, grad) = closed_form(&penalty, &y);

        let status = check_kkt(&grad, &beta, &l1, &l2, lagrange, 1e-2);
        for (group, s) in status.iter().enumerate() {
            prop_assert_eq!(*s, KktStatus::Satisfied, "group {}", group);
        }
    }

    #[test]
    fn restricted_problem_has_candidate_shape(
        (g, q, _y, l1, l2) in arb_problem(),
        picks in prop_vec(any::<bool>(), 6),
    ) {
        let candidates: Vec<usize> = (0..g).filter(|&i| picks[i]).collect();
        let design = DenseDesign::new(Mat::from_fn(5, g, |i, j| (i + j) as f64), q);
        let loss = GaussianLoss::new(Mat::zeros(5, q));

        let problem = restricted_problem(&design, &loss, 1.0, &l1, &l2, &candidates).unwrap();
        prop_assert_eq!(problem.shape(), Shape::new(candidates.len(), q));
        prop_assert_eq!(problem.design().input_shape(), Shape::new(candidates.len(), q));
        prop_assert_eq!(
            problem.candidate_mask.iter().filter(|m| **m).count(),
            candidates.len()
        );
    }

    #[test]
    fn gauge_is_root_of_defining_equation(
        v in prop_vec(-5.0f64..5.0, 1..6),
        l1 in 0.1f64..2.0,
        l2 in 0.1f64..2.0,
    ) {
        prop_assume!(l2_norm(&v) > 1e-6);
        let t = gauge_value(&v, l1, l2);
        let soft_norm = v
            .iter()
            .map(|&x| soft_threshold(x, t * l1).powi(2))
            .sum::<f64>()
            .sqrt();
        prop_assert!((soft_norm - t * l2).abs() <= 1e-8 * (1.0 + t));
    }
}
