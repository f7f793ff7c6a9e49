//! Problems restricted to a candidate subset of groups.

use crate::core::Shape;
use crate::design::Design;
use crate::loss::{AffineSmooth, DiagonalQuadratic, SaturatedLoss, SmoothLoss};
use crate::penalty::SparseGroupBlock;
use crate::solvers::PathError;
use crate::utils::{add_scaled, select_rows};
use faer::Mat;

/// Smooth part of a restricted problem: the loss composed with the
/// restricted design, plus an optional ridge term.
#[derive(Debug, Clone)]
pub struct RestrictedLoss<'a, L, D> {
    affine: AffineSmooth<'a, L, D>,
    ridge: Option<DiagonalQuadratic>,
}

impl<'a, L: SaturatedLoss, D: Design> RestrictedLoss<'a, L, D> {
    pub fn new(affine: AffineSmooth<'a, L, D>) -> Self {
        Self {
            affine,
            ridge: None,
        }
    }

    /// Add a ridge term of the same shape.
    pub fn with_ridge(mut self, ridge: DiagonalQuadratic) -> Result<Self, PathError> {
        self.affine
            .shape()
            .expect(ridge.shape(), "elastic-net term vs restricted loss")?;
        self.ridge = Some(ridge);
        Ok(self)
    }

    pub fn affine(&self) -> &AffineSmooth<'a, L, D> {
        &self.affine
    }

    pub fn ridge(&self) -> Option<&DiagonalQuadratic> {
        self.ridge.as_ref()
    }
}

impl<L: SaturatedLoss, D: Design> SmoothLoss for RestrictedLoss<'_, L, D> {
    fn shape(&self) -> Shape {
        self.affine.shape()
    }

    fn value(&self, coef: &Mat<f64>) -> f64 {
        let ridge = self.ridge.as_ref().map_or(0.0, |r| r.value(coef));
        self.affine.value(coef) + ridge
    }

    fn gradient(&self, coef: &Mat<f64>) -> Mat<f64> {
        let grad = self.affine.gradient(coef);
        match &self.ridge {
            Some(r) => add_scaled(&grad, 1.0, &r.gradient(coef)),
            None => grad,
        }
    }
}

/// A problem over the candidate groups only.
#[derive(Debug, Clone)]
pub struct RestrictedProblem<'a, L, D> {
    pub loss: RestrictedLoss<'a, L, D>,
    pub penalty: SparseGroupBlock,
    /// Membership of the candidates over all groups.
    pub candidate_mask: Vec<bool>,
}

impl<'a, L: SaturatedLoss, D: Design> RestrictedProblem<'a, L, D> {
    /// Design restricted to the candidate columns.
    pub fn design(&self) -> &D {
        self.loss.affine().design()
    }

    /// Shape `(|candidates|, q)` of the restricted coefficients.
    pub fn shape(&self) -> Shape {
        self.loss.shape()
    }
}

/// Validate a candidate list against `n_groups` and return its mask.
///
/// Out-of-range and repeated indices are rejected.
pub fn candidate_mask(candidates: &[usize], n_groups: usize) -> Result<Vec<bool>, PathError> {
    let mut mask = vec![false; n_groups];
    for &g in candidates {
        if g >= n_groups || mask[g] {
            return Err(PathError::InvalidCandidate { index: g, n_groups });
        }
        mask[g] = true;
    }
    Ok(mask)
}

/// Build the problem over `candidates`.
///
/// `lagrange` is the penalty level of the restricted problem; along a path
/// this is `alpha·λ`.
pub fn restricted_problem<'a, L: SaturatedLoss, D: Design>(
    design: &D,
    loss: &'a L,
    lagrange: f64,
    l1_weight: &[f64],
    l2_weight: &[f64],
    candidates: &[usize],
) -> Result<RestrictedProblem<'a, L, D>, PathError> {
    let n_groups = design.input_shape().rows;
    let mask = candidate_mask(candidates, n_groups)?;

    let penalty = SparseGroupBlock::new(
        design.input_shape(),
        l1_weight.to_vec(),
        l2_weight.to_vec(),
        lagrange,
    )?
    .restrict(candidates)?;
    let affine = AffineSmooth::new(loss, design.subsample_columns(candidates))?;

    Ok(RestrictedProblem {
        loss: RestrictedLoss::new(affine),
        penalty,
        candidate_mask: mask,
    })
}

/// Elastic-net ridge coefficients over all groups:
/// `enet · (1 − alpha)`, scaled by `λ` on penalized rows.
pub fn elastic_net_diag(
    elastic_net_param: &Mat<f64>,
    penalized: &[bool],
    lagrange: f64,
    alpha: f64,
) -> Mat<f64> {
    Mat::from_fn(elastic_net_param.nrows(), elastic_net_param.ncols(), |g, j| {
        let scale = if penalized[g] { lagrange } else { 1.0 };
        elastic_net_param[(g, j)] * (1.0 - alpha) * scale
    })
}

/// Ridge term of the restricted problem, or `None` for a pure
/// sparse-group penalty (`alpha = 1`).
pub fn restricted_elastic_net(
    elastic_net_param: &Mat<f64>,
    penalized: &[bool],
    lagrange: f64,
    alpha: f64,
    candidates: &[usize],
) -> Option<DiagonalQuadratic> {
    if alpha >= 1.0 {
        return None;
    }
    let diag = elastic_net_diag(elastic_net_param, penalized, lagrange, alpha);
    Some(DiagonalQuadratic::new(select_rows(&diag, candidates)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::DenseDesign;
    use crate::loss::GaussianLoss;

    fn setup() -> (DenseDesign, GaussianLoss) {
        let x = Mat::from_fn(6, 4, |i, j| ((i + 1) * (j + 2) % 5) as f64);
        let y = Mat::from_fn(6, 2, |i, k| (i + k) as f64);
        (DenseDesign::new(x, 2), GaussianLoss::new(y))
    }

    #[test]
    fn test_restricted_shapes() {
        let (design, loss) = setup();
        let l1 = [1.0, 2.0, 3.0, 4.0];
        let l2 = [0.5; 4];
        let problem = restricted_problem(&design, &loss, 0.7, &l1, &l2, &[3, 1]).unwrap();
        assert_eq!(problem.shape(), Shape::new(2, 2));
        assert_eq!(problem.design().input_shape(), Shape::new(2, 2));
        assert_eq!(problem.penalty.l1_weight(), &[4.0, 2.0]);
        assert_eq!(problem.penalty.lagrange(), 0.7);
        assert_eq!(problem.candidate_mask, vec![false, true, false, true]);
    }

    #[test]
    fn test_invalid_candidates() {
        let (design, loss) = setup();
        let w = [1.0; 4];
        assert!(matches!(
            restricted_problem(&design, &loss, 1.0, &w, &w, &[4]),
            Err(PathError::InvalidCandidate { index: 4, n_groups: 4 })
        ));
        assert!(matches!(
            restricted_problem(&design, &loss, 1.0, &w, &w, &[1, 1]),
            Err(PathError::InvalidCandidate { index: 1, .. })
        ));
    }

    #[test]
    fn test_empty_candidates() {
        let (design, loss) = setup();
        let w = [1.0; 4];
        let problem = restricted_problem(&design, &loss, 1.0, &w, &w, &[]).unwrap();
        assert_eq!(problem.shape(), Shape::new(0, 2));
        assert!(problem.candidate_mask.iter().all(|m| !m));
    }

    #[test]
    fn test_elastic_net_term() {
        let enet = Mat::from_fn(3, 1, |_, _| 2.0);
        let penalized = [false, true, true];
        assert!(restricted_elastic_net(&enet, &penalized, 0.5, 1.0, &[0, 1]).is_none());

        let ridge = restricted_elastic_net(&enet, &penalized, 0.5, 0.75, &[0, 2]).unwrap();
        // unpenalized row: 2 · 0.25; penalized row: 2 · 0.25 · 0.5
        assert!((ridge.diag()[(0, 0)] - 0.5).abs() < 1e-12);
        assert!((ridge.diag()[(1, 0)] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_ridge_adds_to_gradient() {
        let (design, loss) = setup();
        let w = [1.0; 4];
        let problem = restricted_problem(&design, &loss, 1.0, &w, &w, &[0, 2]).unwrap();
        let coef = Mat::from_fn(2, 2, |_, _| 1.0);
        let base = problem.loss.gradient(&coef);
        let with_ridge = problem
            .loss
            .clone()
            .with_ridge(DiagonalQuadratic::new(Mat::from_fn(2, 2, |_, _| 3.0)))
            .unwrap();
        let g = with_ridge.gradient(&coef);
        assert!((g[(1, 1)] - base[(1, 1)] - 3.0).abs() < 1e-12);
        assert!((with_ridge.value(&coef) - problem.loss.value(&coef) - 6.0).abs() < 1e-10);
    }
}
