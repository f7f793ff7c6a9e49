//! A saturated loss composed with a design.

use super::{Mode, Objective, SaturatedLoss, SmoothLoss};
use crate::core::Shape;
use crate::design::Design;
use crate::solvers::PathError;
use faer::Mat;

/// `β ↦ ℓ(Xβ)`, with gradient `Xᵀ ∇ℓ(Xβ)`.
#[derive(Debug, Clone)]
pub struct AffineSmooth<'a, L, D> {
    loss: &'a L,
    design: D,
}

impl<'a, L: SaturatedLoss, D: Design> AffineSmooth<'a, L, D> {
    /// Compose `loss` with `design`; the design output must match the loss.
    pub fn new(loss: &'a L, design: D) -> Result<Self, PathError> {
        loss.shape()
            .expect(design.output_shape(), "design output vs saturated loss")?;
        Ok(Self { loss, design })
    }

    pub fn design(&self) -> &D {
        &self.design
    }

    pub fn saturated_loss(&self) -> &L {
        self.loss
    }

    /// Linear predictor `Xβ`.
    pub fn linear_predictor(&self, coef: &Mat<f64>) -> Mat<f64> {
        self.design.dot(coef)
    }
}

impl<L: SaturatedLoss, D: Design> SmoothLoss for AffineSmooth<'_, L, D> {
    fn shape(&self) -> Shape {
        self.design.input_shape()
    }

    fn value(&self, coef: &Mat<f64>) -> f64 {
        self.loss.value(&self.design.dot(coef))
    }

    fn gradient(&self, coef: &Mat<f64>) -> Mat<f64> {
        let eta = self.design.dot(coef);
        self.design.adjoint_dot(&self.loss.gradient(&eta))
    }

    fn smooth_objective(&self, coef: &Mat<f64>, mode: Mode) -> Objective {
        let eta = self.design.dot(coef);
        match self.loss.smooth_objective(&eta, mode) {
            Objective::Func(v) => Objective::Func(v),
            Objective::Grad(g) => Objective::Grad(self.design.adjoint_dot(&g)),
            Objective::Both(v, g) => Objective::Both(v, self.design.adjoint_dot(&g)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::DenseDesign;
    use crate::loss::GaussianLoss;
    use faer::Col;

    #[test]
    fn test_gradient_is_adjoint_of_saturated_gradient() {
        let x = Mat::from_fn(4, 2, |i, j| (i + 2 * j) as f64);
        let y = Col::from_fn(4, |i| i as f64);
        let loss = GaussianLoss::from_column(&y);
        let smooth = AffineSmooth::new(&loss, DenseDesign::new(x.clone(), 1)).unwrap();

        let coef = Mat::from_fn(2, 1, |j, _| 0.5 - j as f64);
        let g = smooth.gradient(&coef);
        // Xᵀ(Xβ - y)
        for j in 0..2 {
            let mut expected = 0.0;
            for i in 0..4 {
                let pred = x[(i, 0)] * coef[(0, 0)] + x[(i, 1)] * coef[(1, 0)];
                expected += x[(i, j)] * (pred - y[i]);
            }
            assert!((g[(j, 0)] - expected).abs() < 1e-10);
        }

        match smooth.smooth_objective(&coef, Mode::Both) {
            Objective::Both(v, grad) => {
                assert!((v - smooth.value(&coef)).abs() < 1e-12);
                assert!((grad[(1, 0)] - g[(1, 0)]).abs() < 1e-12);
            }
            other => panic!("unexpected objective {:?}", other),
        }
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let loss = GaussianLoss::from_column(&Col::zeros(3));
        let design = DenseDesign::new(Mat::zeros(4, 2), 1);
        assert!(matches!(
            AffineSmooth::new(&loss, design),
            Err(PathError::ShapeMismatch { .. })
        ));
    }
}
