//! Diagonal quadratic (ridge) term.

use super::SmoothLoss;
use crate::core::Shape;
use crate::utils::inner;
use faer::Mat;

/// `½ Σ dᵢⱼ βᵢⱼ²` with a non-negative diagonal `d` of the coefficient shape.
#[derive(Debug, Clone)]
pub struct DiagonalQuadratic {
    diag: Mat<f64>,
}

impl DiagonalQuadratic {
    pub fn new(diag: Mat<f64>) -> Self {
        Self { diag }
    }

    pub fn diag(&self) -> &Mat<f64> {
        &self.diag
    }

    /// Whether every coefficient of the diagonal is zero.
    pub fn is_zero(&self) -> bool {
        (0..self.diag.ncols()).all(|j| (0..self.diag.nrows()).all(|i| self.diag[(i, j)] == 0.0))
    }
}

impl SmoothLoss for DiagonalQuadratic {
    fn shape(&self) -> Shape {
        Shape::of(&self.diag)
    }

    fn value(&self, coef: &Mat<f64>) -> f64 {
        0.5 * inner(&self.gradient(coef), coef)
    }

    fn gradient(&self, coef: &Mat<f64>) -> Mat<f64> {
        Mat::from_fn(self.diag.nrows(), self.diag.ncols(), |i, j| {
            self.diag[(i, j)] * coef[(i, j)]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_and_gradient() {
        let q = DiagonalQuadratic::new(Mat::from_fn(2, 1, |i, _| (i + 1) as f64));
        let coef = Mat::from_fn(2, 1, |_, _| 2.0);
        // ½ (1·4 + 2·4) = 6
        assert!((q.value(&coef) - 6.0).abs() < 1e-12);
        assert_eq!(q.gradient(&coef)[(1, 0)], 4.0);
        assert!(!q.is_zero());
        assert!(DiagonalQuadratic::new(Mat::zeros(2, 2)).is_zero());
    }
}
