//! Design with one feature matrix shared by all responses.

use super::Design;
use crate::core::Shape;
use crate::utils::select_columns;
use faer::Mat;

/// `η = Xβ` with `X` of shape `(n, p)` and `β` of shape `(p, q)`.
#[derive(Debug, Clone)]
pub struct DenseDesign {
    x: Mat<f64>,
    n_responses: usize,
}

impl DenseDesign {
    pub fn new(x: Mat<f64>, n_responses: usize) -> Self {
        Self { x, n_responses }
    }

    /// Prepend a column of ones (intercept) to `x`.
    pub fn with_intercept(x: &Mat<f64>, n_responses: usize) -> Self {
        let x_aug = Mat::from_fn(x.nrows(), x.ncols() + 1, |i, j| {
            if j == 0 {
                1.0
            } else {
                x[(i, j - 1)]
            }
        });
        Self::new(x_aug, n_responses)
    }

    pub fn x(&self) -> &Mat<f64> {
        &self.x
    }
}

impl Design for DenseDesign {
    fn input_shape(&self) -> Shape {
        Shape::new(self.x.ncols(), self.n_responses)
    }

    fn output_shape(&self) -> Shape {
        Shape::new(self.x.nrows(), self.n_responses)
    }

    fn dot(&self, coef: &Mat<f64>) -> Mat<f64> {
        &self.x * coef
    }

    fn adjoint_dot(&self, output: &Mat<f64>) -> Mat<f64> {
        self.x.transpose() * output
    }

    fn subsample_columns(&self, columns: &[usize]) -> Self {
        Self {
            x: select_columns(&self.x, columns),
            n_responses: self.n_responses,
        }
    }
}
