//! Design with a separate feature matrix per response.

use super::Design;
use crate::core::Shape;
use crate::solvers::PathError;
use crate::utils::select_columns;
use faer::{Col, Mat};

/// `η[:, k] = X_k β[:, k]`.
///
/// All blocks share a shape `(n, p)`, so row `j` of `β` collects the
/// coefficients of column `j` across responses and forms one group.
#[derive(Debug, Clone)]
pub struct BlockDesign {
    blocks: Vec<Mat<f64>>,
}

impl BlockDesign {
    pub fn new(blocks: Vec<Mat<f64>>) -> Result<Self, PathError> {
        let first = match blocks.first() {
            Some(b) => Shape::of(b),
            None => {
                return Err(PathError::LengthMismatch {
                    context: "block design needs at least one block",
                    expected: 1,
                    found: 0,
                })
            }
        };
        for b in &blocks[1..] {
            first.check(b, "block design blocks")?;
        }
        Ok(Self { blocks })
    }

    pub fn blocks(&self) -> &[Mat<f64>] {
        &self.blocks
    }

    fn n_cases(&self) -> usize {
        self.blocks[0].nrows()
    }

    fn n_columns(&self) -> usize {
        self.blocks[0].ncols()
    }
}

impl Design for BlockDesign {
    fn input_shape(&self) -> Shape {
        Shape::new(self.n_columns(), self.blocks.len())
    }

    fn output_shape(&self) -> Shape {
        Shape::new(self.n_cases(), self.blocks.len())
    }

    fn dot(&self, coef: &Mat<f64>) -> Mat<f64> {
        let columns: Vec<Col<f64>> = self
            .blocks
            .iter()
            .enumerate()
            .map(|(k, x)| x * coef.col(k))
            .collect();
        Mat::from_fn(self.n_cases(), columns.len(), |i, k| columns[k][i])
    }

    fn adjoint_dot(&self, output: &Mat<f64>) -> Mat<f64> {
        let columns: Vec<Col<f64>> = self
            .blocks
            .iter()
            .enumerate()
            .map(|(k, x)| x.transpose() * output.col(k))
            .collect();
        Mat::from_fn(self.n_columns(), columns.len(), |j, k| columns[k][j])
    }

    fn subsample_columns(&self, columns: &[usize]) -> Self {
        Self {
            blocks: self
                .blocks
                .iter()
                .map(|x| select_columns(x, columns))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::inner;

    #[test]
    fn test_each_response_uses_its_block() {
        let x0 = Mat::from_fn(3, 2, |i, j| if j == 0 { 1.0 } else { i as f64 });
        let x1 = Mat::from_fn(3, 2, |i, j| if j == 0 { i as f64 } else { 2.0 });
        let d = BlockDesign::new(vec![x0, x1]).unwrap();
        let coef = Mat::from_fn(2, 2, |_, _| 1.0);
        let eta = d.dot(&coef);
        // response 0: 1 + i; response 1: i + 2
        assert_eq!(eta[(2, 0)], 3.0);
        assert_eq!(eta[(2, 1)], 4.0);
    }

    #[test]
    fn test_adjoint_identity() {
        let blocks = (0..3)
            .map(|k| Mat::from_fn(5, 4, |i, j| ((i + 1) * (j + k)) as f64 * 0.1))
            .collect();
        let d = BlockDesign::new(blocks).unwrap();
        let coef = Mat::from_fn(4, 3, |j, k| j as f64 - k as f64);
        let r = Mat::from_fn(5, 3, |i, k| (i + k) as f64);
        let lhs = inner(&d.dot(&coef), &r);
        let rhs = inner(&coef, &d.adjoint_dot(&r));
        assert!((lhs - rhs).abs() < 1e-9);
    }

    #[test]
    fn test_mismatched_blocks_rejected() {
        let result = BlockDesign::new(vec![Mat::zeros(3, 2), Mat::zeros(3, 3)]);
        assert!(matches!(result, Err(PathError::ShapeMismatch { .. })));
        assert!(BlockDesign::new(Vec::new()).is_err());
    }

    #[test]
    fn test_subsample_columns() {
        let d = BlockDesign::new(vec![Mat::zeros(3, 4), Mat::zeros(3, 4)]).unwrap();
        assert_eq!(d.subsample_columns(&[1, 3]).input_shape(), Shape::new(2, 2));
    }
}
