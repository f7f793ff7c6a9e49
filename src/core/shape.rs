//! Two-dimensional shapes for coefficients, predictors, and responses.

use crate::solvers::PathError;
use faer::Mat;
use std::fmt;

/// Shape `(rows, cols)` of a coefficient or linear-predictor matrix.
///
/// Coefficients are `(groups, responses)`; linear predictors are
/// `(cases, responses)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    pub rows: usize,
    pub cols: usize,
}

impl Shape {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Shape of an existing matrix.
    pub fn of(m: &Mat<f64>) -> Self {
        Self {
            rows: m.nrows(),
            cols: m.ncols(),
        }
    }

    /// Fail with a `ShapeMismatch` naming `context` unless `m` has this shape.
    pub fn check(&self, m: &Mat<f64>, context: &'static str) -> Result<(), PathError> {
        self.expect(Self::of(m), context)
    }

    /// Fail with a `ShapeMismatch` naming `context` unless `found == self`.
    pub fn expect(&self, found: Shape, context: &'static str) -> Result<(), PathError> {
        if *self == found {
            Ok(())
        } else {
            Err(PathError::ShapeMismatch {
                context,
                expected: *self,
                found,
            })
        }
    }

    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.rows, self.cols)
    }
}
