//! Linear maps from coefficients to linear predictors.
//!
//! A design maps `(groups, q)` coefficients to the `(n, q)` linear
//! predictor. Path variants differ only in how they do this and in how
//! they restrict themselves to a subset of groups, which is why column
//! subsampling is part of the trait:
//!
//! - [`DenseDesign`]: one `X` shared by every response (multinomial,
//!   multi-response Gaussian).
//! - [`BlockDesign`]: a separate `X_k` per response over a common set of
//!   columns (stacked regressions).

mod block;
mod dense;

pub use block::BlockDesign;
pub use dense::DenseDesign;

use crate::core::Shape;
use faer::Mat;

/// A linear map from coefficients to linear predictors.
pub trait Design: Clone {
    /// Shape `(n_groups, n_responses)` of the coefficients.
    fn input_shape(&self) -> Shape;

    /// Shape `(n_cases, n_responses)` of the linear predictor.
    fn output_shape(&self) -> Shape;

    /// Linear predictor for `coef`.
    fn dot(&self, coef: &Mat<f64>) -> Mat<f64>;

    /// Adjoint map from linear-predictor space back to coefficient space.
    fn adjoint_dot(&self, output: &Mat<f64>) -> Mat<f64>;

    /// Design restricted to the listed groups (columns), in the given order.
    fn subsample_columns(&self, columns: &[usize]) -> Self;
}
