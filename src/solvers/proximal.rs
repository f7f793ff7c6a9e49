//! Accelerated proximal-gradient solver for `smooth + sparse-group penalty`.

use crate::core::SolveOptions;
use crate::loss::SmoothLoss;
use crate::penalty::SparseGroupBlock;
use crate::solvers::traits::PathError;
use crate::utils::{add_scaled, all_finite, frobenius_norm, inner};
use faer::Mat;

const MIN_STEP: f64 = 1e-20;
const DEFAULT_STEP: f64 = 1.0;

/// Composite problem `min_β f(β) + P(β)` with `f` smooth and `P` a
/// sparse-group block penalty.
///
/// Solved with monotone FISTA and backtracking on the step size. The
/// coefficients are updated in place, so a problem can be warm-started
/// and re-solved with tighter options.
///
/// # Example
///
/// ```rust,ignore
/// use sgl_path::solvers::SimpleProblem;
///
/// let mut problem = SimpleProblem::new(loss, penalty)?;
/// let coef = problem.solve(&SolveOptions::default())?;
/// println!("objective: {}", problem.objective(&coef));
/// ```
#[derive(Debug, Clone)]
pub struct SimpleProblem<S> {
    loss: S,
    penalty: SparseGroupBlock,
    coefs: Mat<f64>,
    final_step: f64,
}

impl<S: SmoothLoss> SimpleProblem<S> {
    /// Problem starting from zero coefficients.
    pub fn new(loss: S, penalty: SparseGroupBlock) -> Result<Self, PathError> {
        let shape = loss.shape();
        shape.expect(penalty.shape(), "penalty vs smooth loss")?;
        Ok(Self {
            loss,
            penalty,
            coefs: Mat::zeros(shape.rows, shape.cols),
            final_step: DEFAULT_STEP,
        })
    }

    /// Replace the starting coefficients.
    pub fn warm_start(mut self, coefs: Mat<f64>) -> Result<Self, PathError> {
        self.loss.shape().check(&coefs, "warm start coefficients")?;
        self.coefs = coefs;
        Ok(self)
    }

    pub fn coefs(&self) -> &Mat<f64> {
        &self.coefs
    }

    pub fn loss(&self) -> &S {
        &self.loss
    }

    pub fn penalty(&self) -> &SparseGroupBlock {
        &self.penalty
    }

    /// Step size accepted by the last backtracking search.
    pub fn final_step(&self) -> f64 {
        self.final_step
    }

    /// Composite objective `f(β) + P(β)`.
    pub fn objective(&self, coef: &Mat<f64>) -> f64 {
        self.loss.value(coef) + self.penalty.value(coef)
    }

    /// Run the solver from the current coefficients.
    ///
    /// Stops when the proximal-gradient move satisfies
    /// `‖z - y‖_F ≤ tol · max(1, ‖z‖_F)`.
    pub fn solve(&mut self, options: &SolveOptions) -> Result<Mat<f64>, PathError> {
        let mut step = options.initial_step.unwrap_or(self.final_step);
        if !(step.is_finite() && step > 0.0) {
            step = DEFAULT_STEP;
        }

        let mut x = self.coefs.clone();
        let mut x_obj = self.objective(&x);
        let mut y = x.clone();
        let mut t = 1.0_f64;

        for iter in 0..options.max_iterations {
            let f_y = self.loss.value(&y);
            let grad_y = self.loss.gradient(&y);
            if !f_y.is_finite() || !all_finite(&grad_y) {
                return Err(PathError::NumericalError(
                    "non-finite smooth objective at extrapolated point".to_string(),
                ));
            }

            // backtracking on the quadratic upper bound
            let z = loop {
                let candidate = self.penalty.proximal(&add_scaled(&y, -step, &grad_y), step);
                let diff = add_scaled(&candidate, -1.0, &y);
                let bound = f_y + inner(&grad_y, &diff) + inner(&diff, &diff) / (2.0 * step);
                if self.loss.value(&candidate) <= bound + 1e-12 * bound.abs() {
                    break candidate;
                }
                step *= 0.5;
                if step < MIN_STEP {
                    return Err(PathError::NumericalError(format!(
                        "step size collapsed below {:e} at iteration {}",
                        MIN_STEP, iter
                    )));
                }
            };
            self.final_step = step;

            let move_norm = frobenius_norm(&add_scaled(&z, -1.0, &y));
            if move_norm <= options.tolerance * frobenius_norm(&z).max(1.0) {
                log::debug!("proximal gradient converged in {} iterations", iter + 1);
                self.coefs = z.clone();
                return Ok(z);
            }

            let z_obj = self.objective(&z);
            let x_prev = x;
            if z_obj <= x_obj {
                x = z.clone();
                x_obj = z_obj;
            } else {
                x = x_prev.clone();
            }

            let t_next = 0.5 * (1.0 + (1.0 + 4.0 * t * t).sqrt());
            let a = t / t_next;
            let b = (t - 1.0) / t_next;
            y = Mat::from_fn(x.nrows(), x.ncols(), |i, j| {
                x[(i, j)] + a * (z[(i, j)] - x[(i, j)]) + b * (x[(i, j)] - x_prev[(i, j)])
            });
            t = t_next;
        }

        self.coefs = x;
        Err(PathError::ConvergenceFailed {
            iterations: options.max_iterations,
        })
    }
}
