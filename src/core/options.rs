//! Path options and configuration.

use thiserror::Error;

/// What the driver does when the inner solver fails to converge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NonConvergencePolicy {
    /// Return the error and stop the path.
    Abort,
    /// Retry with a looser tolerance and a larger iteration budget
    /// (up to `max_relaxations` times), then abort.
    #[default]
    RelaxTolerance,
    /// Record the Lagrange value as skipped, keep the previous solution,
    /// and continue with the next value.
    SkipLagrange,
}

/// Options passed through to the inner convex solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveOptions {
    /// Convergence tolerance on the proximal-gradient mapping.
    pub tolerance: f64,
    /// Maximum number of accelerated proximal-gradient iterations.
    pub max_iterations: usize,
    /// Initial step size. `None` starts from the last step the solver used.
    pub initial_step: Option<f64>,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-7,
            max_iterations: 2000,
            initial_step: None,
        }
    }
}

impl SolveOptions {
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// Configuration options for a sparse-group path.
#[derive(Debug, Clone)]
pub struct PathOptions {
    /// Elastic-net mixing: 1 is pure sparse-group lasso (default: 1.0).
    pub alpha: f64,
    /// Convex combination of the l1 and l2 weights (`l1 *= a`, `l2 *= 1 - a`).
    pub l1_alpha: Option<f64>,
    /// Number of values in the default Lagrange sequence (default: 100).
    pub n_lagrange: usize,
    /// Smallest Lagrange value as a fraction of `lagrange_max` (default: 0.05).
    pub lagrange_proportion: f64,
    /// Slope used by the strong rule (default: 1.0).
    pub slope_estimate: f64,
    /// Relative tolerance of the KKT checks (default: 1e-2).
    pub kkt_tolerance: f64,
    /// Maximum number of re-solves per Lagrange value (default: 50).
    pub max_kkt_retries: usize,
    /// Inner solver tolerance along the path (default: 1e-7).
    pub inner_tolerance: f64,
    /// Inner solver iteration budget (default: 2000).
    pub max_iterations: usize,
    /// Inner solver tolerance for the null model (default: 1e-8).
    pub null_tolerance: f64,
    /// Initial step size for the inner solver.
    pub initial_step: Option<f64>,
    /// Policy on inner solver non-convergence.
    pub non_convergence: NonConvergencePolicy,
    /// Number of tolerance relaxations under `RelaxTolerance` (default: 2).
    pub max_relaxations: usize,
}

impl Default for PathOptions {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            l1_alpha: None,
            n_lagrange: 100,
            lagrange_proportion: 0.05,
            slope_estimate: 1.0,
            kkt_tolerance: 1e-2,
            max_kkt_retries: 50,
            inner_tolerance: 1e-7,
            max_iterations: 2000,
            null_tolerance: 1e-8,
            initial_step: None,
            non_convergence: NonConvergencePolicy::RelaxTolerance,
            max_relaxations: 2,
        }
    }
}

/// Errors that can occur when validating path options.
#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("alpha must be in (0, 1], got {0}")]
    InvalidAlpha(f64),
    #[error("l1_alpha must be in [0, 1], got {0}")]
    InvalidL1Alpha(f64),
    #[error("lagrange_proportion must be in (0, 1), got {0}")]
    InvalidLagrangeProportion(f64),
    #[error("n_lagrange must be at least 1, got {0}")]
    InvalidNLagrange(usize),
    #[error("slope_estimate must be finite and at least -1, got {0}")]
    InvalidSlopeEstimate(f64),
    #[error("kkt_tolerance must be in (0, 1), got {0}")]
    InvalidKktTolerance(f64),
    #[error("tolerance must be positive, got {0}")]
    InvalidTolerance(f64),
    #[error("max_iterations must be at least 1, got {0}")]
    InvalidMaxIterations(usize),
    #[error("initial_step must be positive, got {0}")]
    InvalidInitialStep(f64),
}

impl PathOptions {
    /// Create a new builder for path options.
    pub fn builder() -> PathOptionsBuilder {
        PathOptionsBuilder::default()
    }

    /// Pure sparse-group lasso.
    pub fn lasso() -> Self {
        Self::default()
    }

    /// Sparse-group lasso mixed with a ridge term.
    pub fn elastic_net(alpha: f64) -> Self {
        Self {
            alpha,
            ..Default::default()
        }
    }

    /// Inner solver options along the path.
    pub fn solve_options(&self) -> SolveOptions {
        SolveOptions {
            tolerance: self.inner_tolerance,
            max_iterations: self.max_iterations,
            initial_step: self.initial_step,
        }
    }

    /// Inner solver options for the null model.
    pub fn null_solve_options(&self) -> SolveOptions {
        self.solve_options().with_tolerance(self.null_tolerance)
    }

    /// Validate the options and return an error if invalid.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(OptionsError::InvalidAlpha(self.alpha));
        }
        if let Some(a) = self.l1_alpha {
            if !(0.0..=1.0).contains(&a) {
                return Err(OptionsError::InvalidL1Alpha(a));
            }
        }
        if !(self.lagrange_proportion > 0.0 && self.lagrange_proportion < 1.0) {
            return Err(OptionsError::InvalidLagrangeProportion(
                self.lagrange_proportion,
            ));
        }
        if self.n_lagrange < 1 {
            return Err(OptionsError::InvalidNLagrange(self.n_lagrange));
        }
        if !self.slope_estimate.is_finite() || self.slope_estimate < -1.0 {
            return Err(OptionsError::InvalidSlopeEstimate(self.slope_estimate));
        }
        if !(self.kkt_tolerance > 0.0 && self.kkt_tolerance < 1.0) {
            return Err(OptionsError::InvalidKktTolerance(self.kkt_tolerance));
        }
        for tol in [self.inner_tolerance, self.null_tolerance] {
            if tol.is_nan() || tol <= 0.0 {
                return Err(OptionsError::InvalidTolerance(tol));
            }
        }
        if self.max_iterations < 1 {
            return Err(OptionsError::InvalidMaxIterations(self.max_iterations));
        }
        if let Some(step) = self.initial_step {
            if step.is_nan() || step <= 0.0 {
                return Err(OptionsError::InvalidInitialStep(step));
            }
        }
        Ok(())
    }
}

/// Builder for `PathOptions`.
#[derive(Debug, Clone, Default)]
pub struct PathOptionsBuilder {
    options: PathOptions,
}

impl PathOptionsBuilder {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the elastic-net mixing parameter (1 is pure sparse-group lasso).
    pub fn alpha(mut self, alpha: f64) -> Self {
        self.options.alpha = alpha;
        self
    }

    /// Set the l1/l2 weight combination.
    pub fn l1_alpha(mut self, l1_alpha: f64) -> Self {
        self.options.l1_alpha = Some(l1_alpha);
        self
    }

    pub fn n_lagrange(mut self, n: usize) -> Self {
        self.options.n_lagrange = n;
        self
    }

    pub fn lagrange_proportion(mut self, proportion: f64) -> Self {
        self.options.lagrange_proportion = proportion;
        self
    }

    /// Set the strong-rule slope. Larger values screen more conservatively.
    pub fn slope_estimate(mut self, slope: f64) -> Self {
        self.options.slope_estimate = slope;
        self
    }

    pub fn kkt_tolerance(mut self, tol: f64) -> Self {
        self.options.kkt_tolerance = tol;
        self
    }

    pub fn max_kkt_retries(mut self, retries: usize) -> Self {
        self.options.max_kkt_retries = retries;
        self
    }

    /// Set the inner solver tolerance.
    pub fn tolerance(mut self, tol: f64) -> Self {
        self.options.inner_tolerance = tol;
        self
    }

    /// Set the inner solver iteration budget.
    pub fn max_iterations(mut self, max_iter: usize) -> Self {
        self.options.max_iterations = max_iter;
        self
    }

    pub fn null_tolerance(mut self, tol: f64) -> Self {
        self.options.null_tolerance = tol;
        self
    }

    pub fn initial_step(mut self, step: f64) -> Self {
        self.options.initial_step = Some(step);
        self
    }

    pub fn non_convergence(mut self, policy: NonConvergencePolicy) -> Self {
        self.options.non_convergence = policy;
        self
    }

    pub fn max_relaxations(mut self, n: usize) -> Self {
        self.options.max_relaxations = n;
        self
    }

    /// Build and validate the options.
    pub fn build(self) -> Result<PathOptions, OptionsError> {
        self.options.validate()?;
        Ok(self.options)
    }

    /// Build the options without validation.
    pub fn build_unchecked(self) -> PathOptions {
        self.options
    }
}
