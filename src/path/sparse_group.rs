//! Sparse-group block path object.

use super::kkt::{check_kkt, KktStatus};
use super::restricted::{elastic_net_diag, restricted_elastic_net, restricted_problem};
use super::strong::{strong_set, StrongSet};
use crate::core::{PathOptions, Shape, SolveOptions};
use crate::design::{BlockDesign, Design, DenseDesign};
use crate::diagnostics::{DiagnosticKind, DiagnosticLog};
use crate::loss::{GaussianLoss, MultinomialLoss, SaturatedLoss, SmoothLoss};
use crate::penalty::SparseGroupBlock;
use crate::solvers::{PathError, SimpleProblem};
use crate::utils::{indices_to_mask, mask_to_indices, scatter_rows, select_rows};
use faer::Mat;

/// Lagrange value used to solve the null model over unpenalized groups.
pub const BIG: f64 = 1e12;

/// Output of a restricted solve.
#[derive(Debug, Clone)]
pub struct SubproblemSolution {
    /// Step size accepted by the solver's last backtracking search.
    pub final_step: f64,
    /// Gradient of the smooth part (loss and ridge) at `solution`.
    pub gradient: Mat<f64>,
    /// Solution over the candidate groups, shape `(|candidates|, q)`.
    pub solution: Mat<f64>,
    pub linear_predictor: Mat<f64>,
    pub candidate_mask: Vec<bool>,
}

/// Path over a design whose rows of coefficients form the groups.
///
/// Owns the current solution, its gradient and linear predictor. The
/// solution changes only when the path driver commits a step (see
/// [`SparseGroupPath::fit`]) and once during construction, when the null
/// model over the unpenalized groups is solved.
#[derive(Debug, Clone)]
pub struct SparseGroupPath<L, D> {
    loss: L,
    design: D,
    penalty: SparseGroupBlock,
    elastic_net_param: Mat<f64>,
    options: PathOptions,
    pub(crate) solution: Mat<f64>,
    pub(crate) grad_solution: Mat<f64>,
    pub(crate) linear_predictor: Mat<f64>,
    pub(crate) final_step: f64,
    ever_active: Option<Vec<bool>>,
    pub(crate) diagnostics: DiagnosticLog,
}

/// Path with one design matrix shared by all responses.
pub type CommonPath<L> = SparseGroupPath<L, DenseDesign>;

/// Path with one design matrix per response.
pub type BlockPath<L> = SparseGroupPath<L, BlockDesign>;

impl<L: SaturatedLoss, D: Design> SparseGroupPath<L, D> {
    /// Build a path and solve its null model.
    ///
    /// `elastic_net_param` defaults to ones on penalized groups and zeros
    /// on unpenalized ones. `options.l1_alpha`, when set, mixes the weights
    /// as `l1 *= a` and `l2 *= 1 − a`.
    pub fn new(
        loss: L,
        design: D,
        l1_penalty: Vec<f64>,
        l2_penalty: Vec<f64>,
        elastic_net_param: Option<Mat<f64>>,
        options: PathOptions,
    ) -> Result<Self, PathError> {
        options.validate()?;
        loss.shape()
            .expect(design.output_shape(), "design output vs saturated loss")?;
        let shape = design.input_shape();

        let (l1, l2) = match options.l1_alpha {
            Some(a) => (
                l1_penalty.iter().map(|w| w * a).collect(),
                l2_penalty.iter().map(|w| w * (1.0 - a)).collect(),
            ),
            None => (l1_penalty, l2_penalty),
        };
        let penalty = SparseGroupBlock::new(shape, l1, l2, 1.0)?;

        let elastic_net_param = match elastic_net_param {
            Some(e) => {
                shape.check(&e, "elastic_net_param vs coefficients")?;
                let valid = (0..e.ncols())
                    .all(|j| (0..e.nrows()).all(|i| e[(i, j)].is_finite() && e[(i, j)] >= 0.0));
                if !valid {
                    return Err(PathError::InvalidWeights(
                        "elastic_net_param must be finite and non-negative".to_string(),
                    ));
                }
                e
            }
            None => Mat::from_fn(shape.rows, shape.cols, |g, _| {
                if penalty.is_unpenalized(g) {
                    0.0
                } else {
                    1.0
                }
            }),
        };

        let initial_step = options.initial_step.unwrap_or(1.0);
        let mut path = Self {
            solution: Mat::zeros(shape.rows, shape.cols),
            grad_solution: Mat::zeros(shape.rows, shape.cols),
            linear_predictor: Mat::zeros(design.output_shape().rows, design.output_shape().cols),
            final_step: initial_step,
            loss,
            design,
            penalty,
            elastic_net_param,
            options,
            ever_active: None,
            diagnostics: DiagnosticLog::new(),
        };

        let (unpenalized_groups, unpenalized_mask) = path.unpenalized();
        if !unpenalized_groups.is_empty() {
            let null = path.solve_subproblem(
                &unpenalized_groups,
                BIG,
                &path.options.null_solve_options(),
            )?;
            scatter_rows(&mut path.solution, &unpenalized_groups, &null.solution);
            path.linear_predictor = null.linear_predictor;
            path.final_step = null.final_step;
            log::debug!(
                "null model solved over {} unpenalized groups",
                unpenalized_groups.len()
            );
        }

        let enet = &path.elastic_net_param;
        let unpenalized_ridge = unpenalized_mask
            .iter()
            .enumerate()
            .any(|(g, &u)| u && (0..enet.ncols()).any(|j| enet[(g, j)] != 0.0));
        if unpenalized_ridge {
            path.diagnostics.push(
                DiagnosticKind::UnpenalizedElasticNet,
                None,
                "unpenalized groups have a nonzero elastic-net parameter; their ridge \
                 term is not scaled by the Lagrange value",
            );
        }

        let full = path.full_gradient(&path.linear_predictor);
        path.grad_solution = add(&full, &path.enet_grad(&path.solution, 1.0));
        Ok(path)
    }

    /// Independent path over a subset of cases.
    ///
    /// Uses the same design, weights, elastic-net parameter and options.
    /// Weights are taken after `l1_alpha` mixing, so mixing is not
    /// applied twice.
    pub fn subsample(&self, case_idx: &[usize]) -> Result<Self, PathError> {
        let options = PathOptions {
            l1_alpha: None,
            ..self.options.clone()
        };
        Self::new(
            self.loss.subsample(case_idx)?,
            self.design.clone(),
            self.penalty.l1_weight().to_vec(),
            self.penalty.l2_weight().to_vec(),
            Some(self.elastic_net_param.clone()),
            options,
        )
    }

    /// Strong-rule candidates moving from `lagrange_cur` to `lagrange_new`.
    pub fn strong_set(&self, lagrange_cur: f64, lagrange_new: f64, grad: &Mat<f64>) -> StrongSet {
        strong_set(
            self.penalty.l1_weight(),
            self.penalty.l2_weight(),
            lagrange_cur,
            lagrange_new,
            grad,
            self.options.slope_estimate,
        )
    }

    /// Solve the problem restricted to `candidates` at `lagrange_new`.
    ///
    /// Warm-starts from the current solution. An empty candidate set
    /// returns a zero linear predictor without calling the solver.
    pub fn solve_subproblem(
        &self,
        candidates: &[usize],
        lagrange_new: f64,
        options: &SolveOptions,
    ) -> Result<SubproblemSolution, PathError> {
        let alpha = self.options.alpha;
        let problem = restricted_problem(
            &self.design,
            &self.loss,
            alpha * lagrange_new,
            self.penalty.l1_weight(),
            self.penalty.l2_weight(),
            candidates,
        )?;
        let shape = problem.shape();

        if candidates.is_empty() {
            let out = self.loss.shape();
            return Ok(SubproblemSolution {
                final_step: self.final_step,
                gradient: Mat::zeros(0, shape.cols),
                solution: Mat::zeros(0, shape.cols),
                linear_predictor: Mat::zeros(out.rows, out.cols),
                candidate_mask: problem.candidate_mask,
            });
        }

        let mut loss = problem.loss;
        if let Some(ridge) = restricted_elastic_net(
            &self.elastic_net_param,
            &self.penalized_mask(),
            lagrange_new,
            alpha,
            candidates,
        ) {
            loss = loss.with_ridge(ridge)?;
        }

        let mut solve_options = *options;
        if solve_options.initial_step.is_none() {
            solve_options.initial_step = Some(self.final_step);
        }

        let mut solver = SimpleProblem::new(loss, problem.penalty)?
            .warm_start(select_rows(&self.solution, candidates))?;
        let solution = solver.solve(&solve_options)?;
        let gradient = solver.loss().gradient(&solution);
        let linear_predictor = solver.loss().affine().linear_predictor(&solution);

        Ok(SubproblemSolution {
            final_step: solver.final_step(),
            gradient,
            solution,
            linear_predictor,
            candidate_mask: problem.candidate_mask,
        })
    }

    /// Groups failing the KKT checks at `lagrange`.
    ///
    /// Uses the weights of `penalty` when given, otherwise the path's own.
    pub fn check_kkt(
        &self,
        grad: &Mat<f64>,
        solution: &Mat<f64>,
        lagrange: f64,
        penalty: Option<&SparseGroupBlock>,
    ) -> Vec<bool> {
        self.kkt_status(grad, solution, lagrange, penalty)
            .iter()
            .map(KktStatus::is_violation)
            .collect()
    }

    /// Per-group KKT status at `lagrange`.
    pub fn kkt_status(
        &self,
        grad: &Mat<f64>,
        solution: &Mat<f64>,
        lagrange: f64,
        penalty: Option<&SparseGroupBlock>,
    ) -> Vec<KktStatus> {
        let penalty = penalty.unwrap_or(&self.penalty);
        check_kkt(
            grad,
            solution,
            penalty.l1_weight(),
            penalty.l2_weight(),
            lagrange,
            self.options.kkt_tolerance,
        )
    }

    /// Add `groups` to the ever-active set and return every ever-active
    /// group in ascending order.
    pub fn updated_ever_active(&mut self, groups: &[usize]) -> Vec<usize> {
        let n_groups = self.penalty.n_groups();
        let ever_active = self
            .ever_active
            .get_or_insert_with(|| vec![false; n_groups]);
        for &g in groups {
            if let Some(flag) = ever_active.get_mut(g) {
                *flag = true;
            }
        }
        mask_to_indices(ever_active)
    }

    /// Ever-active set, `None` until the path first screens.
    pub fn ever_active(&self) -> Option<&[bool]> {
        self.ever_active.as_deref()
    }

    /// Unpenalized groups and their mask.
    pub fn unpenalized(&self) -> (Vec<usize>, Vec<bool>) {
        let groups = self.penalty.unpenalized_groups();
        let mask = indices_to_mask(&groups, self.penalty.n_groups());
        (groups, mask)
    }

    fn penalized_mask(&self) -> Vec<bool> {
        (0..self.penalty.n_groups())
            .map(|g| !self.penalty.is_unpenalized(g))
            .collect()
    }

    /// Penalty with unit Lagrange value over `subset`.
    pub fn restricted_penalty(&self, subset: &[usize]) -> Result<SparseGroupBlock, PathError> {
        self.penalty.with_lagrange(1.0).restrict(subset)
    }

    /// Loss gradient `Xᵀ ∇ℓ(η)` over all groups.
    pub fn full_gradient(&self, linear_predictor: &Mat<f64>) -> Mat<f64> {
        self.design
            .adjoint_dot(&self.loss.gradient(linear_predictor))
    }

    /// Gradient of the elastic-net ridge term at `solution`.
    ///
    /// Zero when `alpha = 1`.
    pub fn enet_grad(&self, solution: &Mat<f64>, lagrange: f64) -> Mat<f64> {
        if self.options.alpha >= 1.0 {
            return Mat::zeros(solution.nrows(), solution.ncols());
        }
        let diag = elastic_net_diag(
            &self.elastic_net_param,
            &self.penalized_mask(),
            lagrange,
            self.options.alpha,
        );
        Mat::from_fn(solution.nrows(), solution.ncols(), |i, j| {
            diag[(i, j)] * solution[(i, j)]
        })
    }

    /// Smallest Lagrange value at which every penalized group is zero.
    pub fn lagrange_max(&self) -> f64 {
        self.penalty.dual_norm(&self.grad_solution) / self.options.alpha
    }

    pub fn shape(&self) -> Shape {
        self.penalty.shape()
    }

    pub fn loss(&self) -> &L {
        &self.loss
    }

    pub fn design(&self) -> &D {
        &self.design
    }

    /// Penalty weights, with unit Lagrange value.
    pub fn penalty(&self) -> &SparseGroupBlock {
        &self.penalty
    }

    pub fn elastic_net_param(&self) -> &Mat<f64> {
        &self.elastic_net_param
    }

    pub fn options(&self) -> &PathOptions {
        &self.options
    }

    pub fn solution(&self) -> &Mat<f64> {
        &self.solution
    }

    pub fn grad_solution(&self) -> &Mat<f64> {
        &self.grad_solution
    }

    pub fn linear_predictor(&self) -> &Mat<f64> {
        &self.linear_predictor
    }

    pub fn final_step(&self) -> f64 {
        self.final_step
    }

    pub fn diagnostics(&self) -> &DiagnosticLog {
        &self.diagnostics
    }
}

pub(crate) fn add(a: &Mat<f64>, b: &Mat<f64>) -> Mat<f64> {
    a + b
}

/// Multinomial path; `counts` is `(n, classes)`.
pub fn multinomial(
    x: Mat<f64>,
    counts: Mat<f64>,
    l1_penalty: Vec<f64>,
    l2_penalty: Vec<f64>,
    elastic_net_param: Option<Mat<f64>>,
    options: PathOptions,
) -> Result<CommonPath<MultinomialLoss>, PathError> {
    let q = counts.ncols();
    let loss = MultinomialLoss::new(counts)?;
    SparseGroupPath::new(
        loss,
        DenseDesign::new(x, q),
        l1_penalty,
        l2_penalty,
        elastic_net_param,
        options,
    )
}

/// Gaussian path with responses `y` of shape `(n, q)` sharing `x`.
pub fn multiresponse_gaussian(
    x: Mat<f64>,
    y: Mat<f64>,
    l1_penalty: Vec<f64>,
    l2_penalty: Vec<f64>,
    elastic_net_param: Option<Mat<f64>>,
    options: PathOptions,
) -> Result<CommonPath<GaussianLoss>, PathError> {
    let q = y.ncols();
    SparseGroupPath::new(
        GaussianLoss::new(y),
        DenseDesign::new(x, q),
        l1_penalty,
        l2_penalty,
        elastic_net_param,
        options,
    )
}

/// Gaussian path where response `k` has its own design `xs[k]`.
pub fn stacked_gaussian(
    xs: Vec<Mat<f64>>,
    y: Mat<f64>,
    l1_penalty: Vec<f64>,
    l2_penalty: Vec<f64>,
    elastic_net_param: Option<Mat<f64>>,
    options: PathOptions,
) -> Result<BlockPath<GaussianLoss>, PathError> {
    if xs.len() != y.ncols() {
        return Err(PathError::LengthMismatch {
            context: "number of design blocks vs responses",
            expected: y.ncols(),
            found: xs.len(),
        });
    }
    SparseGroupPath::new(
        GaussianLoss::new(y),
        BlockDesign::new(xs)?,
        l1_penalty,
        l2_penalty,
        elastic_net_param,
        options,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::row_norm;
    use approx::assert_relative_eq;

    fn design_with_intercept() -> (Mat<f64>, Mat<f64>) {
        let x = Mat::from_fn(6, 3, |i, j| match j {
            0 => 1.0,
            1 => i as f64 - 2.5,
            _ => ((i * 7) % 4) as f64 - 1.5,
        });
        let y = Mat::from_fn(6, 1, |i, _| 3.0 + 0.5 * (i as f64 - 2.5));
        (x, y)
    }

    #[test]
    fn test_null_model_fits_unpenalized_intercept() {
        let (x, y) = design_with_intercept();
        let path = multiresponse_gaussian(
            x,
            y,
            vec![0.0, 1.0, 1.0],
            vec![0.0, 1.0, 1.0],
            None,
            PathOptions::default(),
        )
        .unwrap();
        // intercept equals the mean response, 3.0
        assert_relative_eq!(path.solution()[(0, 0)], 3.0, epsilon = 1e-6);
        assert_eq!(row_norm(path.solution(), 1), 0.0);
        assert!(path.lagrange_max() > 0.0);
        assert!(path.diagnostics().is_empty());
        assert!(path.ever_active().is_none());
    }

    #[test]
    fn test_unpenalized_ridge_warns() {
        let (x, y) = design_with_intercept();
        let path = multiresponse_gaussian(
            x,
            y,
            vec![0.0, 1.0, 1.0],
            vec![0.0, 1.0, 1.0],
            Some(Mat::from_fn(3, 1, |_, _| 1.0)),
            PathOptions::default(),
        )
        .unwrap();
        assert_eq!(path.diagnostics().count(DiagnosticKind::UnpenalizedElasticNet), 1);
    }

    #[test]
    fn test_ever_active_is_monotone() {
        let (x, y) = design_with_intercept();
        let mut path =
            multiresponse_gaussian(x, y, vec![1.0; 3], vec![1.0; 3], None, PathOptions::default())
                .unwrap();
        assert_eq!(path.updated_ever_active(&[2]), vec![2]);
        assert_eq!(path.updated_ever_active(&[0]), vec![0, 2]);
        assert_eq!(path.updated_ever_active(&[]), vec![0, 2]);
        assert_eq!(path.ever_active(), Some(&[true, false, true][..]));
    }

    #[test]
    fn test_l1_alpha_mixes_weights() {
        let (x, y) = design_with_intercept();
        let options = PathOptions::builder().l1_alpha(0.25).build().unwrap();
        let path = multiresponse_gaussian(x, y, vec![4.0; 3], vec![4.0; 3], None, options).unwrap();
        assert_eq!(path.penalty().l1_weight(), &[1.0; 3]);
        assert_eq!(path.penalty().l2_weight(), &[3.0; 3]);
        let sub = path.subsample(&[0, 1, 2, 3]).unwrap();
        assert_eq!(sub.penalty().l1_weight(), &[1.0; 3]);
    }

    #[test]
    fn test_empty_subproblem_skips_solver() {
        let (x, y) = design_with_intercept();
        let path =
            multiresponse_gaussian(x, y, vec![1.0; 3], vec![0.0; 3], None, PathOptions::default())
                .unwrap();
        let sub = path.solve_subproblem(&[], 1.0, &SolveOptions::default()).unwrap();
        assert_eq!(sub.solution.nrows(), 0);
        assert_eq!(sub.linear_predictor.nrows(), 6);
        assert!(sub.candidate_mask.iter().all(|m| !m));
    }

    #[test]
    fn test_check_kkt_uses_supplied_penalty() {
        let (x, y) = design_with_intercept();
        let path =
            multiresponse_gaussian(x, y, vec![1.0; 3], vec![0.0; 3], None, PathOptions::default())
                .unwrap();
        let grad = Mat::from_fn(3, 1, |_, _| -2.0);
        let zero = Mat::zeros(3, 1);
        // own weights: gate value 2 > λ = 1
        assert_eq!(path.check_kkt(&grad, &zero, 1.0, None), vec![true; 3]);
        let heavy = SparseGroupBlock::uniform(Shape::new(3, 1), 5.0, 0.0, 1.0).unwrap();
        assert_eq!(path.check_kkt(&grad, &zero, 1.0, Some(&heavy)), vec![false; 3]);
    }

    #[test]
    fn test_shape_validation() {
        let (x, y) = design_with_intercept();
        assert!(matches!(
            multiresponse_gaussian(x.clone(), y.clone(), vec![1.0; 2], vec![1.0; 3], None, PathOptions::default()),
            Err(PathError::LengthMismatch { .. })
        ));
        assert!(matches!(
            multiresponse_gaussian(
                x,
                y,
                vec![1.0; 3],
                vec![1.0; 3],
                Some(Mat::zeros(2, 1)),
                PathOptions::default()
            ),
            Err(PathError::ShapeMismatch { .. })
        ));
    }
}
