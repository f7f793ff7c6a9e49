//! Sparse-group block penalty.

use crate::core::Shape;
use crate::path::gate::{dual_gauge, gauge_value, GaugeDecomposition};
use crate::solvers::PathError;
use crate::utils::{row, soft_threshold};
use faer::Mat;

/// `λ Σ_g (l1_g ‖β_g‖₁ + l2_g ‖β_g‖₂)` where `β_g` is row `g` of a
/// `(groups, responses)` coefficient matrix.
///
/// A group with both weights zero is unpenalized.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseGroupBlock {
    shape: Shape,
    l1_weight: Vec<f64>,
    l2_weight: Vec<f64>,
    lagrange: f64,
}

impl SparseGroupBlock {
    /// Penalty with per-group weights.
    pub fn new(
        shape: Shape,
        l1_weight: Vec<f64>,
        l2_weight: Vec<f64>,
        lagrange: f64,
    ) -> Result<Self, PathError> {
        for (name, w) in [("l1_weight", &l1_weight), ("l2_weight", &l2_weight)] {
            if w.len() != shape.rows {
                return Err(PathError::LengthMismatch {
                    context: name_context(name),
                    expected: shape.rows,
                    found: w.len(),
                });
            }
            if let Some(bad) = w.iter().find(|x| !x.is_finite() || **x < 0.0) {
                return Err(PathError::InvalidWeights(format!(
                    "{} must be finite and non-negative, got {}",
                    name, bad
                )));
            }
        }
        if !lagrange.is_finite() || lagrange < 0.0 {
            return Err(PathError::InvalidWeights(format!(
                "lagrange must be finite and non-negative, got {}",
                lagrange
            )));
        }
        Ok(Self {
            shape,
            l1_weight,
            l2_weight,
            lagrange,
        })
    }

    /// Penalty with the same weights on every group.
    pub fn uniform(shape: Shape, l1_weight: f64, l2_weight: f64, lagrange: f64) -> Result<Self, PathError> {
        Self::new(
            shape,
            vec![l1_weight; shape.rows],
            vec![l2_weight; shape.rows],
            lagrange,
        )
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn l1_weight(&self) -> &[f64] {
        &self.l1_weight
    }

    pub fn l2_weight(&self) -> &[f64] {
        &self.l2_weight
    }

    pub fn lagrange(&self) -> f64 {
        self.lagrange
    }

    /// Copy with a different Lagrange parameter.
    pub fn with_lagrange(&self, lagrange: f64) -> Self {
        Self {
            lagrange,
            ..self.clone()
        }
    }

    pub fn n_groups(&self) -> usize {
        self.shape.rows
    }

    pub fn is_unpenalized(&self, group: usize) -> bool {
        self.l1_weight[group] == 0.0 && self.l2_weight[group] == 0.0
    }

    /// Groups with both weights zero.
    pub fn unpenalized_groups(&self) -> Vec<usize> {
        (0..self.n_groups())
            .filter(|&g| self.is_unpenalized(g))
            .collect()
    }

    /// Penalty value at `coef`.
    pub fn value(&self, coef: &Mat<f64>) -> f64 {
        let mut total = 0.0;
        for g in 0..self.shape.rows {
            let mut l1 = 0.0;
            let mut sq = 0.0;
            for j in 0..self.shape.cols {
                let b = coef[(g, j)];
                l1 += b.abs();
                sq += b * b;
            }
            total += self.l1_weight[g] * l1 + self.l2_weight[g] * sq.sqrt();
        }
        self.lagrange * total
    }

    /// Proximal map `argmin_z ½‖z - coef‖² + step · penalty(z)`.
    ///
    /// Row-wise: soft-threshold by `step·λ·l1`, then shrink the row norm by
    /// `step·λ·l2`.
    pub fn proximal(&self, coef: &Mat<f64>, step: f64) -> Mat<f64> {
        let mut out = Mat::zeros(self.shape.rows, self.shape.cols);
        for g in 0..self.shape.rows {
            let t1 = step * self.lagrange * self.l1_weight[g];
            let t2 = step * self.lagrange * self.l2_weight[g];
            let mut norm_sq = 0.0;
            for j in 0..self.shape.cols {
                let z = soft_threshold(coef[(g, j)], t1);
                out[(g, j)] = z;
                norm_sq += z * z;
            }
            let norm = norm_sq.sqrt();
            let scale = if norm > t2 { 1.0 - t2 / norm } else { 0.0 };
            for j in 0..self.shape.cols {
                out[(g, j)] *= scale;
            }
        }
        out
    }

    /// Penalty over the listed groups, with their weights, in the given order.
    pub fn restrict(&self, subset: &[usize]) -> Result<Self, PathError> {
        let mut l1 = Vec::with_capacity(subset.len());
        let mut l2 = Vec::with_capacity(subset.len());
        for &g in subset {
            if g >= self.n_groups() {
                return Err(PathError::InvalidCandidate {
                    index: g,
                    n_groups: self.n_groups(),
                });
            }
            l1.push(self.l1_weight[g]);
            l2.push(self.l2_weight[g]);
        }
        Self::new(Shape::new(subset.len(), self.shape.cols), l1, l2, self.lagrange)
    }

    /// Gauge decomposition of row `group` of `grad`.
    pub fn group_gauge(&self, grad: &Mat<f64>, group: usize) -> GaugeDecomposition {
        dual_gauge(&row(grad, group), self.l1_weight[group], self.l2_weight[group])
    }

    /// Largest gauge value over penalized groups: the smallest Lagrange
    /// value at which every penalized group of a solution with gradient
    /// `grad` can be zero.
    pub fn dual_norm(&self, grad: &Mat<f64>) -> f64 {
        (0..self.n_groups())
            .filter(|&g| !self.is_unpenalized(g))
            .map(|g| gauge_value(&row(grad, g), self.l1_weight[g], self.l2_weight[g]))
            .fold(0.0, f64::max)
    }
}

fn name_context(name: &str) -> &'static str {
    if name == "l1_weight" {
        "l1_weight vs number of groups"
    } else {
        "l2_weight vs number of groups"
    }
}
