//! Common test utilities and data generators.

#![allow(dead_code)]

use faer::Mat;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

/// Two orthonormal columns: points on a circle scaled by `√(2/n)`.
///
/// `n` must be at least 3.
pub fn circle_design(n: usize) -> Mat<f64> {
    let c = (2.0 / n as f64).sqrt();
    Mat::from_fn(n, 2, |i, j| {
        let angle = 2.0 * PI * i as f64 / n as f64;
        if j == 0 {
            c * angle.cos()
        } else {
            c * angle.sin()
        }
    })
}

/// Two-group Gaussian problem with true coefficients `[2, 0]`.
///
/// Columns are orthonormal, so `lagrange_max = 2` and the solution at `λ`
/// is `[2 − λ, 0]` for a pure l1 penalty.
pub fn two_group_gaussian(n: usize) -> (Mat<f64>, Mat<f64>) {
    let x = circle_design(n);
    let y = Mat::from_fn(n, 1, |i, _| 2.0 * x[(i, 0)]);
    (x, y)
}

/// Uniform(-1, 1) design.
pub fn random_design(n_samples: usize, n_features: usize, seed: u64) -> Mat<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    Mat::from_fn(n_samples, n_features, |_, _| rng.gen_range(-1.0..1.0))
}

/// Gaussian responses depending on the first feature only.
pub fn sparse_gaussian_response(x: &Mat<f64>, n_responses: usize, noise: f64, seed: u64) -> Mat<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    Mat::from_fn(x.nrows(), n_responses, |i, k| {
        (k as f64 + 1.0) * x[(i, 0)] + noise * rng.gen_range(-1.0..1.0)
    })
}

/// Multinomial counts (one observation per case) where the class is
/// driven by the first two features.
pub fn multinomial_data(n_samples: usize, n_features: usize, seed: u64) -> (Mat<f64>, Mat<f64>) {
    let x = random_design(n_samples, n_features, seed);
    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(1));
    let mut counts = Mat::zeros(n_samples, 3);
    for i in 0..n_samples {
        let scores = [2.0 * x[(i, 0)], 2.0 * x[(i, 1)], 0.0];
        let noisy: Vec<f64> = scores
            .iter()
            .map(|s| s + 0.5 * rng.gen_range(-1.0..1.0))
            .collect();
        let mut best = 0;
        for k in 1..3 {
            if noisy[k] > noisy[best] {
                best = k;
            }
        }
        counts[(i, best)] = 1.0;
    }
    (x, counts)
}

/// Approximate equality check for floating point values.
pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}
