//! Matrix utility functions.

use faer::{Mat, Scale};

/// Soft thresholding operator: S(z, γ) = sign(z) * max(|z| - γ, 0)
#[inline]
pub fn soft_threshold(z: f64, gamma: f64) -> f64 {
    if z > gamma {
        z - gamma
    } else if z < -gamma {
        z + gamma
    } else {
        0.0
    }
}

/// Sign with `sign(0) = 0`.
#[inline]
pub fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Euclidean norm of a slice.
#[inline]
pub fn l2_norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Copy row `i` into a vector.
pub fn row(m: &Mat<f64>, i: usize) -> Vec<f64> {
    (0..m.ncols()).map(|j| m[(i, j)]).collect()
}

/// Euclidean norm of row `i`.
pub fn row_norm(m: &Mat<f64>, i: usize) -> f64 {
    (0..m.ncols())
        .map(|j| m[(i, j)] * m[(i, j)])
        .sum::<f64>()
        .sqrt()
}

/// Euclidean norms of all rows.
pub fn row_norms(m: &Mat<f64>) -> Vec<f64> {
    (0..m.nrows()).map(|i| row_norm(m, i)).collect()
}

/// Frobenius norm.
pub fn frobenius_norm(m: &Mat<f64>) -> f64 {
    m.norm_l2()
}

/// Frobenius inner product ⟨a, b⟩.
pub fn inner(a: &Mat<f64>, b: &Mat<f64>) -> f64 {
    (0..a.ncols())
        .map(|j| a.col(j).transpose() * b.col(j))
        .sum()
}

/// a + scale * b, elementwise.
pub fn add_scaled(a: &Mat<f64>, scale: f64, b: &Mat<f64>) -> Mat<f64> {
    a + Scale(scale) * b
}

/// Gather the listed rows into a new matrix.
pub fn select_rows(m: &Mat<f64>, rows: &[usize]) -> Mat<f64> {
    Mat::from_fn(rows.len(), m.ncols(), |k, j| m[(rows[k], j)])
}

/// Gather the listed columns into a new matrix.
pub fn select_columns(m: &Mat<f64>, columns: &[usize]) -> Mat<f64> {
    Mat::from_fn(m.nrows(), columns.len(), |i, k| m[(i, columns[k])])
}

/// Write the rows of `src` into the listed rows of `dst`.
pub fn scatter_rows(dst: &mut Mat<f64>, rows: &[usize], src: &Mat<f64>) {
    for (k, &r) in rows.iter().enumerate() {
        for j in 0..src.ncols() {
            dst[(r, j)] = src[(k, j)];
        }
    }
}

/// Positions of the `true` entries.
pub fn mask_to_indices(mask: &[bool]) -> Vec<usize> {
    mask.iter()
        .enumerate()
        .filter(|(_, &m)| m)
        .map(|(i, _)| i)
        .collect()
}

/// Boolean mask of length `n` with the listed positions set.
///
/// Indices `>= n` are ignored; callers validate beforehand.
pub fn indices_to_mask(indices: &[usize], n: usize) -> Vec<bool> {
    let mut mask = vec![false; n];
    for &i in indices {
        if i < n {
            mask[i] = true;
        }
    }
    mask
}

/// Whether every entry is finite.
pub fn all_finite(m: &Mat<f64>) -> bool {
    (0..m.ncols()).all(|j| (0..m.nrows()).all(|i| m[(i, j)].is_finite()))
}
