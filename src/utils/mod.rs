//! Shared numerical helpers.

mod matrix;

pub use matrix::{
    add_scaled, all_finite, frobenius_norm, indices_to_mask, inner, l2_norm, mask_to_indices,
    row, row_norm, row_norms, scatter_rows, select_columns, select_rows, sign, soft_threshold,
};
