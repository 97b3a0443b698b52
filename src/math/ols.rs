//! Multi-output least squares solver.
//!
//! Training solves one regression per target, all sharing the same design
//! matrix:
//!
//! ```text
//! minimize ‖Y - X B‖²   (X: n×p, Y: n×k, B: p×k)
//! ```
//!
//! Implementation choices:
//! - SVD, so the same code path handles tall, square, and wide (n < p) systems.
//!   Singular values below the cutoff are dropped, which yields the
//!   minimum-norm solution when `X` is rank-deficient.
//! - The cutoff is relative to the largest singular value (`σ_max · max(n, p) · ε`).
//!   If that produces non-finite coefficients we retry with looser cutoffs.
//! - `p` is tiny here (five features), so SVD cost is negligible.

use nalgebra::{DMatrix, DVector};

/// Coefficients plus the numerical rank observed during the solve.
#[derive(Debug, Clone)]
pub struct LeastSquaresSolution {
    /// `p × k` coefficient matrix (one column per right-hand side).
    pub beta: DMatrix<f64>,
    /// Number of singular values above the accepted cutoff.
    pub rank: usize,
}

/// Solve a least squares problem with one or more right-hand sides using SVD.
///
/// Returns `None` if the shapes disagree or no cutoff produces finite coefficients.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DMatrix<f64>) -> Option<LeastSquaresSolution> {
    if x.nrows() != y.nrows() || x.nrows() == 0 || x.ncols() == 0 {
        return None;
    }

    let svd = x.clone().svd(true, true);
    let sigma_max = svd.singular_values.iter().copied().fold(0.0_f64, f64::max);
    let dim = x.nrows().max(x.ncols()) as f64;
    let base_tol = sigma_max * dim * f64::EPSILON;

    for &tol in &[base_tol, sigma_max * 1e-8, sigma_max * 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                let rank = svd.singular_values.iter().filter(|&&s| s > tol).count();
                return Some(LeastSquaresSolution { beta, rank });
            }
        }
    }

    None
}

/// Single right-hand-side convenience wrapper.
pub fn solve_least_squares_vec(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let rhs = DMatrix::from_column_slice(y.len(), 1, y.as_slice());
    solve_least_squares(x, &rhs).map(|s| s.beta.column(0).into_owned())
}
