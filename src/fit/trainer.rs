//! Multi-output OLS training.
//!
//! Given:
//! - an `n × p` feature matrix `X`
//! - an `n × k` target matrix `Y`
//!
//! we:
//! - fit a [`Standardizer`] on `X` and transform it to `Z`
//! - center `Z` and `Y` by their column means
//! - solve `Z_c B ≈ Y_c` for all `k` targets at once (SVD, minimum-norm)
//! - recover intercepts as `ȳ - Bᵀ z̄`
//!
//! Centering before the solve keeps the intercepts out of the minimum-norm
//! penalty, so a rank-deficient fit still predicts the target means at the
//! feature means.

use nalgebra::{DMatrix, DVector};

use crate::data::Dataset;
use crate::domain::{FEATURE_COLUMNS, TARGET_COLUMNS};
use crate::error::{EstimatorError, Result};
use crate::math::{r_squared, solve_least_squares};
use crate::models::{DegenerateFit, FitDiagnostics, FittedModel, Standardizer};

/// Train the estimator on the historical dataset.
pub fn train(dataset: &Dataset) -> Result<FittedModel> {
    train_matrices(
        &dataset.feature_matrix(),
        &dataset.target_matrix(),
        &FEATURE_COLUMNS,
        &TARGET_COLUMNS,
    )
}

/// Train on raw matrices with explicit column names.
pub fn train_matrices(
    x: &DMatrix<f64>,
    y: &DMatrix<f64>,
    feature_names: &[&str],
    target_names: &[&str],
) -> Result<FittedModel> {
    let (n, p) = x.shape();
    if n == 0 {
        return Err(EstimatorError::EmptyDataset);
    }
    if p != feature_names.len() {
        return Err(EstimatorError::DimensionMismatch {
            expected: feature_names.len(),
            actual: p,
        });
    }
    if y.nrows() != n || y.ncols() != target_names.len() {
        return Err(EstimatorError::DimensionMismatch {
            expected: target_names.len(),
            actual: y.ncols(),
        });
    }
    check_finite(x, feature_names)?;
    check_finite(y, target_names)?;

    let scaler = Standardizer::fit(x)?;
    let z = scaler.transform(x)?;

    let z_mean = column_means(&z);
    let y_mean = column_means(y);
    let z_centered = DMatrix::from_fn(n, p, |i, j| z[(i, j)] - z_mean[j]);
    let y_centered = DMatrix::from_fn(n, y.ncols(), |i, k| y[(i, k)] - y_mean[k]);

    let solution = solve_least_squares(&z_centered, &y_centered)
        .ok_or_else(|| EstimatorError::SolveFailed("no finite least-squares solution".to_string()))?;

    // beta is p × k; store one row per target.
    let coefficients = solution.beta.transpose();
    let intercepts = &y_mean - &coefficients * &z_mean;

    let fitted = &z * &solution.beta + DMatrix::from_fn(n, y.ncols(), |_, k| intercepts[k]);
    let r2 = (0..y.ncols())
        .map(|k| {
            let observed: Vec<f64> = y.column(k).iter().copied().collect();
            let predicted: Vec<f64> = fitted.column(k).iter().copied().collect();
            r_squared(&observed, &predicted).unwrap_or(f64::NAN)
        })
        .collect();

    let mut warnings = Vec::new();
    if n < p + 1 {
        warnings.push(DegenerateFit::TooFewRows { rows: n, required: p + 1 });
    }
    if solution.rank < p {
        warnings.push(DegenerateFit::RankDeficient {
            rank: solution.rank,
            features: p,
        });
    }
    for j in scaler.constant_features() {
        warnings.push(DegenerateFit::ConstantFeature(feature_names[j].to_string()));
    }
    for w in &warnings {
        tracing::warn!("degenerate fit: {w}");
    }
    tracing::debug!(rows = n, features = p, targets = y.ncols(), rank = solution.rank, "trained model");

    Ok(FittedModel::new(
        feature_names.iter().map(|s| s.to_string()).collect(),
        target_names.iter().map(|s| s.to_string()).collect(),
        scaler,
        coefficients,
        intercepts,
        FitDiagnostics {
            n_rows: n,
            rank: solution.rank,
            r_squared: r2,
            warnings,
        },
    ))
}

/// First non-finite cell, reported by column name and zero-based row.
fn check_finite(m: &DMatrix<f64>, names: &[&str]) -> Result<()> {
    for (j, name) in names.iter().enumerate() {
        if let Some(row) = m.column(j).iter().position(|v| !v.is_finite()) {
            return Err(EstimatorError::NonFiniteTrainingValue {
                row,
                column: name.to_string(),
            });
        }
    }
    Ok(())
}

fn column_means(m: &DMatrix<f64>) -> DVector<f64> {
    let n = m.nrows() as f64;
    DVector::from_iterator(m.ncols(), m.column_iter().map(|c| c.sum() / n))
}
