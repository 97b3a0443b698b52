//! The fitted regression model and prediction.
//!
//! A [`FittedModel`] is produced once by [`crate::fit::train`] and never
//! mutated afterwards. Prediction only reads it, so one model can serve any
//! number of threads through a shared reference or `Arc`.

use std::fmt;

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;
use serde::Serialize;

use crate::domain::{FeatureVector, Prediction, TargetValue};
use crate::error::{EstimatorError, Result};
use crate::models::Standardizer;

/// Why a fit is numerically unreliable. Training still succeeds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DegenerateFit {
    /// Fewer rows than parameters (features + intercept).
    TooFewRows { rows: usize, required: usize },
    /// Standardized design matrix has rank below the feature count; the
    /// minimum-norm solution was used.
    RankDeficient { rank: usize, features: usize },
    /// A feature had zero variance in the training data.
    ConstantFeature(String),
}

impl fmt::Display for DegenerateFit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegenerateFit::TooFewRows { rows, required } => {
                write!(f, "only {rows} training rows for {required} parameters; coefficients are unstable")
            }
            DegenerateFit::RankDeficient { rank, features } => {
                write!(f, "design matrix rank {rank} < {features} features; using minimum-norm solution")
            }
            DegenerateFit::ConstantFeature(name) => write!(f, "feature {name} is constant in the training data"),
        }
    }
}

/// Training-time facts about a fit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitDiagnostics {
    pub n_rows: usize,
    /// Numerical rank of the standardized design matrix.
    pub rank: usize,
    /// In-sample R² per target, in target order.
    pub r_squared: Vec<f64>,
    pub warnings: Vec<DegenerateFit>,
}

impl FitDiagnostics {
    pub fn is_degenerate(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Standardization parameters plus a linear map from standardized features to targets.
#[derive(Debug, Clone)]
pub struct FittedModel {
    feature_names: Vec<String>,
    target_names: Vec<String>,
    scaler: Standardizer,
    /// `targets × features`; row `k` holds the coefficients for target `k`.
    coefficients: DMatrix<f64>,
    intercepts: DVector<f64>,
    diagnostics: FitDiagnostics,
}

impl FittedModel {
    pub(crate) fn new(
        feature_names: Vec<String>,
        target_names: Vec<String>,
        scaler: Standardizer,
        coefficients: DMatrix<f64>,
        intercepts: DVector<f64>,
        diagnostics: FitDiagnostics,
    ) -> Self {
        debug_assert_eq!(coefficients.shape(), (target_names.len(), feature_names.len()));
        debug_assert_eq!(intercepts.len(), target_names.len());
        debug_assert_eq!(scaler.n_features(), feature_names.len());
        Self {
            feature_names,
            target_names,
            scaler,
            coefficients,
            intercepts,
            diagnostics,
        }
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn target_names(&self) -> &[String] {
        &self.target_names
    }

    pub fn scaler(&self) -> &Standardizer {
        &self.scaler
    }

    pub fn coefficients(&self) -> &DMatrix<f64> {
        &self.coefficients
    }

    /// Coefficients of one target, in feature order.
    pub fn coefficients_for(&self, target: usize) -> Vec<f64> {
        self.coefficients.row(target).iter().copied().collect()
    }

    pub fn intercepts(&self) -> &DVector<f64> {
        &self.intercepts
    }

    pub fn diagnostics(&self) -> &FitDiagnostics {
        &self.diagnostics
    }

    /// Predicted target values for a row in recorded feature order.
    ///
    /// The row is standardized with the training statistics, then mapped
    /// through `coefficients · z + intercepts`. Outputs are not clamped.
    pub fn predict_raw(&self, input: &[f64]) -> Result<DVector<f64>> {
        if input.len() != self.feature_names.len() {
            return Err(EstimatorError::DimensionMismatch {
                expected: self.feature_names.len(),
                actual: input.len(),
            });
        }
        if let Some(j) = input.iter().position(|v| !v.is_finite()) {
            return Err(EstimatorError::NonFiniteInput(self.feature_names[j].clone()));
        }

        let z = self.scaler.transform_row(input)?;
        Ok(&self.coefficients * z + &self.intercepts)
    }

    /// Predict from a row in recorded feature order.
    pub fn predict(&self, input: &[f64]) -> Result<Prediction> {
        let raw = self.predict_raw(input)?;
        let values = self
            .target_names
            .iter()
            .zip(raw.iter())
            .map(|(target, &value)| TargetValue {
                target: target.clone(),
                value,
            })
            .collect();
        Ok(Prediction { values })
    }

    pub fn predict_features(&self, features: &FeatureVector) -> Result<Prediction> {
        self.predict(&features.to_array())
    }

    /// Predict many rows in parallel. Fails on the first invalid row.
    pub fn predict_batch(&self, rows: &[FeatureVector]) -> Result<Vec<Prediction>> {
        rows.par_iter().map(|row| self.predict_features(row)).collect()
    }
}
