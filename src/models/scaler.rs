//! Per-feature standardization (zero mean, unit variance).
//!
//! Statistics always come from the training set. A single prediction row is
//! transformed with those stored statistics, never with its own.

use nalgebra::{DMatrix, DVector};

use crate::error::{EstimatorError, Result};
use crate::math::{mean, population_std};

/// Standard deviations at or below this are treated as a constant column.
const ZERO_STD: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq)]
pub struct Standardizer {
    means: Vec<f64>,
    stds: Vec<f64>,
    /// Divisor actually applied: the std, or `1.0` for a constant column so it
    /// maps to zero instead of NaN.
    scales: Vec<f64>,
}

impl Standardizer {
    /// Compute column means and population standard deviations.
    pub fn fit(x: &DMatrix<f64>) -> Result<Self> {
        if x.nrows() == 0 {
            return Err(EstimatorError::EmptyDataset);
        }

        let mut means = Vec::with_capacity(x.ncols());
        let mut stds = Vec::with_capacity(x.ncols());
        for column in x.column_iter() {
            let values: Vec<f64> = column.iter().copied().collect();
            means.push(mean(&values).ok_or(EstimatorError::EmptyDataset)?);
            stds.push(population_std(&values).ok_or(EstimatorError::EmptyDataset)?);
        }
        let scales = stds.iter().map(|&s| if s > ZERO_STD { s } else { 1.0 }).collect();

        Ok(Self { means, stds, scales })
    }

    pub fn n_features(&self) -> usize {
        self.means.len()
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn stds(&self) -> &[f64] {
        &self.stds
    }

    /// Indices of columns that had zero variance in the training data.
    pub fn constant_features(&self) -> Vec<usize> {
        self.stds
            .iter()
            .enumerate()
            .filter(|(_, s)| **s <= ZERO_STD)
            .map(|(j, _)| j)
            .collect()
    }

    /// Standardize a single row.
    pub fn transform_row(&self, row: &[f64]) -> Result<DVector<f64>> {
        if row.len() != self.n_features() {
            return Err(EstimatorError::DimensionMismatch {
                expected: self.n_features(),
                actual: row.len(),
            });
        }
        Ok(DVector::from_iterator(
            row.len(),
            row.iter()
                .zip(self.means.iter().zip(&self.scales))
                .map(|(v, (m, s))| (v - m) / s),
        ))
    }

    /// Standardize every row of a matrix.
    pub fn transform(&self, x: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        if x.ncols() != self.n_features() {
            return Err(EstimatorError::DimensionMismatch {
                expected: self.n_features(),
                actual: x.ncols(),
            });
        }
        Ok(DMatrix::from_fn(x.nrows(), x.ncols(), |i, j| {
            (x[(i, j)] - self.means[j]) / self.scales[j]
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DMatrix<f64> {
        DMatrix::from_row_slice(4, 2, &[1.0, 10.0, 2.0, 20.0, 3.0, 30.0, 4.0, 40.0])
    }

    #[test]
    fn mean_maps_to_zero_and_one_std_maps_to_one() {
        let scaler = Standardizer::fit(&sample()).unwrap();
        let (m0, m1) = (scaler.means()[0], scaler.means()[1]);
        let (s0, s1) = (scaler.stds()[0], scaler.stds()[1]);

        let at_mean = scaler.transform_row(&[m0, m1]).unwrap();
        assert!(at_mean[0].abs() < 1e-12 && at_mean[1].abs() < 1e-12);

        let one_up = scaler.transform_row(&[m0 + s0, m1 + s1]).unwrap();
        assert!((one_up[0] - 1.0).abs() < 1e-12);
        assert!((one_up[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn transformed_columns_have_zero_mean_unit_variance() {
        let scaled = Standardizer::fit(&sample()).unwrap().transform(&sample()).unwrap();
        for column in scaled.column_iter() {
            let values: Vec<f64> = column.iter().copied().collect();
            assert!(mean(&values).unwrap().abs() < 1e-12);
            assert!((population_std(&values).unwrap() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn constant_column_maps_to_zero() {
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 5.0, 2.0, 5.0, 3.0, 5.0]);
        let scaler = Standardizer::fit(&x).unwrap();
        assert_eq!(scaler.constant_features(), vec![1]);
        let z = scaler.transform(&x).unwrap();
        assert!(z.column(1).iter().all(|v| *v == 0.0));
    }

    #[test]
    fn wrong_row_length_is_rejected() {
        let scaler = Standardizer::fit(&sample()).unwrap();
        assert!(matches!(
            scaler.transform_row(&[1.0, 2.0, 3.0]),
            Err(EstimatorError::DimensionMismatch { expected: 2, actual: 3 })
        ));
    }

    #[test]
    fn empty_matrix_cannot_be_fitted() {
        let x = DMatrix::<f64>::zeros(0, 5);
        assert!(matches!(Standardizer::fit(&x), Err(EstimatorError::EmptyDataset)));
    }
}
