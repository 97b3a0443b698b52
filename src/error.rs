//! Error types.
//!
//! Two layers:
//!
//! - [`EstimatorError`]: library errors raised while loading data, training, and predicting
//! - [`AppError`]: what the `devest` binary reports (message + process exit code)

use thiserror::Error;

/// Errors raised by the dataset loader, trainer, and predictor.
#[derive(Debug, Error)]
pub enum EstimatorError {
    #[error("Dataset is missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Invalid value {value:?} for column {column} on line {line}: expected a finite number")]
    InvalidValue {
        line: usize,
        column: String,
        value: String,
    },

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Dataset has no rows to train on")]
    EmptyDataset,

    #[error("Training value for column {column} in row {row} is not a finite number")]
    NonFiniteTrainingValue { row: usize, column: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Dimension mismatch: model expects {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Input feature {0} is not a finite number")]
    NonFiniteInput(String),

    #[error("Least-squares solve failed: {0}")]
    SolveFailed(String),
}

impl EstimatorError {
    /// Process exit code used when this error reaches the binary boundary.
    pub fn exit_code(&self) -> u8 {
        match self {
            EstimatorError::MissingColumns(_)
            | EstimatorError::InvalidValue { .. }
            | EstimatorError::UnknownColumn(_)
            | EstimatorError::Csv(_)
            | EstimatorError::Io(_)
            | EstimatorError::EmptyDataset
            | EstimatorError::NonFiniteTrainingValue { .. }
            | EstimatorError::InvalidConfig(_) => 2,
            EstimatorError::DimensionMismatch { .. } | EstimatorError::NonFiniteInput(_) => 3,
            EstimatorError::SolveFailed(_) => 4,
        }
    }
}

/// Result alias for library operations.
pub type Result<T> = std::result::Result<T, EstimatorError>;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<EstimatorError> for AppError {
    fn from(err: EstimatorError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_columns_lists_every_name() {
        let err = EstimatorError::MissingColumns(vec!["Commits".to_string(), "Sleep_Hours".to_string()]);
        let msg = err.to_string();
        assert!(msg.contains("Commits"));
        assert!(msg.contains("Sleep_Hours"));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn estimator_errors_map_to_app_exit_codes() {
        let app: AppError = EstimatorError::DimensionMismatch { expected: 5, actual: 4 }.into();
        assert_eq!(app.exit_code(), 3);
        assert!(app.to_string().contains("expects 5 features, got 4"));

        let app: AppError = EstimatorError::SolveFailed("singular".to_string()).into();
        assert_eq!(app.exit_code(), 4);

        let app: AppError = EstimatorError::NonFiniteTrainingValue { row: 3, column: "Commits".to_string() }.into();
        assert_eq!(app.exit_code(), 2);
        let app: AppError = EstimatorError::InvalidConfig("noise_scale".to_string()).into();
        assert_eq!(app.exit_code(), 2);
    }
}
