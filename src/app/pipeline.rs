//! Shared "load → train → predict" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! config resolution -> dataset load -> input ranges -> model (trained once per process)
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use crate::data::{Dataset, InputRanges};
use crate::domain::{DATA_ENV_VAR, EstimatorConfig};
use crate::error::AppError;
use crate::fit::train;
use crate::models::{FittedModel, ModelHandle, SHARED_MODEL};

/// Everything a front end needs to serve predictions.
#[derive(Debug, Clone)]
pub struct Session {
    pub config: EstimatorConfig,
    pub dataset: Dataset,
    pub ranges: InputRanges,
    pub handle: &'static ModelHandle,
}

impl Session {
    /// The model currently visible to predictors.
    pub fn model(&self) -> Arc<FittedModel> {
        self.handle.current()
    }

    /// Reload the dataset from disk, retrain, and publish the new model.
    ///
    /// The session is only updated if both the load and the fit succeed.
    pub fn reload(&mut self) -> Result<Arc<FittedModel>, AppError> {
        let dataset = load_dataset(&self.config)?;
        let ranges = InputRanges::from_dataset(&dataset)?;
        let model = self.handle.retrain(&dataset)?;
        tracing::info!(rows = dataset.len(), "reloaded dataset and retrained");
        self.dataset = dataset;
        self.ranges = ranges;
        Ok(model)
    }
}

/// Resolve configuration: `--data` flag, then `DEVEST_DATA` (also from `.env`), then the default path.
pub fn resolve_config(data_flag: Option<PathBuf>) -> EstimatorConfig {
    dotenvy::dotenv().ok();
    resolve_config_from(data_flag, std::env::var(DATA_ENV_VAR).ok())
}

fn resolve_config_from(data_flag: Option<PathBuf>, env_value: Option<String>) -> EstimatorConfig {
    if let Some(path) = data_flag {
        return EstimatorConfig {
            data_path: path,
            data_path_explicit: true,
        };
    }
    match env_value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        Some(v) => EstimatorConfig {
            data_path: PathBuf::from(v),
            data_path_explicit: true,
        },
        None => EstimatorConfig::default(),
    }
}

/// If the default dataset is absent and we are attached to a terminal, let the user pick one.
pub fn ensure_dataset_path(config: &mut EstimatorConfig) -> Result<(), AppError> {
    if config.data_path.exists() || config.data_path_explicit || !std::io::stdin().is_terminal() {
        return Ok(());
    }
    config.data_path = crate::cli::picker::prompt_for_dataset(&config.data_path)?;
    Ok(())
}

pub fn load_dataset(config: &EstimatorConfig) -> Result<Dataset, AppError> {
    Dataset::load(&config.data_path).map_err(|e| {
        AppError::new(
            e.exit_code(),
            format!("Failed to load dataset '{}': {e}", config.data_path.display()),
        )
    })
}

/// Load the dataset, derive input ranges, and obtain the process-wide model.
pub fn prepare_session(config: EstimatorConfig) -> Result<Session, AppError> {
    let dataset = load_dataset(&config)?;
    let ranges = InputRanges::from_dataset(&dataset)?;
    let handle = SHARED_MODEL.get_or_try_init(|| train(&dataset))?;

    Ok(Session {
        config,
        dataset,
        ranges,
        handle,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DEFAULT_DATA_PATH;

    #[test]
    fn flag_beats_environment() {
        let cfg = resolve_config_from(Some(PathBuf::from("flag.csv")), Some("env.csv".to_string()));
        assert_eq!(cfg.data_path, PathBuf::from("flag.csv"));
        assert!(cfg.data_path_explicit);
    }

    #[test]
    fn environment_beats_default() {
        let cfg = resolve_config_from(None, Some(" env.csv ".to_string()));
        assert_eq!(cfg.data_path, PathBuf::from("env.csv"));
        assert!(cfg.data_path_explicit);
    }

    #[test]
    fn blank_environment_falls_back_to_default() {
        let cfg = resolve_config_from(None, Some("   ".to_string()));
        assert_eq!(cfg.data_path, PathBuf::from(DEFAULT_DATA_PATH));
        assert!(!cfg.data_path_explicit);
    }

    #[test]
    fn missing_dataset_reports_path() {
        let cfg = EstimatorConfig {
            data_path: PathBuf::from("/definitely/not/here.csv"),
            data_path_explicit: true,
        };
        let err = load_dataset(&cfg).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("/definitely/not/here.csv"));
    }
}
