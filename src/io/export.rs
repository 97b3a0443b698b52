//! Exports: prediction JSON, batch prediction CSV, and dataset CSV.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::path::Path;

use chrono::Local;
use serde::Serialize;

use crate::data::Dataset;
use crate::domain::{FEATURE_COLUMNS, FeatureVector, Prediction, TARGET_COLUMNS};
use crate::error::AppError;
use crate::models::FitDiagnostics;

/// JSON document written by `devest predict --json`.
#[derive(Debug, Serialize)]
pub struct PredictionReport<'a> {
    pub tool: &'static str,
    pub generated: String,
    pub dataset: Option<String>,
    pub inputs: &'a FeatureVector,
    pub prediction: &'a Prediction,
    pub fit: &'a FitDiagnostics,
}

/// Write a single prediction (plus its inputs and fit diagnostics) as pretty JSON.
pub fn write_prediction_json(
    path: &Path,
    inputs: &FeatureVector,
    prediction: &Prediction,
    fit: &FitDiagnostics,
    dataset: Option<&Path>,
) -> Result<(), AppError> {
    let report = PredictionReport {
        tool: concat!("devest ", env!("CARGO_PKG_VERSION")),
        generated: Local::now().to_rfc3339(),
        dataset: dataset.map(|p| p.display().to_string()),
        inputs,
        prediction,
        fit,
    };

    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, &report)
        .map_err(|e| AppError::new(2, format!("Failed to write prediction JSON: {e}")))?;
    Ok(())
}

/// Write batch inputs and their predictions, one row per input.
pub fn write_predictions_csv(
    path: &Path,
    rows: &[FeatureVector],
    predictions: &[Prediction],
) -> Result<(), AppError> {
    if rows.len() != predictions.len() {
        return Err(AppError::new(
            4,
            format!("Row count mismatch: {} inputs, {} predictions.", rows.len(), predictions.len()),
        ));
    }

    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    let header: Vec<&str> = FEATURE_COLUMNS.iter().chain(TARGET_COLUMNS.iter()).copied().collect();
    writer
        .write_record(&header)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for (row, prediction) in rows.iter().zip(predictions) {
        let mut record: Vec<String> = row.to_array().iter().map(|v| v.to_string()).collect();
        for target in TARGET_COLUMNS {
            let value = prediction.get(target).unwrap_or(f64::NAN);
            record.push(format!("{value:.4}"));
        }
        writer
            .write_record(&record)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write a dataset in the historical schema (feature columns, then target columns).
pub fn write_dataset_csv(path: &Path, dataset: &Dataset) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create dataset CSV '{}': {e}", path.display())))?;

    let header: Vec<&str> = FEATURE_COLUMNS.iter().chain(TARGET_COLUMNS.iter()).copied().collect();
    writer
        .write_record(&header)
        .map_err(|e| AppError::new(2, format!("Failed to write dataset CSV header: {e}")))?;

    for r in dataset.records() {
        let record: Vec<String> = r.features.iter().chain(r.targets.iter()).map(|v| v.to_string()).collect();
        writer
            .write_record(&record)
            .map_err(|e| AppError::new(2, format!("Failed to write dataset CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush dataset CSV: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{SyntheticConfig, generate_dataset, read_feature_rows};
    use crate::fit::train;

    #[test]
    fn dataset_csv_reloads_identically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("synthetic.csv");
        let ds = generate_dataset(&SyntheticConfig { rows: 25, seed: 9, noise_scale: 1.0 }).unwrap();

        write_dataset_csv(&path, &ds).unwrap();
        let reloaded = Dataset::load(&path).unwrap();

        assert_eq!(reloaded.records(), ds.records());
        assert_eq!(reloaded.source(), Some(path.as_path()));
    }

    #[test]
    fn predictions_csv_has_inputs_and_targets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let ds = generate_dataset(&SyntheticConfig { rows: 30, seed: 2, noise_scale: 1.0 }).unwrap();
        let model = train(&ds).unwrap();

        let rows: Vec<FeatureVector> = ds
            .records()
            .iter()
            .take(3)
            .map(|r| FeatureVector::from_slice(&r.features).unwrap())
            .collect();
        let preds = model.predict_batch(&rows).unwrap();
        write_predictions_csv(&path, &rows, &preds).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Hours_Coding,Coffee_Intake,Stress_Level,AI_Usage_Hours,Sleep_Hours,Lines_of_Code,Bugs_Fixed,Task_Success_Rate,Commits"
        );
        assert_eq!(lines.count(), 3);

        // The output is itself a valid batch input.
        let again = read_feature_rows(std::fs::File::open(&path).unwrap()).unwrap();
        assert_eq!(again, rows);
    }

    #[test]
    fn prediction_json_contains_targets_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prediction.json");
        let ds = generate_dataset(&SyntheticConfig { rows: 30, seed: 4, noise_scale: 1.0 }).unwrap();
        let model = train(&ds).unwrap();
        let inputs = FeatureVector::from_slice(&ds.records()[0].features).unwrap();
        let prediction = model.predict_features(&inputs).unwrap();

        write_prediction_json(&path, &inputs, &prediction, model.diagnostics(), None).unwrap();

        let json: serde_json::Value = serde_json::from_reader(File::open(&path).unwrap()).unwrap();
        let targets: Vec<&str> = json["prediction"]["values"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["target"].as_str().unwrap())
            .collect();
        assert_eq!(targets, TARGET_COLUMNS.to_vec());
        assert_eq!(json["inputs"]["Hours_Coding"].as_f64().unwrap(), inputs.hours_coding);
        assert_eq!(json["fit"]["n_rows"].as_u64().unwrap(), 30);
    }
}
