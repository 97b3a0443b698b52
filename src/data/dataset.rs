//! CSV dataset loading.
//!
//! Turns the historical CSV into an immutable [`Dataset`] of numeric records.
//!
//! Design goals:
//! - **Strict schema**: all nine modeled columns must be present (exact,
//!   case-sensitive names); extra columns are ignored
//! - **Fail fast**: an empty or non-numeric modeled cell aborts the load with
//!   its line number and column, since a silently skipped row would change the fit
//! - **Separation of concerns**: no fitting logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use nalgebra::DMatrix;

use crate::domain::{
    FEATURE_COLUMNS, FEATURE_COUNT, Feature, FeatureStats, FeatureVector, HistoricalRecord, TARGET_COLUMNS,
    TARGET_COUNT,
};
use crate::error::{EstimatorError, Result};
use crate::math::{median, min_max};

/// The static historical table the model is trained on.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<HistoricalRecord>,
    source: Option<PathBuf>,
}

impl Dataset {
    /// Load a dataset from a CSV file.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mut dataset = Self::from_reader(file)?;
        dataset.source = Some(path.to_path_buf());
        tracing::debug!(path = %path.display(), rows = dataset.len(), "loaded dataset");
        Ok(dataset)
    }

    /// Parse a dataset from any CSV byte stream.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let columns: Vec<&str> = FEATURE_COLUMNS.iter().chain(TARGET_COLUMNS.iter()).copied().collect();
        let rows = read_numeric_columns(reader, &columns)?;

        let records = rows
            .into_iter()
            .map(|row| {
                let mut features = [0.0; FEATURE_COUNT];
                let mut targets = [0.0; TARGET_COUNT];
                features.copy_from_slice(&row[..FEATURE_COUNT]);
                targets.copy_from_slice(&row[FEATURE_COUNT..]);
                HistoricalRecord { features, targets }
            })
            .collect();

        Ok(Self { records, source: None })
    }

    pub fn from_records(records: Vec<HistoricalRecord>) -> Self {
        Self { records, source: None }
    }

    pub fn records(&self) -> &[HistoricalRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// File the dataset was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// `n × 5` matrix of feature values.
    pub fn feature_matrix(&self) -> DMatrix<f64> {
        DMatrix::from_fn(self.records.len(), FEATURE_COUNT, |i, j| self.records[i].features[j])
    }

    /// `n × 4` matrix of target values.
    pub fn target_matrix(&self) -> DMatrix<f64> {
        DMatrix::from_fn(self.records.len(), TARGET_COUNT, |i, j| self.records[i].targets[j])
    }

    pub fn feature_column(&self, feature: Feature) -> Vec<f64> {
        let j = feature.index();
        self.records.iter().map(|r| r.features[j]).collect()
    }

    /// Per-feature min / max / median, in [`FEATURE_COLUMNS`] order.
    ///
    /// Only used to size presentation input ranges; training never reads these.
    pub fn feature_stats(&self) -> Result<[FeatureStats; FEATURE_COUNT]> {
        if self.is_empty() {
            return Err(EstimatorError::EmptyDataset);
        }
        let mut out = [FeatureStats { min: 0.0, max: 0.0, median: 0.0 }; FEATURE_COUNT];
        for feature in Feature::ALL {
            let column = self.feature_column(feature);
            let (min, max) = min_max(&column).ok_or(EstimatorError::EmptyDataset)?;
            let median = median(&column).ok_or(EstimatorError::EmptyDataset)?;
            out[feature.index()] = FeatureStats { min, max, median };
        }
        Ok(out)
    }
}

/// Read the five feature columns from a CSV (used for batch prediction input).
pub fn read_feature_rows<R: Read>(reader: R) -> Result<Vec<FeatureVector>> {
    read_numeric_columns(reader, &FEATURE_COLUMNS)?
        .iter()
        .map(|row| FeatureVector::from_slice(row))
        .collect()
}

/// Read the named columns, in the given order, as finite `f64`s.
fn read_numeric_columns<R: Read>(reader: R, columns: &[&str]) -> Result<Vec<Vec<f64>>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = reader.headers()?.clone();
    let header_map = build_header_map(&headers);

    let missing: Vec<String> = columns
        .iter()
        .filter(|c| !header_map.contains_key(**c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(EstimatorError::MissingColumns(missing));
    }
    let indices: Vec<usize> = columns.iter().map(|c| header_map[*c]).collect();

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header; CSV lines are 1-based.
        let line = idx + 2;
        let record = result?;

        let mut row = Vec::with_capacity(columns.len());
        for (&col, &name) in indices.iter().zip(columns) {
            let raw = record.get(col).unwrap_or("");
            row.push(parse_finite(raw).ok_or_else(|| EstimatorError::InvalidValue {
                line,
                column: name.to_string(),
                value: raw.to_string(),
            })?);
        }
        rows.push(row);
    }

    Ok(rows)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

fn parse_finite(s: &str) -> Option<f64> {
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}
