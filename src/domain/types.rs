//! Shared domain types.
//!
//! The dataset schema is fixed: five feature columns and four target columns,
//! always in the order given by [`FEATURE_COLUMNS`] and [`TARGET_COLUMNS`].
//! Everything downstream (design matrices, coefficient rows, prediction output)
//! relies on that order.

use std::path::PathBuf;

use serde::Serialize;

use crate::error::{EstimatorError, Result};

/// Feature column names, in model order.
pub const FEATURE_COLUMNS: [&str; 5] = [
    "Hours_Coding",
    "Coffee_Intake",
    "Stress_Level",
    "AI_Usage_Hours",
    "Sleep_Hours",
];

/// Target column names, in model order.
pub const TARGET_COLUMNS: [&str; 4] = ["Lines_of_Code", "Bugs_Fixed", "Task_Success_Rate", "Commits"];

pub const FEATURE_COUNT: usize = FEATURE_COLUMNS.len();
pub const TARGET_COUNT: usize = TARGET_COLUMNS.len();

/// Dataset location used when neither `--data` nor `DEVEST_DATA` is set.
pub const DEFAULT_DATA_PATH: &str = "data/raw/AI_Developer_Performance_Extended_1000.csv";

/// Environment variable (also read from `.env`) naming the dataset CSV.
pub const DATA_ENV_VAR: &str = "DEVEST_DATA";

/// One input variable of the regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Feature {
    HoursCoding,
    CoffeeIntake,
    StressLevel,
    AiUsageHours,
    SleepHours,
}

impl Feature {
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::HoursCoding,
        Feature::CoffeeIntake,
        Feature::StressLevel,
        Feature::AiUsageHours,
        Feature::SleepHours,
    ];

    /// Position in [`FEATURE_COLUMNS`].
    pub fn index(self) -> usize {
        match self {
            Feature::HoursCoding => 0,
            Feature::CoffeeIntake => 1,
            Feature::StressLevel => 2,
            Feature::AiUsageHours => 3,
            Feature::SleepHours => 4,
        }
    }

    pub fn column(self) -> &'static str {
        FEATURE_COLUMNS[self.index()]
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Feature::HoursCoding => "Hours coding",
            Feature::CoffeeIntake => "Coffee intake (cups)",
            Feature::StressLevel => "Stress level",
            Feature::AiUsageHours => "AI usage hours",
            Feature::SleepHours => "Sleep hours",
        }
    }

    pub fn from_column(name: &str) -> Result<Self> {
        Feature::ALL
            .into_iter()
            .find(|f| f.column() == name)
            .ok_or_else(|| EstimatorError::UnknownColumn(name.to_string()))
    }
}

/// One output variable of the regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Target {
    LinesOfCode,
    BugsFixed,
    TaskSuccessRate,
    Commits,
}

impl Target {
    pub const ALL: [Target; TARGET_COUNT] = [
        Target::LinesOfCode,
        Target::BugsFixed,
        Target::TaskSuccessRate,
        Target::Commits,
    ];

    pub fn index(self) -> usize {
        match self {
            Target::LinesOfCode => 0,
            Target::BugsFixed => 1,
            Target::TaskSuccessRate => 2,
            Target::Commits => 3,
        }
    }

    pub fn column(self) -> &'static str {
        TARGET_COLUMNS[self.index()]
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Target::LinesOfCode => "Lines of code",
            Target::BugsFixed => "Bugs fixed",
            Target::TaskSuccessRate => "Task success rate",
            Target::Commits => "Commits",
        }
    }

    pub fn from_column(name: &str) -> Result<Self> {
        Target::ALL
            .into_iter()
            .find(|t| t.column() == name)
            .ok_or_else(|| EstimatorError::UnknownColumn(name.to_string()))
    }
}

/// A single work-session description, as entered by a user.
///
/// `ai_usage_hours <= hours_coding` is expected but only enforced by the
/// presentation layer (see [`crate::data::InputRanges::constrain`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector {
    #[serde(rename = "Hours_Coding")]
    pub hours_coding: f64,
    #[serde(rename = "Coffee_Intake")]
    pub coffee_intake: f64,
    #[serde(rename = "Stress_Level")]
    pub stress_level: f64,
    #[serde(rename = "AI_Usage_Hours")]
    pub ai_usage_hours: f64,
    #[serde(rename = "Sleep_Hours")]
    pub sleep_hours: f64,
}

impl FeatureVector {
    /// Values in [`FEATURE_COLUMNS`] order.
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.hours_coding,
            self.coffee_intake,
            self.stress_level,
            self.ai_usage_hours,
            self.sleep_hours,
        ]
    }

    /// Build from values in [`FEATURE_COLUMNS`] order.
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        if values.len() != FEATURE_COUNT {
            return Err(EstimatorError::DimensionMismatch {
                expected: FEATURE_COUNT,
                actual: values.len(),
            });
        }
        Ok(Self {
            hours_coding: values[0],
            coffee_intake: values[1],
            stress_level: values[2],
            ai_usage_hours: values[3],
            sleep_hours: values[4],
        })
    }

    pub fn get(&self, feature: Feature) -> f64 {
        match feature {
            Feature::HoursCoding => self.hours_coding,
            Feature::CoffeeIntake => self.coffee_intake,
            Feature::StressLevel => self.stress_level,
            Feature::AiUsageHours => self.ai_usage_hours,
            Feature::SleepHours => self.sleep_hours,
        }
    }

    pub fn set(&mut self, feature: Feature, value: f64) {
        match feature {
            Feature::HoursCoding => self.hours_coding = value,
            Feature::CoffeeIntake => self.coffee_intake = value,
            Feature::StressLevel => self.stress_level = value,
            Feature::AiUsageHours => self.ai_usage_hours = value,
            Feature::SleepHours => self.sleep_hours = value,
        }
    }
}

/// One row of the historical dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoricalRecord {
    pub features: [f64; FEATURE_COUNT],
    pub targets: [f64; TARGET_COUNT],
}

/// A single predicted outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetValue {
    pub target: String,
    pub value: f64,
}

/// Predicted outcomes for one feature vector, in the model's recorded target order.
///
/// Values are raw regression outputs. They are not clamped, so e.g. a task
/// success rate can fall outside `[0, 100]` for unusual inputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub values: Vec<TargetValue>,
}

impl Prediction {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Look up a value by exact target column name.
    pub fn get(&self, target: &str) -> Option<f64> {
        self.values.iter().find(|v| v.target == target).map(|v| v.value)
    }

    pub fn value(&self, target: Target) -> Option<f64> {
        self.get(target.column())
    }

    pub fn target_names(&self) -> Vec<&str> {
        self.values.iter().map(|v| v.target.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|v| (v.target.as_str(), v.value))
    }
}

/// Summary statistics for one feature column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureStats {
    pub min: f64,
    pub max: f64,
    pub median: f64,
}

/// Runtime configuration resolved from CLI flags, `.env`, and defaults.
#[derive(Debug, Clone)]
pub struct EstimatorConfig {
    pub data_path: PathBuf,
    /// Whether `data_path` came from an explicit flag or environment variable.
    pub data_path_explicit: bool,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            data_path_explicit: false,
        }
    }
}
