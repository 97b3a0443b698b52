//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the fixed dataset schema (`FEATURE_COLUMNS`, `TARGET_COLUMNS`)
//! - typed inputs and outputs (`FeatureVector`, `Prediction`)
//! - runtime configuration (`EstimatorConfig`)

pub mod types;

pub use types::*;
