//! Fitted model state and prediction.
//!
//! - `scaler`: training-set standardization
//! - `model`: the immutable fitted model and its predictor
//! - `registry`: once-per-process initialization and atomic replacement

pub mod model;
pub mod registry;
pub mod scaler;

pub use model::*;
pub use registry::{LazyModel, ModelHandle, SHARED_MODEL};
pub use scaler::*;
