//! Model training.
//!
//! Responsibilities:
//!
//! - standardize the historical feature matrix
//! - solve the multi-output least-squares problem
//! - flag degenerate fits (too few rows, rank deficiency, constant features)

pub mod trainer;

pub use trainer::*;
