//! Reporting utilities: formatted terminal output for predictions and training.

pub mod format;

pub use format::*;
