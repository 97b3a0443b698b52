//! `dev-estimator` library crate.
//!
//! The binary (`devest`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the trainer and predictor can be embedded elsewhere
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
pub mod tui;
