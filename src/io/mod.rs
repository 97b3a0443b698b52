//! Output helpers.
//!
//! - prediction JSON, batch prediction CSV, dataset CSV (`export`)
//!
//! Dataset input lives in `crate::data`.

pub mod export;

pub use export::*;
