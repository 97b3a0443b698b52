//! Data access: the historical CSV, derived input ranges, and synthetic data.

pub mod dataset;
pub mod ranges;
pub mod synthetic;

pub use dataset::{Dataset, read_feature_rows};
pub use ranges::{InputRange, InputRanges, ai_usage_within_coding};
pub use synthetic::{SyntheticConfig, generate_dataset};
