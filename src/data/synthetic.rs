//! Synthetic dataset generation.
//!
//! Produces rows in the historical schema so the tool can be tried (and tested)
//! without the original CSV. Features are drawn in plausible ranges, targets are
//! a fixed linear function of the features plus optional Gaussian noise.
//! Generation is fully determined by the seed.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::data::Dataset;
use crate::domain::{FEATURE_COUNT, HistoricalRecord, TARGET_COUNT};
use crate::error::{EstimatorError, Result};

/// Intercept per target, in target column order.
pub const TRUE_INTERCEPTS: [f64; TARGET_COUNT] = [40.0, 0.5, 55.0, 1.0];

/// Raw-unit slope per (target, feature).
pub const TRUE_SLOPES: [[f64; FEATURE_COUNT]; TARGET_COUNT] = [
    [45.0, 6.0, -0.8, 25.0, 8.0],
    [0.6, 0.2, -0.02, 0.3, 0.1],
    [2.0, 0.5, -0.25, 1.5, 2.5],
    [0.8, 0.3, -0.01, 0.5, 0.1],
];

/// Noise standard deviation per target at `noise_scale = 1.0`.
const NOISE_STD: [f64; TARGET_COUNT] = [30.0, 1.0, 5.0, 1.0];

#[derive(Debug, Clone, Copy)]
pub struct SyntheticConfig {
    pub rows: usize,
    pub seed: u64,
    /// Multiplier on the per-target noise; `0.0` gives an exactly linear dataset.
    pub noise_scale: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            rows: 1000,
            seed: 42,
            noise_scale: 1.0,
        }
    }
}

/// Noise-free targets for a feature row.
pub fn true_targets(features: &[f64; FEATURE_COUNT]) -> [f64; TARGET_COUNT] {
    let mut out = TRUE_INTERCEPTS;
    for (k, slopes) in TRUE_SLOPES.iter().enumerate() {
        out[k] += slopes.iter().zip(features).map(|(b, x)| b * x).sum::<f64>();
    }
    out
}

pub fn generate_dataset(config: &SyntheticConfig) -> Result<Dataset> {
    if config.rows == 0 {
        return Err(EstimatorError::EmptyDataset);
    }
    if !(config.noise_scale.is_finite() && config.noise_scale >= 0.0) {
        return Err(EstimatorError::InvalidConfig(format!(
            "noise_scale must be a finite number >= 0 (got {})",
            config.noise_scale
        )));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| EstimatorError::InvalidConfig(format!("noise distribution: {e}")))?;

    let mut records = Vec::with_capacity(config.rows);
    for _ in 0..config.rows {
        let hours = round_to(rng.gen_range(0.5..=12.0), 0.25);
        let ai = round_to(rng.gen_range(0.0..=hours), 0.25).min(hours);
        let coffee = rng.gen_range(0..=8) as f64;
        let stress = rng.gen_range(1..=100) as f64;
        let sleep = round_to(rng.gen_range(3.0..=10.0), 0.25);

        let features = [hours, coffee, stress, ai, sleep];
        let mut targets = true_targets(&features);
        if config.noise_scale > 0.0 {
            for (k, t) in targets.iter_mut().enumerate() {
                let z: f64 = normal.sample(&mut rng);
                *t += z * NOISE_STD[k] * config.noise_scale;
            }
        }

        records.push(HistoricalRecord { features, targets });
    }

    tracing::debug!(rows = config.rows, seed = config.seed, "generated synthetic dataset");
    Ok(Dataset::from_records(records))
}

fn round_to(value: f64, step: f64) -> f64 {
    (value / step).round() * step
}
