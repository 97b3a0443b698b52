//! Presentation input ranges derived from dataset statistics.
//!
//! These bounds size the interactive inputs (TUI fields, CLI defaults). They
//! are computed once from the dataset and passed explicitly to whichever front
//! end needs them. The model itself never consults them.

use serde::Serialize;

use crate::data::Dataset;
use crate::domain::{FEATURE_COUNT, Feature, FeatureStats, FeatureVector};
use crate::error::Result;

/// Upper bound for the coffee input (cups); the dataset max is not used here.
pub const COFFEE_MAX: f64 = 1000.0;
/// Stress is always entered on a fixed 1–100 scale.
pub const STRESS_MIN: f64 = 1.0;
pub const STRESS_MAX: f64 = 100.0;

/// Bounds, default, and step size for one feature input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InputRange {
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub step: f64,
    /// Whether the input only takes whole numbers.
    pub integer: bool,
}

impl InputRange {
    /// Clamp into `[min, max]` (rounding for integer inputs).
    pub fn clamp(&self, value: f64) -> f64 {
        let v = if self.integer { value.round() } else { value };
        v.max(self.min).min(self.max)
    }

    /// Move `steps` increments away from `value`, staying in range.
    pub fn step_from(&self, value: f64, steps: i32) -> f64 {
        self.clamp(value + self.step * steps as f64)
    }
}

/// Input ranges for all five features.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputRanges {
    ranges: [InputRange; FEATURE_COUNT],
}

impl InputRanges {
    pub fn from_dataset(dataset: &Dataset) -> Result<Self> {
        Ok(Self::from_stats(&dataset.feature_stats()?))
    }

    pub fn from_stats(stats: &[FeatureStats; FEATURE_COUNT]) -> Self {
        let continuous = |f: Feature, step: f64| {
            let s = stats[f.index()];
            InputRange {
                min: s.min,
                max: s.max,
                default: s.median,
                step,
                integer: false,
            }
        };

        let coffee = stats[Feature::CoffeeIntake.index()];
        let coffee_min = coffee.min.floor();
        let stress = stats[Feature::StressLevel.index()];

        let ranges = [
            continuous(Feature::HoursCoding, 0.5),
            InputRange {
                min: coffee_min,
                max: COFFEE_MAX.max(coffee_min),
                default: coffee.median.trunc().max(coffee_min),
                step: 1.0,
                integer: true,
            },
            InputRange {
                min: STRESS_MIN,
                max: STRESS_MAX,
                default: stress.median.min(STRESS_MAX).max(STRESS_MIN).trunc(),
                step: 1.0,
                integer: true,
            },
            continuous(Feature::AiUsageHours, 0.25),
            continuous(Feature::SleepHours, 0.25),
        ];

        Self { ranges }
    }

    /// Static bounds for a feature, ignoring other inputs.
    pub fn get(&self, feature: Feature) -> InputRange {
        self.ranges[feature.index()]
    }

    /// Bounds for a feature given the rest of the session.
    ///
    /// AI usage can never exceed the hours spent coding, so its maximum (and
    /// its minimum and default, if needed) are capped at `hours_coding`.
    pub fn effective(&self, feature: Feature, current: &FeatureVector) -> InputRange {
        let mut range = self.get(feature);
        if feature == Feature::AiUsageHours {
            let cap = current.hours_coding;
            range.max = cap;
            range.min = range.min.min(cap);
            range.default = range.default.min(cap);
        }
        range
    }

    /// The default session: every input at its default, then constrained.
    pub fn defaults(&self) -> FeatureVector {
        let mut v = FeatureVector {
            hours_coding: 0.0,
            coffee_intake: 0.0,
            stress_level: 0.0,
            ai_usage_hours: 0.0,
            sleep_hours: 0.0,
        };
        for feature in Feature::ALL {
            v.set(feature, self.get(feature).default);
        }
        self.constrain(v)
    }

    /// Clamp every input into range, hours coding first so AI usage is capped by it.
    pub fn constrain(&self, mut v: FeatureVector) -> FeatureVector {
        for feature in Feature::ALL {
            let range = self.effective(feature, &v);
            v.set(feature, range.clamp(v.get(feature)));
        }
        v
    }

    /// Move one feature by `steps` increments and re-apply all constraints.
    pub fn step(&self, v: FeatureVector, feature: Feature, steps: i32) -> FeatureVector {
        let mut next = v;
        let range = self.effective(feature, &v);
        next.set(feature, range.step_from(v.get(feature), steps));
        self.constrain(next)
    }
}

/// Whether the session respects `AI_Usage_Hours <= Hours_Coding`.
pub fn ai_usage_within_coding(v: &FeatureVector) -> bool {
    v.ai_usage_hours <= v.hours_coding
}
