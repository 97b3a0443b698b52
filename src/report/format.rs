//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (CLI and TUI share the value formatting)

use std::path::Path;

use crate::data::InputRanges;
use crate::domain::{Feature, FeatureVector, Prediction, Target};
use crate::models::FittedModel;

/// Presentation format for one predicted value.
///
/// `Task_Success_Rate` gets one decimal and a percent sign; the other targets
/// are shown as whole numbers. Values are shown as predicted, without clamping.
pub fn format_target_value(target: &str, value: f64) -> String {
    if target == Target::TaskSuccessRate.column() {
        format!("{value:.1}%")
    } else {
        format!("{value:.0}")
    }
}

/// Human label for a target column (falls back to the column name).
pub fn target_label(target: &str) -> &str {
    Target::from_column(target).map(Target::display_name).unwrap_or(target)
}

/// Format a prediction as an aligned two-column table.
pub fn format_prediction(prediction: &Prediction) -> String {
    let mut out = String::new();
    out.push_str("Predicted outcomes:\n");
    for (target, value) in prediction.iter() {
        out.push_str(&format!(
            "  {:<20} {:>10}\n",
            target_label(target),
            format_target_value(target, value)
        ));
    }
    out
}

/// Format the session inputs used for a prediction.
pub fn format_inputs(inputs: &FeatureVector) -> String {
    let mut out = String::new();
    out.push_str("Work session:\n");
    for feature in Feature::ALL {
        out.push_str(&format!("  {:<20} {:>10}\n", feature.display_name(), fmt_num(inputs.get(feature))));
    }
    out
}

/// Format the training summary (dataset size, standardization, coefficients, diagnostics).
pub fn format_training_summary(model: &FittedModel, source: Option<&Path>) -> String {
    let mut out = String::new();
    let diag = model.diagnostics();

    out.push_str("=== devest - Developer Outcome Estimator ===\n");
    if let Some(path) = source {
        out.push_str(&format!("Dataset: {}\n", path.display()));
    }
    out.push_str(&format!(
        "Rows: {} | features: {} | targets: {} | rank: {}\n",
        diag.n_rows,
        model.feature_names().len(),
        model.target_names().len(),
        diag.rank
    ));

    out.push_str("\nStandardization:\n");
    out.push_str(&format!("  {:<16} {:>12} {:>12}\n", "feature", "mean", "std"));
    out.push_str(&format!("  {:-<16} {:->12} {:->12}\n", "", "", ""));
    let scaler = model.scaler();
    for (j, name) in model.feature_names().iter().enumerate() {
        out.push_str(&format!(
            "  {:<16} {:>12.4} {:>12.4}\n",
            name,
            scaler.means()[j],
            scaler.stds()[j]
        ));
    }

    out.push_str("\nCoefficients (per standardized feature):\n");
    out.push_str(&format!("  {:<18}", "target"));
    for name in model.feature_names() {
        out.push_str(&format!(" {:>14}", name));
    }
    out.push_str(&format!(" {:>12} {:>8}\n", "intercept", "R²"));
    for (k, target) in model.target_names().iter().enumerate() {
        out.push_str(&format!("  {:<18}", target));
        for c in model.coefficients_for(k) {
            out.push_str(&format!(" {:>14.4}", c));
        }
        let r2 = diag.r_squared.get(k).copied().unwrap_or(f64::NAN);
        out.push_str(&format!(" {:>12.4} {:>8.4}\n", model.intercepts()[k], r2));
    }

    out.push_str(&format_fit_warnings(model));
    out
}

/// Degenerate-fit warnings, or an empty string for a healthy fit.
pub fn format_fit_warnings(model: &FittedModel) -> String {
    let warnings = &model.diagnostics().warnings;
    if warnings.is_empty() {
        return String::new();
    }
    let mut out = String::from("\nWarnings:\n");
    for w in warnings {
        out.push_str(&format!("  ! {w}\n"));
    }
    out
}

/// Format the derived input ranges.
pub fn format_input_ranges(ranges: &InputRanges) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<22} {:>10} {:>10} {:>10} {:>6}\n",
        "input", "min", "max", "default", "step"
    ));
    out.push_str(&format!("{:-<22} {:->10} {:->10} {:->10} {:->6}\n", "", "", "", "", ""));
    for feature in Feature::ALL {
        let r = ranges.get(feature);
        out.push_str(&format!(
            "{:<22} {:>10} {:>10} {:>10} {:>6}\n",
            feature.display_name(),
            fmt_num(r.min),
            fmt_num(r.max),
            fmt_num(r.default),
            fmt_num(r.step)
        ));
    }
    out.push_str("(AI usage hours is additionally capped at hours coding.)\n");
    out
}

fn fmt_num(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}
