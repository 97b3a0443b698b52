//! Command-line parsing for the developer outcome estimator.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{Feature, FeatureVector};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "devest", version, about = "Developer productivity outcome estimator (linear regression)")]
pub struct Cli {
    /// Historical dataset CSV (overrides DEVEST_DATA).
    #[arg(short = 'f', long = "data", value_name = "CSV", global = true)]
    pub data: Option<PathBuf>,

    /// Enable debug logging on stderr (otherwise RUST_LOG, default warn).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Predict outcomes for one work session.
    Predict(PredictArgs),
    /// Predict outcomes for every row of a CSV of work sessions.
    Batch(BatchArgs),
    /// Train on the dataset and print coefficients and fit diagnostics.
    Train,
    /// Print the input ranges derived from the dataset.
    Ranges,
    /// Write a synthetic dataset in the historical schema.
    Synth(SynthArgs),
    /// Launch the interactive TUI.
    Tui,
}

/// Work-session inputs. Omitted values default to the dataset medians.
#[derive(Debug, Args, Clone)]
pub struct PredictArgs {
    /// Hours spent coding.
    #[arg(long)]
    pub hours_coding: Option<f64>,

    /// Cups of coffee.
    #[arg(long)]
    pub coffee_intake: Option<f64>,

    /// Stress level (1-100).
    #[arg(long)]
    pub stress_level: Option<f64>,

    /// Hours using AI tools (must not exceed hours coding).
    #[arg(long)]
    pub ai_usage_hours: Option<f64>,

    /// Hours slept.
    #[arg(long)]
    pub sleep_hours: Option<f64>,

    /// Also write the prediction (inputs + outcomes + fit diagnostics) to JSON.
    #[arg(long, value_name = "JSON")]
    pub json: Option<PathBuf>,
}

impl PredictArgs {
    /// Overlay explicitly provided values onto `defaults`.
    pub fn apply_to(&self, defaults: FeatureVector) -> FeatureVector {
        let mut v = defaults;
        let given = [
            (Feature::HoursCoding, self.hours_coding),
            (Feature::CoffeeIntake, self.coffee_intake),
            (Feature::StressLevel, self.stress_level),
            (Feature::AiUsageHours, self.ai_usage_hours),
            (Feature::SleepHours, self.sleep_hours),
        ];
        for (feature, value) in given {
            if let Some(value) = value {
                v.set(feature, value);
            }
        }
        v
    }

    /// Whether the caller supplied AI usage explicitly.
    pub fn has_explicit_ai_usage(&self) -> bool {
        self.ai_usage_hours.is_some()
    }
}

#[derive(Debug, Args, Clone)]
pub struct BatchArgs {
    /// CSV with the five feature columns.
    #[arg(long, value_name = "CSV")]
    pub input: PathBuf,

    /// Where to write inputs plus predicted outcomes.
    #[arg(long, value_name = "CSV")]
    pub output: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct SynthArgs {
    /// Number of rows to generate.
    #[arg(short = 'n', long, default_value_t = 1000)]
    pub rows: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Noise multiplier (0 gives an exactly linear dataset).
    #[arg(long, default_value_t = 1.0)]
    pub noise: f64,

    /// Output CSV path.
    #[arg(long, value_name = "CSV")]
    pub out: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_flags_parse() {
        let cli = Cli::try_parse_from([
            "devest",
            "predict",
            "--hours-coding",
            "6",
            "--ai-usage-hours",
            "2.5",
            "--json",
            "out.json",
        ])
        .unwrap();
        let Command::Predict(args) = cli.command else {
            panic!("expected predict");
        };
        assert_eq!(args.hours_coding, Some(6.0));
        assert_eq!(args.ai_usage_hours, Some(2.5));
        assert!(args.coffee_intake.is_none());
        assert_eq!(args.json, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn data_flag_is_global() {
        let cli = Cli::try_parse_from(["devest", "train", "--data", "x.csv"]).unwrap();
        assert_eq!(cli.data, Some(PathBuf::from("x.csv")));
        assert!(matches!(cli.command, Command::Train));
    }

    #[test]
    fn explicit_values_override_defaults() {
        let args = PredictArgs {
            hours_coding: Some(9.0),
            coffee_intake: None,
            stress_level: Some(20.0),
            ai_usage_hours: None,
            sleep_hours: None,
            json: None,
        };
        let defaults = FeatureVector {
            hours_coding: 5.0,
            coffee_intake: 2.0,
            stress_level: 50.0,
            ai_usage_hours: 1.0,
            sleep_hours: 7.0,
        };
        let v = args.apply_to(defaults);
        assert_eq!(v.to_array(), [9.0, 2.0, 20.0, 1.0, 7.0]);
        assert!(!args.has_explicit_ai_usage());
    }
}
