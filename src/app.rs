//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves the dataset path (flag, `.env`/environment, default, picker)
//! - trains the shared model once
//! - prints predictions and reports
//! - writes optional exports

use std::fs::File;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{BatchArgs, Command, PredictArgs, SynthArgs};
use crate::data::{InputRanges, SyntheticConfig, ai_usage_within_coding, generate_dataset, read_feature_rows};
use crate::domain::{EstimatorConfig, FeatureVector};
use crate::error::AppError;

pub mod pipeline;

use pipeline::Session;

/// Entry point for the `devest` binary.
pub fn run() -> Result<(), AppError> {
    // `devest` and `devest --data x.csv` behave like `devest tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    // The TUI owns the terminal; log lines on stderr would corrupt the screen.
    if !matches!(cli.command, Command::Tui) {
        init_logging(cli.verbose);
    }

    let mut config = pipeline::resolve_config(cli.data);
    tracing::debug!(path = %config.data_path.display(), explicit = config.data_path_explicit, "resolved dataset path");

    if offers_picker(&cli.command) {
        pipeline::ensure_dataset_path(&mut config)?;
    }

    match cli.command {
        Command::Predict(args) => handle_predict(config, &args),
        Command::Batch(args) => handle_batch(config, &args),
        Command::Train => handle_train(config),
        Command::Ranges => handle_ranges(config),
        Command::Synth(args) => handle_synth(&args),
        Command::Tui => crate::tui::run(config),
    }
}

/// Only the interactive front end prompts for a dataset; the other commands
/// write to stdout and fail with the load error instead.
fn offers_picker(command: &Command) -> bool {
    matches!(command, Command::Tui)
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // A second init (e.g. in tests) is harmless; keep the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_predict(config: EstimatorConfig, args: &PredictArgs) -> Result<(), AppError> {
    let session = pipeline::prepare_session(config)?;
    predict_with(&session, args)
}

/// Session inputs for `predict`: dataset defaults overlaid with the given flags.
///
/// An omitted AI usage is capped at hours coding; an explicit one above it is rejected.
fn resolve_inputs(ranges: &InputRanges, args: &PredictArgs) -> Result<FeatureVector, AppError> {
    let mut inputs = args.apply_to(ranges.defaults());
    if !args.has_explicit_ai_usage() {
        // The median AI usage may exceed a small explicit hours value.
        inputs.ai_usage_hours = inputs.ai_usage_hours.min(inputs.hours_coding);
    }
    if !ai_usage_within_coding(&inputs) {
        return Err(AppError::new(
            3,
            format!(
                "AI usage hours ({}) cannot exceed hours coding ({}).",
                inputs.ai_usage_hours, inputs.hours_coding
            ),
        ));
    }
    Ok(inputs)
}

fn predict_with(session: &Session, args: &PredictArgs) -> Result<(), AppError> {
    let model = session.model();
    let inputs = resolve_inputs(&session.ranges, args)?;
    let prediction = model.predict_features(&inputs)?;

    println!("{}", crate::report::format_inputs(&inputs));
    print!("{}", crate::report::format_prediction(&prediction));
    print!("{}", crate::report::format_fit_warnings(&model));

    if let Some(path) = &args.json {
        crate::io::write_prediction_json(
            path,
            &inputs,
            &prediction,
            model.diagnostics(),
            session.dataset.source(),
        )?;
        tracing::info!(path = %path.display(), "wrote prediction JSON");
    }
    Ok(())
}

fn handle_batch(config: EstimatorConfig, args: &BatchArgs) -> Result<(), AppError> {
    let session = pipeline::prepare_session(config)?;
    batch_with(&session, args)
}

fn batch_with(session: &Session, args: &BatchArgs) -> Result<(), AppError> {
    let model = session.model();

    let file = File::open(&args.input).map_err(|e| {
        AppError::new(2, format!("Failed to open input CSV '{}': {e}", args.input.display()))
    })?;
    let rows = read_feature_rows(file)?;

    let over = rows.iter().filter(|r| !ai_usage_within_coding(r)).count();
    if over > 0 {
        tracing::warn!(rows = over, "batch rows have AI usage above hours coding; predicting as given");
    }

    let predictions = model.predict_batch(&rows)?;
    crate::io::write_predictions_csv(&args.output, &rows, &predictions)?;
    println!("Wrote {} predictions to {}", predictions.len(), args.output.display());
    Ok(())
}

fn handle_train(config: EstimatorConfig) -> Result<(), AppError> {
    let session = pipeline::prepare_session(config)?;
    let model = session.model();
    print!(
        "{}",
        crate::report::format_training_summary(&model, session.dataset.source())
    );
    Ok(())
}

fn handle_ranges(config: EstimatorConfig) -> Result<(), AppError> {
    let session = pipeline::prepare_session(config)?;
    print!("{}", crate::report::format_input_ranges(&session.ranges));
    Ok(())
}

fn handle_synth(args: &SynthArgs) -> Result<(), AppError> {
    if !args.noise.is_finite() || args.noise < 0.0 {
        return Err(AppError::new(3, format!("Noise multiplier must be >= 0 (got {}).", args.noise)));
    }
    let dataset = generate_dataset(&SyntheticConfig {
        rows: args.rows,
        seed: args.seed,
        noise_scale: args.noise,
    })?;
    crate::io::write_dataset_csv(&args.out, &dataset)?;
    println!("Wrote {} synthetic rows to {}", dataset.len(), args.out.display());
    Ok(())
}

const SUBCOMMANDS: [&str; 6] = ["predict", "batch", "train", "ranges", "synth", "tui"];

/// Rewrite argv so `devest` defaults to `devest tui`.
///
/// Rules:
/// - `devest`                       -> `devest tui`
/// - `devest --data x.csv`          -> `devest tui --data x.csv`
/// - `devest -v --data x.csv train` -> unchanged (global flags before a subcommand)
/// - `devest --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    if names_subcommand(&argv[1..]) {
        return argv;
    }

    // Only flags and no subcommand: treat them as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}

/// Whether any token is a subcommand name. The value of `-f`/`--data` is skipped.
fn names_subcommand(args: &[String]) -> bool {
    let mut tokens = args.iter();
    while let Some(token) = tokens.next() {
        if token == "-f" || token == "--data" {
            tokens.next();
            continue;
        }
        if SUBCOMMANDS.contains(&token.as_str()) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::domain::{FEATURE_COLUMNS, TARGET_COLUMNS};
    use crate::models::ModelHandle;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_opens_tui() {
        assert_eq!(rewrite_args(args(&["devest"])), args(&["devest", "tui"]));
    }

    #[test]
    fn leading_flags_go_to_tui() {
        assert_eq!(
            rewrite_args(args(&["devest", "--data", "x.csv"])),
            args(&["devest", "tui", "--data", "x.csv"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        for list in [
            &["devest", "predict", "--hours-coding", "5"][..],
            &["devest", "--help"][..],
            &["devest", "synth", "--out", "x.csv"][..],
        ] {
            assert_eq!(rewrite_args(args(list)), args(list));
        }
    }

    #[test]
    fn rewritten_args_parse() {
        let cli = crate::cli::Cli::try_parse_from(rewrite_args(args(&["devest", "-f", "d.csv"]))).unwrap();
        assert!(matches!(cli.command, Command::Tui));
        assert_eq!(cli.data.unwrap().to_str(), Some("d.csv"));
    }

    #[test]
    fn global_flags_before_a_subcommand_are_kept() {
        for (list, expect_data) in [
            (&["devest", "--data", "x.csv", "predict"][..], Some("x.csv")),
            (&["devest", "-v", "train"][..], None),
            (&["devest", "-v", "ranges", "--data", "s.csv"][..], Some("s.csv")),
            (&["devest", "-f", "x.csv", "-v", "batch", "--input", "i.csv", "--output", "o.csv"][..], Some("x.csv")),
        ] {
            let argv = rewrite_args(args(list));
            assert_eq!(argv, args(list));
            let cli = crate::cli::Cli::try_parse_from(argv).unwrap();
            assert!(!matches!(cli.command, Command::Tui));
            assert_eq!(cli.data.as_deref().and_then(Path::to_str), expect_data);
        }
    }

    #[test]
    fn only_the_tui_offers_the_picker() {
        let parse = |list: &[&str]| crate::cli::Cli::try_parse_from(rewrite_args(args(list))).unwrap().command;
        assert!(offers_picker(&parse(&["devest"])));
        assert!(offers_picker(&parse(&["devest", "--data", "x.csv"])));
        for list in [
            &["devest", "predict"][..],
            &["devest", "train"][..],
            &["devest", "ranges"][..],
            &["devest", "batch", "--input", "i.csv", "--output", "o.csv"][..],
        ] {
            assert!(!offers_picker(&parse(list)), "{list:?}");
        }
    }

    #[test]
    fn data_value_named_like_a_subcommand_still_opens_tui() {
        let argv = rewrite_args(args(&["devest", "--data", "predict"]));
        assert_eq!(argv, args(&["devest", "tui", "--data", "predict"]));
        let cli = crate::cli::Cli::try_parse_from(argv).unwrap();
        assert!(matches!(cli.command, Command::Tui));
    }

    fn session_in(dir: &Path) -> Session {
        let path = dir.join("history.csv");
        let ds = generate_dataset(&SyntheticConfig { rows: 80, seed: 9, noise_scale: 1.0 }).unwrap();
        crate::io::write_dataset_csv(&path, &ds).unwrap();

        let config = EstimatorConfig { data_path: path, data_path_explicit: true };
        let dataset = pipeline::load_dataset(&config).unwrap();
        let ranges = InputRanges::from_dataset(&dataset).unwrap();
        let model = crate::fit::train(&dataset).unwrap();
        let handle: &'static ModelHandle = Box::leak(Box::new(ModelHandle::new(model)));
        Session { config, dataset, ranges, handle }
    }

    fn predict_args(hours: Option<f64>, ai: Option<f64>) -> PredictArgs {
        PredictArgs {
            hours_coding: hours,
            coffee_intake: None,
            stress_level: None,
            ai_usage_hours: ai,
            sleep_hours: None,
            json: None,
        }
    }

    #[test]
    fn predict_rejects_ai_usage_above_hours_coding() {
        let dir = tempfile::tempdir().unwrap();
        let session = session_in(dir.path());
        let err = predict_with(&session, &predict_args(Some(2.0), Some(5.0))).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("cannot exceed hours coding"));
    }

    #[test]
    fn omitted_ai_usage_is_capped_at_hours_coding() {
        let dir = tempfile::tempdir().unwrap();
        let session = session_in(dir.path());
        let default_ai = session.ranges.defaults().ai_usage_hours;

        let inputs = resolve_inputs(&session.ranges, &predict_args(Some(0.5), None)).unwrap();
        assert_eq!(inputs.hours_coding, 0.5);
        assert_eq!(inputs.ai_usage_hours, default_ai.min(0.5));

        let inputs = resolve_inputs(&session.ranges, &predict_args(Some(12.0), None)).unwrap();
        assert_eq!(inputs.ai_usage_hours, default_ai);
    }

    #[test]
    fn predict_writes_json_report() {
        let dir = tempfile::tempdir().unwrap();
        let session = session_in(dir.path());
        let json = dir.path().join("prediction.json");
        let mut args = predict_args(Some(6.0), Some(2.0));
        args.json = Some(json.clone());

        predict_with(&session, &args).unwrap();
        let doc: serde_json::Value = serde_json::from_reader(File::open(&json).unwrap()).unwrap();
        assert_eq!(doc["inputs"]["Hours_Coding"], 6.0);
        assert_eq!(doc["prediction"]["values"].as_array().map(Vec::len), Some(4));
    }

    #[test]
    fn batch_writes_one_row_per_input() {
        let dir = tempfile::tempdir().unwrap();
        let session = session_in(dir.path());
        let input = dir.path().join("sessions.csv");
        let output = dir.path().join("predicted.csv");
        std::fs::write(
            &input,
            format!(
                "{}\n6,2,40,1.5,7\n9,4,70,3,6\n2,0,10,5,8\n",
                FEATURE_COLUMNS.join(",")
            ),
        )
        .unwrap();

        batch_with(&session, &BatchArgs { input, output: output.clone() }).unwrap();

        let mut reader = csv::Reader::from_path(&output).unwrap();
        let header: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        let expected: Vec<String> = FEATURE_COLUMNS
            .iter()
            .chain(TARGET_COLUMNS.iter())
            .map(|c| c.to_string())
            .collect();
        assert_eq!(header, expected);

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        // Predictions match the single-row path.
        let single = session
            .model()
            .predict(&[9.0, 4.0, 70.0, 3.0, 6.0])
            .unwrap();
        let loc: f64 = rows[1][FEATURE_COLUMNS.len()].parse().unwrap();
        assert!((loc - single.values[0].value).abs() < 1e-3);
    }

    #[test]
    fn batch_with_missing_input_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let session = session_in(dir.path());
        let err = batch_with(
            &session,
            &BatchArgs {
                input: dir.path().join("absent.csv"),
                output: dir.path().join("out.csv"),
            },
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn synth_rejects_negative_noise() {
        let dir = tempfile::tempdir().unwrap();
        let err = handle_synth(&SynthArgs {
            rows: 10,
            seed: 1,
            noise: -1.0,
            out: dir.path().join("x.csv"),
        })
        .unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn synth_writes_loadable_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("synthetic.csv");
        handle_synth(&SynthArgs { rows: 25, seed: 3, noise: 1.0, out: out.clone() }).unwrap();
        let ds = crate::data::Dataset::load(&out).unwrap();
        assert_eq!(ds.len(), 25);
    }
}
