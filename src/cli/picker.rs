//! Interactive dataset picker.
//!
//! Used when the configured dataset path does not exist: we list CSV files
//! under the working directory whose header carries every modeled column and
//! let the user choose one.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::domain::{FEATURE_COLUMNS, TARGET_COLUMNS};
use crate::error::AppError;

/// Default directory recursion depth for finding CSV files.
const DEFAULT_SEARCH_DEPTH: usize = 4;

/// Prompt the user to select a dataset CSV from the current directory tree.
///
/// Behavior:
/// - list discovered CSVs with the dataset schema
/// - accept either a number (from the list) or an explicit path
/// - `q` cancels
pub fn prompt_for_dataset(missing: &Path) -> Result<PathBuf, AppError> {
    let files = discover_dataset_files(Path::new("."));
    if files.is_empty() {
        return Err(AppError::new(
            2,
            format!(
                "Dataset not found: {}. Pass one with `devest --data <file.csv>` or create one with `devest synth --out <file.csv>`.",
                missing.display()
            ),
        ));
    }

    println!("Dataset {} not found. Found {} candidate CSV file(s):", missing.display(), files.len());
    for (idx, path) in files.iter().enumerate() {
        println!("{:>3}) {}", idx + 1, pretty_path(path));
    }

    loop {
        print!("Select a file by number (1-{}) or type a path (q to quit): ", files.len());
        io::stdout()
            .flush()
            .map_err(|e| AppError::new(2, format!("Failed to write prompt: {e}")))?;

        let mut input = String::new();
        let bytes = io::stdin()
            .read_line(&mut input)
            .map_err(|e| AppError::new(2, format!("Failed to read input: {e}")))?;
        if bytes == 0 {
            return Err(AppError::new(2, "No input received. Provide a dataset with `devest --data <file.csv>`."));
        }

        let input = input.trim();
        if input.eq_ignore_ascii_case("q") {
            return Err(AppError::new(2, "Canceled."));
        }

        if let Ok(choice) = input.parse::<usize>() {
            if (1..=files.len()).contains(&choice) {
                return validate_csv_path(&files[choice - 1]);
            }
            println!("Invalid choice: {choice}. Enter a number between 1 and {}.", files.len());
            continue;
        }

        match validate_csv_path(Path::new(input)) {
            Ok(path) => return Ok(path),
            Err(err) => println!("{err}"),
        }
    }
}

/// Validate the provided path points to an existing `.csv` file.
pub fn validate_csv_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.exists() {
        return Err(AppError::new(2, format!("CSV file not found: {}", path.display())));
    }
    if path.is_dir() {
        return Err(AppError::new(
            2,
            format!("Expected a file, got a directory: {}", path.display()),
        ));
    }
    if !is_csv(path) {
        return Err(AppError::new(2, format!("Expected a .csv file (got: {}).", path.display())));
    }
    Ok(path.to_path_buf())
}

/// CSV files under `root` whose header contains all nine modeled columns (deterministic order).
pub fn discover_dataset_files(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    find_csv_files(root, 0, DEFAULT_SEARCH_DEPTH, &mut out);
    out.retain(|p| has_dataset_header(p));
    out.sort_by_key(|p| pretty_path(p));
    out
}

fn has_dataset_header(path: &Path) -> bool {
    let Ok(file) = File::open(path) else {
        return false;
    };
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);
    let Ok(headers) = reader.headers() else {
        return false;
    };
    let names: Vec<&str> = headers.iter().map(|h| h.trim_start_matches('\u{feff}')).collect();
    FEATURE_COLUMNS
        .iter()
        .chain(TARGET_COLUMNS.iter())
        .all(|col| names.contains(col))
}

fn find_csv_files(root: &Path, depth: usize, max_depth: usize, out: &mut Vec<PathBuf>) {
    if depth > max_depth {
        return;
    }
    let Ok(entries) = fs::read_dir(root) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            if !should_skip_dir(&path) {
                find_csv_files(&path, depth + 1, max_depth, out);
            }
        } else if file_type.is_file() && is_csv(&path) {
            out.push(path);
        }
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        == Some(true)
}

fn should_skip_dir(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    matches!(name, ".git" | "target" | "node_modules")
}

fn pretty_path(path: &Path) -> String {
    let stripped = path.strip_prefix("./").unwrap_or(path);
    stripped.display().to_string()
}
