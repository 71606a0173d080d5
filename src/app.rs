//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves the calibration (defaults < JSON file < flags/env)
//! - runs the batch pipeline or a single prediction
//! - prints reports
//! - writes optional exports

use clap::Parser;
use tracing::{debug, info};

use crate::calibrate::derive_calibration;
use crate::cli::{CalibrateArgs, CalibrationArgs, Command, PredictArgs, RunArgs};
use crate::domain::{Calibration, RunConfig};
use crate::error::AppError;
use crate::fuzzy::FuzzyPredictor;
use crate::io::ingest::{IngestedData, load_month_rows};

pub mod pipeline;

/// Entry point for the `pbi` binary.
pub fn run() -> Result<(), AppError> {
    // `pbi` and `pbi --input x.csv` behave like `pbi run ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Predict(args) => handle_predict(args),
        Command::Calibrate(args) => handle_calibrate(args),
    }
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args)?;
    let run = pipeline::run_batch(&config)?;

    println!("{}", crate::report::format_run_summary(&run));
    for method in config.method.methods() {
        println!("{}", crate::report::format_predictions(&run.predictions, method));
    }

    if let Some(path) = &config.export_results {
        crate::io::export::write_results_csv(path, &run)?;
        info!(path = %path.display(), "wrote results CSV");
    }
    if let Some(path) = &config.export_report {
        crate::io::export::write_report_json(path, &run)?;
        info!(path = %path.display(), "wrote report JSON");
    }

    Ok(())
}

fn handle_predict(args: PredictArgs) -> Result<(), AppError> {
    let calibration = resolve_calibration(&args.calibration)?;
    let predictor = FuzzyPredictor::new(calibration);
    let inference = predictor.explain(args.method, args.bpbi, args.jamkesda);

    println!(
        "{}",
        crate::report::format_inference(args.method, args.bpbi, args.jamkesda, &inference, &calibration.rules)
    );
    Ok(())
}

fn handle_calibrate(args: CalibrateArgs) -> Result<(), AppError> {
    let ingest = match &args.input {
        Some(path) => load_month_rows(path)?,
        None => IngestedData::from_rows("built-in reference year", crate::data::default_rows())?,
    };

    let calibration = derive_calibration(&ingest.rows)
        .map_err(|e| AppError::no_data(format!("Cannot derive calibration from {}: {e}", ingest.source)))?;

    println!("{}", crate::report::format_calibration(&calibration));

    if let Some(path) = &args.output {
        crate::io::calibration::write_calibration_json(path, &calibration)?;
        info!(path = %path.display(), "wrote calibration JSON");
    }
    Ok(())
}

/// Resolve defaults < calibration file < per-field overrides, then validate.
pub fn resolve_calibration(args: &CalibrationArgs) -> Result<Calibration, AppError> {
    let base = match &args.calibration {
        Some(path) => crate::io::calibration::read_calibration_json(path)?,
        None => Calibration::default(),
    };

    let overrides = args.overrides();
    if !overrides.is_empty() {
        debug!(?overrides, "applying calibration overrides");
    }
    let calibration = overrides.apply(base);
    calibration.validate().map_err(AppError::input)?;
    Ok(calibration)
}

pub fn run_config_from_args(args: &RunArgs) -> Result<RunConfig, AppError> {
    Ok(RunConfig {
        input: args.input.clone(),
        calibration: resolve_calibration(&args.calibration)?,
        method: args.method,
        baseline: !args.no_baseline,
        export_results: args.export.clone(),
        export_report: args.export_json.clone(),
    })
}

/// Rewrite argv so `pbi` defaults to `pbi run`.
///
/// Rules:
/// - `pbi`                      -> `pbi run`
/// - `pbi -i data.csv ...`      -> `pbi run -i data.csv ...`
/// - `pbi --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("run".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "run" | "predict" | "calibrate");
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "run".to_string());
        return argv;
    }

    argv
}
