//! Command-line parsing for the fuzzy PBI estimator.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the inference code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::calibrate::CalibrationOverrides;
use crate::domain::{Method, MethodSpec};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "pbi", version, about = "Fuzzy (Sugeno/Mamdani) PBI participant estimator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Predict every month of a dataset, score against actuals, compare with a linear baseline.
    Run(RunArgs),
    /// Predict a single (BPBI, Jamkesda) point and show the intermediate memberships.
    Predict(PredictArgs),
    /// Derive breakpoints and consequents from the min/max of a dataset.
    Calibrate(CalibrateArgs),
}

/// Calibration flags shared by `run` and `predict`.
#[derive(Debug, Args, Clone, Default)]
pub struct CalibrationArgs {
    /// Calibration JSON (as written by `pbi calibrate --output`).
    #[arg(long, value_name = "JSON", env = "PBI_CALIBRATION")]
    pub calibration: Option<PathBuf>,

    /// BPBI value at or below which BPBI is fully "low".
    #[arg(long, env = "PBI_BPBI_LOW")]
    pub bpbi_low: Option<f64>,

    /// BPBI value at or above which BPBI is fully "high".
    #[arg(long, env = "PBI_BPBI_HIGH")]
    pub bpbi_high: Option<f64>,

    /// Jamkesda value at or below which Jamkesda is fully "low".
    #[arg(long, env = "PBI_JAMKESDA_LOW")]
    pub jamkesda_low: Option<f64>,

    /// Jamkesda value at or above which Jamkesda is fully "high".
    #[arg(long, env = "PBI_JAMKESDA_HIGH")]
    pub jamkesda_high: Option<f64>,

    /// Crisp PBI output of the "low" term.
    #[arg(long, env = "PBI_CONSEQUENT_LOW")]
    pub consequent_low: Option<f64>,

    /// Crisp PBI output of the "high" term.
    #[arg(long, env = "PBI_CONSEQUENT_HIGH")]
    pub consequent_high: Option<f64>,
}

impl CalibrationArgs {
    pub fn overrides(&self) -> CalibrationOverrides {
        CalibrationOverrides {
            bpbi_low: self.bpbi_low,
            bpbi_high: self.bpbi_high,
            jamkesda_low: self.jamkesda_low,
            jamkesda_high: self.jamkesda_high,
            consequent_low: self.consequent_low,
            consequent_high: self.consequent_high,
        }
    }
}

/// Options for a batch run.
#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    /// Monthly CSV with `bpbi`, `jamkesda` and optionally `bulan` and `pbi_asli` columns.
    /// Uses the built-in reference year when omitted.
    #[arg(short = 'i', long, value_name = "CSV")]
    pub input: Option<PathBuf>,

    /// Defuzzification method(s) to evaluate.
    #[arg(short = 'm', long, value_enum, default_value_t = MethodSpec::Sugeno)]
    pub method: MethodSpec,

    #[command(flatten)]
    pub calibration: CalibrationArgs,

    /// Skip the linear regression baseline.
    #[arg(long)]
    pub no_baseline: bool,

    /// Export per-row results to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the full run (calibration, summaries, rows) to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

/// Options for a single prediction.
#[derive(Debug, Parser, Clone)]
pub struct PredictArgs {
    /// BPBI participant count.
    #[arg(long)]
    pub bpbi: f64,

    /// Jamkesda participant count.
    #[arg(long)]
    pub jamkesda: f64,

    /// Defuzzification method.
    #[arg(short = 'm', long, value_enum, default_value_t = Method::Sugeno)]
    pub method: Method,

    #[command(flatten)]
    pub calibration: CalibrationArgs,
}

/// Options for deriving a calibration.
#[derive(Debug, Parser, Clone)]
pub struct CalibrateArgs {
    /// Monthly CSV; uses the built-in reference year when omitted.
    #[arg(short = 'i', long, value_name = "CSV")]
    pub input: Option<PathBuf>,

    /// Write the derived calibration to this JSON file.
    #[arg(short = 'o', long, value_name = "JSON")]
    pub output: Option<PathBuf>,
}
