//! Export batch results to CSV and JSON.
//!
//! The CSV is meant to be easy to consume in spreadsheets or downstream scripts;
//! the JSON report carries the full run (calibration, summaries, rows).

use std::fs::File;
use std::path::Path;

use chrono::Utc;
use serde::Serialize;

use crate::app::pipeline::RunOutput;
use crate::domain::{Method, RowPrediction};
use crate::error::AppError;
use crate::report::ReportFile;

/// One flattened row of the results CSV.
#[derive(Debug, Serialize)]
struct ResultRecord<'a> {
    label: &'a str,
    actual: Option<f64>,
    bpbi: f64,
    jamkesda: f64,
    method: &'static str,
    prediction: f64,
    abs_error: Option<f64>,
    ape_pct: Option<f64>,
    baseline: Option<f64>,
    baseline_ape_pct: Option<f64>,
}

impl<'a> From<&'a RowPrediction> for ResultRecord<'a> {
    fn from(p: &'a RowPrediction) -> Self {
        Self {
            label: &p.row.label,
            actual: p.row.actual,
            bpbi: p.row.bpbi,
            jamkesda: p.row.jamkesda,
            method: method_key(p.method),
            prediction: round2(p.result.value),
            abs_error: p.result.abs_error.map(round2),
            ape_pct: p.result.ape_pct.map(round2),
            baseline: p.baseline.map(|b| round2(b.value)),
            baseline_ape_pct: p.baseline.and_then(|b| b.ape_pct).map(round2),
        }
    }
}

/// Write per-row predictions to a CSV file.
///
/// Empty cells mean "not available" (no actual value, or no baseline).
pub fn write_results_csv(path: &Path, run: &RunOutput) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::input(format!("Failed to create export CSV '{}': {e}", path.display())))?;

    for p in &run.predictions {
        writer
            .serialize(ResultRecord::from(p))
            .map_err(|e| AppError::input(format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::input(format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write the full run as pretty JSON.
pub fn write_report_json(path: &Path, run: &RunOutput) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create report JSON '{}': {e}", path.display())))?;

    let report = ReportFile {
        tool: "pbi".to_string(),
        generated_at: Utc::now(),
        source: run.ingest.source.clone(),
        calibration: run.calibration,
        summaries: run.summaries.clone(),
        baseline: run.baseline.clone(),
        rows: run.predictions.clone(),
        rows_skipped: run.ingest.row_errors.len(),
    };

    serde_json::to_writer_pretty(file, &report)
        .map_err(|e| AppError::input(format!("Failed to write report JSON: {e}")))?;

    Ok(())
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn method_key(method: Method) -> &'static str {
    match method {
        Method::Sugeno => "sugeno",
        Method::Mamdani => "mamdani",
    }
}
