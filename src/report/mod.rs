//! Reporting utilities: per-method accuracy summaries and formatted output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::baseline::LinearBaseline;
use crate::domain::{Calibration, Method, RowPrediction};

pub mod format;

pub use format::*;

/// Accuracy of one method over the rows that carry an actual value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MethodSummary {
    pub method: Method,
    pub n_rows: usize,
    pub n_scored: usize,
    pub mean_abs_error: Option<f64>,
    /// Mean absolute percentage error (percent).
    pub mape: Option<f64>,
    /// `100 - mape`.
    pub accuracy: Option<f64>,
}

/// Outcome of the regression baseline step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BaselineStatus {
    Disabled,
    Fitted {
        model: LinearBaseline,
        mape: Option<f64>,
    },
    Skipped {
        reason: String,
    },
}

/// Portable JSON form of a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub calibration: Calibration,
    pub summaries: Vec<MethodSummary>,
    pub baseline: BaselineStatus,
    pub rows: Vec<RowPrediction>,
    pub rows_skipped: usize,
}

/// Summarize the predictions of `method`.
pub fn summarize(predictions: &[RowPrediction], method: Method) -> MethodSummary {
    let rows: Vec<&RowPrediction> = predictions.iter().filter(|p| p.method == method).collect();

    let abs_errors: Vec<f64> = rows.iter().filter_map(|p| p.result.abs_error).collect();
    let apes: Vec<f64> = rows.iter().filter_map(|p| p.result.ape_pct).collect();
    let mape = mean(&apes);

    MethodSummary {
        method,
        n_rows: rows.len(),
        n_scored: apes.len(),
        mean_abs_error: mean(&abs_errors),
        mape,
        accuracy: mape.map(|m| 100.0 - m),
    }
}

/// Mean APE of the baseline column over the rows of `method`.
pub fn baseline_mape(predictions: &[RowPrediction], method: Method) -> Option<f64> {
    let apes: Vec<f64> = predictions
        .iter()
        .filter(|p| p.method == method)
        .filter_map(|p| p.baseline.and_then(|b| b.ape_pct))
        .collect();
    mean(&apes)
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}
