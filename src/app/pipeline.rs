//! Shared batch pipeline.
//!
//! load rows -> fit baseline -> predict each row per method -> summarize
//!
//! The CLI front-end only handles presentation (printing and exports).

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::baseline::{LinearBaseline, fit_baseline};
use crate::data::default_rows;
use crate::domain::{Calibration, PredictionResult, RowPrediction, RunConfig};
use crate::error::AppError;
use crate::fuzzy::FuzzyPredictor;
use crate::io::ingest::{IngestedData, load_month_rows};
use crate::report::{BaselineStatus, MethodSummary, baseline_mape, summarize};

/// All computed outputs of a single `pbi run`.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedData,
    pub calibration: Calibration,
    /// Predictions for every method, grouped by method in `MethodSpec` order.
    pub predictions: Vec<RowPrediction>,
    pub summaries: Vec<MethodSummary>,
    pub baseline: BaselineStatus,
}

/// Load the configured input (or the built-in reference year).
pub fn load_input(config: &RunConfig) -> Result<IngestedData, AppError> {
    let ingest = match &config.input {
        Some(path) => load_month_rows(path)?,
        None => IngestedData::from_rows("built-in reference year", default_rows())?,
    };

    if !ingest.row_errors.is_empty() {
        warn!(
            skipped = ingest.row_errors.len(),
            read = ingest.rows_read,
            "some rows failed numeric coercion and were skipped"
        );
    }
    info!(source = %ingest.source, rows = ingest.rows.len(), "loaded input");
    Ok(ingest)
}

/// Execute the full batch pipeline.
pub fn run_batch(config: &RunConfig) -> Result<RunOutput, AppError> {
    let ingest = load_input(config)?;
    run_batch_with_data(config, ingest)
}

/// Execute the batch pipeline on already-loaded rows.
pub fn run_batch_with_data(config: &RunConfig, ingest: IngestedData) -> Result<RunOutput, AppError> {
    config.calibration.validate().map_err(AppError::input)?;
    let predictor = FuzzyPredictor::new(config.calibration);

    let fitted = if config.baseline {
        Some(fit_baseline(&ingest.rows))
    } else {
        None
    };
    let model: Option<LinearBaseline> = match &fitted {
        Some(Ok(m)) => Some(*m),
        _ => None,
    };

    let mut predictions = Vec::with_capacity(ingest.rows.len() * 2);
    for method in config.method.methods() {
        let batch: Vec<RowPrediction> = ingest
            .rows
            .par_iter()
            .map(|row| RowPrediction {
                row: row.clone(),
                method,
                result: PredictionResult::new(predictor.predict(method, row.bpbi, row.jamkesda), row.actual),
                baseline: model.map(|m| PredictionResult::new(m.predict(row.bpbi, row.jamkesda), row.actual)),
            })
            .collect();

        if let Some(bad) = batch.iter().find(|p| !p.result.value.is_finite()) {
            return Err(AppError::numeric(format!(
                "Non-finite {} prediction for '{}'.",
                method.display_name(),
                bad.row.label
            )));
        }
        debug!(method = method.display_name(), rows = batch.len(), "predicted");
        predictions.extend(batch);
    }

    let summaries: Vec<MethodSummary> = config
        .method
        .methods()
        .into_iter()
        .map(|m| summarize(&predictions, m))
        .collect();

    let baseline = match fitted {
        None => BaselineStatus::Disabled,
        Some(Ok(model)) => {
            let first = config.method.methods()[0];
            BaselineStatus::Fitted {
                model,
                mape: baseline_mape(&predictions, first),
            }
        }
        Some(Err(reason)) => {
            warn!(%reason, "linear baseline skipped");
            BaselineStatus::Skipped { reason }
        }
    };

    for s in &summaries {
        info!(
            method = s.method.display_name(),
            mape = s.mape.unwrap_or(f64::NAN),
            scored = s.n_scored,
            "evaluated"
        );
    }

    Ok(RunOutput {
        ingest,
        calibration: config.calibration,
        predictions,
        summaries,
        baseline,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Method, MethodSpec, MonthRow};

    fn config(method: MethodSpec, baseline: bool) -> RunConfig {
        RunConfig {
            input: None,
            calibration: Calibration::default(),
            method,
            baseline,
            export_results: None,
            export_report: None,
        }
    }

    #[test]
    fn reference_year_predictions_stay_within_consequents() {
        let run = run_batch(&config(MethodSpec::Sugeno, true)).unwrap();
        assert_eq!(run.predictions.len(), 12);
        for p in &run.predictions {
            assert!(
                (148_805.0 - 1e-6..=149_840.0 + 1e-6).contains(&p.result.value),
                "{}: {}",
                p.row.label,
                p.result.value
            );
        }

        let s = &run.summaries[0];
        assert_eq!(s.n_scored, 12);
        let mape = s.mape.unwrap();
        assert!(mape.is_finite() && mape < 1.0, "mape = {mape}");

        assert!(matches!(run.baseline, BaselineStatus::Fitted { .. }));
        assert!(run.predictions.iter().all(|p| p.baseline.is_some()));
    }

    #[test]
    fn both_methods_are_grouped_in_order() {
        let run = run_batch(&config(MethodSpec::Both, false)).unwrap();
        assert_eq!(run.predictions.len(), 24);
        assert!(run.predictions[..12].iter().all(|p| p.method == Method::Sugeno));
        assert!(run.predictions[12..].iter().all(|p| p.method == Method::Mamdani));
        assert_eq!(run.summaries.len(), 2);
        assert_eq!(run.baseline, BaselineStatus::Disabled);
        assert!(run.predictions.iter().all(|p| p.baseline.is_none()));
    }

    #[test]
    fn too_few_actuals_skips_baseline_but_still_predicts() {
        let rows = vec![
            MonthRow {
                label: "A".to_string(),
                actual: Some(149_000.0),
                bpbi: 345_000.0,
                jamkesda: 42_000.0,
            },
            MonthRow {
                label: "B".to_string(),
                actual: None,
                bpbi: 355_000.0,
                jamkesda: 42_600.0,
            },
        ];
        let ingest = IngestedData::from_rows("test", rows).unwrap();
        let run = run_batch_with_data(&config(MethodSpec::Sugeno, true), ingest).unwrap();

        assert_eq!(run.predictions.len(), 2);
        assert!(matches!(run.baseline, BaselineStatus::Skipped { .. }));
        assert_eq!(run.summaries[0].n_scored, 1);
    }

    #[test]
    fn zero_actual_row_is_predicted_but_not_scored() {
        let mut rows = default_rows();
        rows[3].actual = Some(0.0);
        let ingest = IngestedData::from_rows("test", rows).unwrap();
        let run = run_batch_with_data(&config(MethodSpec::Sugeno, false), ingest).unwrap();

        assert_eq!(run.predictions.len(), 12);
        let zero = &run.predictions[3];
        assert_eq!(zero.result.ape_pct, None);
        assert_eq!(zero.result.abs_error, Some(zero.result.value));
        assert_eq!(run.summaries[0].n_rows, 12);
        assert_eq!(run.summaries[0].n_scored, 11);
        assert!(run.summaries[0].mape.unwrap().is_finite());
    }

    #[test]
    fn invalid_calibration_is_an_input_error() {
        let mut cfg = config(MethodSpec::Sugeno, false);
        cfg.calibration.bpbi.low = cfg.calibration.bpbi.high;
        let err = run_batch(&cfg).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
