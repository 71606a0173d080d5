//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the inference code stays clean and testable
//! - output changes are localized

use crate::app::pipeline::RunOutput;
use crate::domain::{Calibration, Method, RowPrediction, RuleTable};
use crate::fuzzy::{Inference, RuleStrengths};
use crate::report::{BaselineStatus, MethodSummary};

/// Format the run summary (data source, calibration, accuracy per method).
pub fn format_run_summary(run: &RunOutput) -> String {
    let mut out = String::new();

    out.push_str("=== pbi - Fuzzy PBI Estimate ===\n");
    out.push_str(&format!("Source: {}\n", run.ingest.source));
    out.push_str(&format!(
        "Rows: used={} read={} skipped={} | with actual={}\n",
        run.ingest.stats.n_rows,
        run.ingest.rows_read,
        run.ingest.row_errors.len(),
        run.ingest.stats.n_with_actual,
    ));
    out.push_str(&format!(
        "Ranges: bpbi=[{:.0}, {:.0}] jamkesda=[{:.0}, {:.0}]\n",
        run.ingest.stats.bpbi_min,
        run.ingest.stats.bpbi_max,
        run.ingest.stats.jamkesda_min,
        run.ingest.stats.jamkesda_max,
    ));

    out.push('\n');
    out.push_str(&format_calibration(&run.calibration));

    out.push_str("\nAccuracy:\n");
    for s in &run.summaries {
        out.push_str(&format_summary_line(s));
    }

    match &run.baseline {
        BaselineStatus::Disabled => {}
        BaselineStatus::Fitted { model, mape } => {
            out.push_str(&format!(
                "  {:<10} MAPE={} accuracy={} (y = {:.4} + {:.6}*bpbi + {:.6}*jamkesda, RMSE={:.2})\n",
                "Linear",
                fmt_pct(*mape),
                fmt_pct(mape.map(|m| 100.0 - m)),
                model.intercept,
                model.coef_bpbi,
                model.coef_jamkesda,
                model.rmse,
            ));
        }
        BaselineStatus::Skipped { reason } => {
            out.push_str(&format!("  (skipped linear baseline) {reason}\n"));
        }
    }

    out
}

fn format_summary_line(s: &MethodSummary) -> String {
    format!(
        "  {:<10} MAPE={} accuracy={} (scored {}/{})\n",
        s.method.display_name(),
        fmt_pct(s.mape),
        fmt_pct(s.accuracy),
        s.n_scored,
        s.n_rows,
    )
}

/// Format the calibration block.
pub fn format_calibration(c: &Calibration) -> String {
    let mut out = String::new();
    out.push_str("Calibration:\n");
    out.push_str(&format!("- bpbi breakpoints     : [{:.2}, {:.2}]\n", c.bpbi.low, c.bpbi.high));
    out.push_str(&format!(
        "- jamkesda breakpoints : [{:.2}, {:.2}]\n",
        c.jamkesda.low, c.jamkesda.high
    ));
    out.push_str(&format!(
        "- consequents          : low={:.2} high={:.2}\n",
        c.consequent.low, c.consequent.high
    ));
    out
}

/// Format the per-month prediction table for one method.
pub fn format_predictions(predictions: &[RowPrediction], method: Method) -> String {
    let mut out = String::new();
    out.push_str(&format!("Predictions ({}):\n", method.display_name()));
    out.push_str(
        format!(
            "{:<12} {:>12} {:>12} {:>10} {:>8} {:>12} {:>8}\n",
            "month", "actual", "predicted", "abs_err", "ape%", "linear", "ape%"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<12} {:-<12} {:-<12} {:-<10} {:-<8} {:-<12} {:-<8}\n",
            "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for p in predictions.iter().filter(|p| p.method == method) {
        out.push_str(
            format!(
                "{:<12} {:>12} {:>12.2} {:>10} {:>8} {:>12} {:>8}\n",
                truncate(&p.row.label, 12),
                fmt_opt(p.row.actual, 0),
                p.result.value,
                fmt_opt(p.result.abs_error, 2),
                fmt_opt(p.result.ape_pct, 2),
                fmt_opt(p.baseline.map(|b| b.value), 2),
                fmt_opt(p.baseline.and_then(|b| b.ape_pct), 2),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Format a single inference with its intermediate memberships and strengths.
pub fn format_inference(
    method: Method,
    bpbi: f64,
    jamkesda: f64,
    inference: &Inference,
    rules: &RuleTable,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("Input: bpbi={bpbi} jamkesda={jamkesda}\n"));
    out.push_str(&format!(
        "Membership: bpbi(low={:.4}, high={:.4}) jamkesda(low={:.4}, high={:.4})\n",
        inference.bpbi.low, inference.bpbi.high, inference.jamkesda.low, inference.jamkesda.high
    ));
    out.push_str(&format_strengths(&inference.strengths, rules));
    out.push_str(&format!("{}: {:.2}\n", method.display_name(), inference.value));
    out
}

fn format_strengths(strengths: &RuleStrengths, rules: &RuleTable) -> String {
    let mut out = String::from("Rules:\n");
    for (i, (t_bpbi, t_jamkesda)) in RuleTable::ANTECEDENTS.iter().enumerate() {
        out.push_str(&format!(
            "  r{} bpbi={:<4} jamkesda={:<4} -> {:<4} strength={:.4}\n",
            i + 1,
            format!("{t_bpbi:?}").to_lowercase(),
            format!("{t_jamkesda:?}").to_lowercase(),
            format!("{:?}", rules.output(i)).to_lowercase(),
            strengths.0[i],
        ));
    }
    out
}

fn fmt_pct(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.2}%")).unwrap_or_else(|| "n/a".to_string())
}

fn fmt_opt(v: Option<f64>, decimals: usize) -> String {
    v.map(|x| format!("{x:.decimals$}")).unwrap_or_else(|| "-".to_string())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MonthRow, PredictionResult};
    use crate::fuzzy::FuzzyPredictor;

    #[test]
    fn prediction_table_shows_dash_for_missing_values() {
        let preds = vec![RowPrediction {
            row: MonthRow {
                label: "Jan".to_string(),
                actual: None,
                bpbi: 1.0,
                jamkesda: 2.0,
            },
            method: Method::Sugeno,
            result: PredictionResult::new(148_805.0, None),
            baseline: None,
        }];

        let table = format_predictions(&preds, Method::Sugeno);
        let last = table.lines().last().unwrap();
        assert!(last.starts_with("Jan"));
        assert!(last.contains("148805.00"));
        assert!(last.trim_end().ends_with('-'));
        assert!(format_predictions(&preds, Method::Mamdani).lines().count() == 3);
    }

    #[test]
    fn inference_lists_all_four_rules() {
        let p = FuzzyPredictor::default();
        let inf = p.explain(Method::Sugeno, 350_000.0, 42_300.0);
        let text = format_inference(Method::Sugeno, 350_000.0, 42_300.0, &inf, &p.calibration().rules);
        assert_eq!(text.lines().filter(|l| l.trim_start().starts_with('r')).count(), 4);
        assert!(text.contains("bpbi=high jamkesda=low  -> high"));
    }

    #[test]
    fn truncate_marks_cut_labels() {
        assert_eq!(truncate("September-2024", 8), "Septemb.");
        assert_eq!(truncate("Jan", 8), "Jan");
    }
}
