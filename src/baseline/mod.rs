//! Linear regression baseline.
//!
//! Fits `actual ≈ β0 + β1·bpbi + β2·jamkesda` by ordinary least squares over
//! the rows that carry an actual value. The fuzzy estimate is reported next to
//! this baseline so the two can be compared on the same months.
//!
//! Predictors are standardized before the SVD solve and the coefficients are
//! mapped back to raw units afterwards.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::domain::MonthRow;
use crate::math::{solve_least_squares, standardize_columns};

/// Fewest rows with actual values we accept for a 3-parameter fit.
pub const MIN_ROWS: usize = 3;

/// Fitted baseline in raw units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearBaseline {
    pub intercept: f64,
    pub coef_bpbi: f64,
    pub coef_jamkesda: f64,
    /// In-sample root mean squared error.
    pub rmse: f64,
    pub n: usize,
}

impl LinearBaseline {
    pub fn predict(&self, bpbi: f64, jamkesda: f64) -> f64 {
        self.intercept + self.coef_bpbi * bpbi + self.coef_jamkesda * jamkesda
    }
}

/// Fit the baseline, or explain why it was skipped.
pub fn fit_baseline(rows: &[MonthRow]) -> Result<LinearBaseline, String> {
    let usable: Vec<(f64, f64, f64)> = rows
        .iter()
        .filter_map(|r| r.actual.map(|a| (r.bpbi, r.jamkesda, a)))
        .filter(|(b, j, a)| b.is_finite() && j.is_finite() && a.is_finite())
        .collect();

    let n = usable.len();
    if n < MIN_ROWS {
        return Err(format!(
            "needs at least {MIN_ROWS} rows with actual values (got {n})"
        ));
    }

    let mut predictors = DMatrix::from_fn(n, 2, |i, j| if j == 0 { usable[i].0 } else { usable[i].1 });
    let scaling = standardize_columns(&mut predictors);

    let design = DMatrix::from_fn(n, 3, |i, j| if j == 0 { 1.0 } else { predictors[(i, j - 1)] });
    let y = DVector::from_iterator(n, usable.iter().map(|(_, _, a)| *a));

    let beta = solve_least_squares(&design, &y)
        .ok_or_else(|| "least squares system is singular".to_string())?;

    let coef_bpbi = beta[1] / scaling.scales[0];
    let coef_jamkesda = beta[2] / scaling.scales[1];
    let intercept = beta[0] - coef_bpbi * scaling.means[0] - coef_jamkesda * scaling.means[1];

    let mut baseline = LinearBaseline {
        intercept,
        coef_bpbi,
        coef_jamkesda,
        rmse: 0.0,
        n,
    };

    let sse: f64 = usable
        .iter()
        .map(|(b, j, a)| (a - baseline.predict(*b, *j)).powi(2))
        .sum();
    baseline.rmse = (sse / n as f64).sqrt();

    if ![baseline.intercept, baseline.coef_bpbi, baseline.coef_jamkesda, baseline.rmse]
        .iter()
        .all(|v| v.is_finite())
    {
        return Err("non-finite regression coefficients".to_string());
    }

    Ok(baseline)
}
