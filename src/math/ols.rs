//! Least squares solver for the regression baseline.
//!
//! We solve small problems of the form:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! Implementation choices:
//! - QR solve for the usual tall, full-rank design (more months than columns).
//!   nalgebra's `QR::solve` only handles square systems, so we back-substitute
//!   `R β = Qᵀ y` ourselves.
//! - SVD minimum-norm solve when R is rank-deficient (e.g. a constant column).
//! - Raw participant counts sit around 1e5, so callers should standardize
//!   predictor columns before solving (see `standardize_columns`).

use nalgebra::{DMatrix, DVector};

/// Relative size below which a diagonal entry of R marks the design as rank-deficient.
const RANK_TOL: f64 = 1e-10;

/// Solve a least squares problem.
///
/// Tall full-rank systems are solved through QR (`R β = Qᵀ y`). Rank-deficient
/// or wide systems fall back to the SVD minimum-norm solution.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    if let Some(beta) = solve_qr(x, y) {
        return Some(beta);
    }
    solve_svd(x, y)
}

fn solve_qr(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    if x.ncols() == 0 || x.nrows() < x.ncols() {
        return None;
    }

    let qr = x.clone().qr();
    let r = qr.r();

    let diag_max = r.diagonal().iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    if !(diag_max > 0.0) || r.diagonal().iter().any(|v| v.abs() <= RANK_TOL * diag_max) {
        return None;
    }

    let qty = qr.q().transpose() * y;
    let beta = r.solve_upper_triangular(&qty)?;
    beta.iter().all(|v| v.is_finite()).then_some(beta)
}

fn solve_svd(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Per-column centering/scaling applied to a predictor matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnScaling {
    pub means: Vec<f64>,
    pub scales: Vec<f64>,
}

/// Standardize each column of `x` in place to zero mean and unit spread.
///
/// Constant columns keep a scale of 1 so they become exactly zero (and the
/// SVD then drops them via its singular-value tolerance).
pub fn standardize_columns(x: &mut DMatrix<f64>) -> ColumnScaling {
    let n = x.nrows().max(1) as f64;
    let mut means = Vec::with_capacity(x.ncols());
    let mut scales = Vec::with_capacity(x.ncols());

    for mut col in x.column_iter_mut() {
        let mean = col.sum() / n;
        let var = col.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let sd = var.sqrt();
        let scale = if sd > 0.0 && sd.is_finite() { sd } else { 1.0 };
        for v in col.iter_mut() {
            *v = (*v - mean) / scale;
        }
        means.push(mean);
        scales.push(scale);
    }

    ColumnScaling { means, scales }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn tall_standardized_design_recovers_intercept() {
        // Intercept + two standardized predictors, exactly linear in y.
        let z1 = [-1.2, -1.5, -0.3, 0.5, 1.1, 1.4];
        let z2 = [1.1, 0.9, 0.8, -0.2, -2.1, -0.5];
        let mut rows = Vec::new();
        let mut ys = Vec::new();
        for i in 0..6 {
            rows.extend_from_slice(&[1.0, z1[i], z2[i]]);
            ys.push(130_395.45 + 2_000.0 * z1[i] - 40.0 * z2[i]);
        }
        let x = DMatrix::from_row_slice(6, 3, &rows);
        let y = DVector::from_row_slice(&ys);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 130_395.45).abs() < 1e-6, "{beta}");
        assert!((beta[1] - 2_000.0).abs() < 1e-6, "{beta}");
        assert!((beta[2] + 40.0).abs() < 1e-6, "{beta}");
    }

    #[test]
    fn rank_deficient_design_falls_back_to_min_norm() {
        // Second column is all zeros: QR is rejected, SVD drops the column.
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 0.0, 1.0, 0.0]);
        let y = DVector::from_row_slice(&[3.0, 3.0, 3.0]);

        assert!(solve_qr(&x, &y).is_none());
        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 3.0).abs() < 1e-10);
        assert!(beta[1].abs() < 1e-10);
    }

    #[test]
    fn standardize_centers_and_scales() {
        let mut x = DMatrix::from_row_slice(4, 2, &[1.0, 5.0, 2.0, 5.0, 3.0, 5.0, 4.0, 5.0]);
        let s = standardize_columns(&mut x);

        assert!((s.means[0] - 2.5).abs() < 1e-12);
        assert!(x.column(0).sum().abs() < 1e-12);
        // Constant column collapses to zero with unit scale.
        assert_eq!(s.scales[1], 1.0);
        assert!(x.column(1).iter().all(|v| *v == 0.0));
    }
}
