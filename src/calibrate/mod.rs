//! Calibration resolution.
//!
//! A calibration comes from one of three layers, later layers winning:
//!
//! 1. built-in defaults (`Calibration::default()`)
//! 2. a calibration JSON file (`--calibration`)
//! 3. per-field overrides from flags or environment variables
//!
//! `derive_calibration` offers the data-driven alternative: breakpoints are the
//! min/max of each input series and consequents the min/max of the actuals.

use crate::domain::{Breakpoints, Calibration, Consequent, MonthRow};

/// Optional per-field overrides.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CalibrationOverrides {
    pub bpbi_low: Option<f64>,
    pub bpbi_high: Option<f64>,
    pub jamkesda_low: Option<f64>,
    pub jamkesda_high: Option<f64>,
    pub consequent_low: Option<f64>,
    pub consequent_high: Option<f64>,
}

impl CalibrationOverrides {
    pub fn apply(&self, base: Calibration) -> Calibration {
        let mut c = base;
        if let Some(v) = self.bpbi_low {
            c.bpbi.low = v;
        }
        if let Some(v) = self.bpbi_high {
            c.bpbi.high = v;
        }
        if let Some(v) = self.jamkesda_low {
            c.jamkesda.low = v;
        }
        if let Some(v) = self.jamkesda_high {
            c.jamkesda.high = v;
        }
        if let Some(v) = self.consequent_low {
            c.consequent.low = v;
        }
        if let Some(v) = self.consequent_high {
            c.consequent.high = v;
        }
        c
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Derive a calibration from the observed ranges of `rows`.
pub fn derive_calibration(rows: &[MonthRow]) -> Result<Calibration, String> {
    let bpbi = series_range(rows.iter().map(|r| r.bpbi)).ok_or("no finite BPBI values")?;
    let jamkesda = series_range(rows.iter().map(|r| r.jamkesda)).ok_or("no finite Jamkesda values")?;
    let actual = series_range(rows.iter().filter_map(|r| r.actual))
        .ok_or("no actual PBI values to derive consequents from")?;

    let calibration = Calibration {
        bpbi: Breakpoints::new(bpbi.0, bpbi.1),
        jamkesda: Breakpoints::new(jamkesda.0, jamkesda.1),
        consequent: Consequent::new(actual.0, actual.1),
        ..Calibration::default()
    };
    calibration.validate()?;
    Ok(calibration)
}

fn series_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    (min <= max).then_some((min, max))
}
