//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during a batch run
//! - exported to JSON/CSV
//! - reloaded later as a calibration file

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Default BPBI breakpoints (historical min/max of the reference year).
pub const DEFAULT_BPBI_BREAKPOINTS: Breakpoints = Breakpoints {
    low: 340_532.0,
    high: 360_936.0,
};

/// Default Jamkesda breakpoints (historical min/max of the reference year).
pub const DEFAULT_JAMKESDA_BREAKPOINTS: Breakpoints = Breakpoints {
    low: 41_924.0,
    high: 42_747.0,
};

/// Default crisp outputs for the "low" and "high" PBI terms.
pub const DEFAULT_CONSEQUENT: Consequent = Consequent {
    low: 148_805.0,
    high: 149_840.0,
};

/// Linguistic term of a two-term variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Term {
    Low,
    High,
}

/// Ramp calibration for one input variable.
///
/// Values at or below `low` are fully "low"; values at or above `high` are
/// fully "high"; anything between is a linear blend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakpoints {
    pub low: f64,
    pub high: f64,
}

impl Breakpoints {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Check `low < high` and that both are finite.
    pub fn validate(&self, name: &str) -> Result<(), String> {
        if !self.low.is_finite() || !self.high.is_finite() {
            return Err(format!("{name} breakpoints must be finite (got {} / {}).", self.low, self.high));
        }
        if self.low >= self.high {
            return Err(format!(
                "{name} breakpoints must satisfy low < high (got {} >= {}).",
                self.low, self.high
            ));
        }
        Ok(())
    }
}

/// Crisp outputs attached to the output terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Consequent {
    pub low: f64,
    pub high: f64,
}

impl Consequent {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn value(&self, term: Term) -> f64 {
        match term {
            Term::Low => self.low,
            Term::High => self.high,
        }
    }
}

/// Output term for each `(bpbi term, jamkesda term)` antecedent.
///
/// Indexing follows the rule order used everywhere else:
/// `[(low,low), (low,high), (high,low), (high,high)]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTable {
    pub outputs: [Term; 4],
}

impl RuleTable {
    /// Antecedent pairs in rule order.
    pub const ANTECEDENTS: [(Term, Term); 4] = [
        (Term::Low, Term::Low),
        (Term::Low, Term::High),
        (Term::High, Term::Low),
        (Term::High, Term::High),
    ];

    pub fn output(&self, rule: usize) -> Term {
        self.outputs[rule]
    }
}

impl Default for RuleTable {
    /// PBI follows BPBI: a falling BPBI count implies a low PBI count,
    /// regardless of Jamkesda.
    fn default() -> Self {
        Self {
            outputs: [Term::Low, Term::Low, Term::High, Term::High],
        }
    }
}

/// Full fuzzy model calibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub bpbi: Breakpoints,
    pub jamkesda: Breakpoints,
    pub consequent: Consequent,
    #[serde(default)]
    pub rules: RuleTable,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            bpbi: DEFAULT_BPBI_BREAKPOINTS,
            jamkesda: DEFAULT_JAMKESDA_BREAKPOINTS,
            consequent: DEFAULT_CONSEQUENT,
            rules: RuleTable::default(),
        }
    }
}

impl Calibration {
    pub fn validate(&self) -> Result<(), String> {
        self.bpbi.validate("BPBI")?;
        self.jamkesda.validate("Jamkesda")?;
        if !self.consequent.low.is_finite() || !self.consequent.high.is_finite() {
            return Err("Consequents must be finite.".to_string());
        }
        Ok(())
    }
}

/// Defuzzification method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Weighted average of all rule consequents.
    Sugeno,
    /// Mean of the consequents of the strongest rule(s).
    Mamdani,
}

impl Method {
    pub fn display_name(self) -> &'static str {
        match self {
            Method::Sugeno => "Sugeno",
            Method::Mamdani => "Mamdani",
        }
    }
}

/// Which method(s) a batch run evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MethodSpec {
    Sugeno,
    Mamdani,
    Both,
}

impl MethodSpec {
    pub fn methods(self) -> Vec<Method> {
        match self {
            MethodSpec::Sugeno => vec![Method::Sugeno],
            MethodSpec::Mamdani => vec![Method::Mamdani],
            MethodSpec::Both => vec![Method::Sugeno, Method::Mamdani],
        }
    }
}

/// One monthly observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthRow {
    pub label: String,
    /// Actual PBI count, when known.
    pub actual: Option<f64>,
    pub bpbi: f64,
    pub jamkesda: f64,
}

/// A defuzzified estimate plus its error against a known actual value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub value: f64,
    pub abs_error: Option<f64>,
    /// Absolute percentage error (percent, not fraction).
    pub ape_pct: Option<f64>,
}

impl PredictionResult {
    pub fn new(value: f64, actual: Option<f64>) -> Self {
        let abs_error = actual.map(|a| (a - value).abs());
        let ape_pct = match (actual, abs_error) {
            (Some(a), Some(e)) if a != 0.0 => Some(e / a.abs() * 100.0),
            _ => None,
        };
        Self {
            value,
            abs_error,
            ape_pct,
        }
    }
}

/// Scored prediction for one row under one method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowPrediction {
    pub row: MonthRow,
    pub method: Method,
    pub result: PredictionResult,
    /// Regression baseline estimate for the same row, if a baseline was fitted.
    pub baseline: Option<PredictionResult>,
}

/// Resolved configuration for a batch run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: Option<PathBuf>,
    pub calibration: Calibration,
    pub method: MethodSpec,
    pub baseline: bool,
    pub export_results: Option<PathBuf>,
    pub export_report: Option<PathBuf>,
}
