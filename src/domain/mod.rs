//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - fuzzy model calibration (`Breakpoints`, `Consequent`, `RuleTable`, `Calibration`)
//! - method selection enums (`Method`, `MethodSpec`)
//! - monthly observations and scored outputs (`MonthRow`, `RowPrediction`)

pub mod types;

pub use types::*;
