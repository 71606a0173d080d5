//! Mathematical utilities: least squares for the regression baseline.

pub mod ols;

pub use ols::*;
