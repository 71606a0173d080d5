//! `pbi-fuzzy` library crate.
//!
//! The binary (`pbi`) is a thin wrapper around this library so that:
//!
//! - the fuzzy core is testable without spawning processes
//! - the predictor can be embedded elsewhere (one call per data row)
//! - presentation (tables, exports) stays out of the inference code

pub mod app;
pub mod baseline;
pub mod calibrate;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fuzzy;
pub mod io;
pub mod math;
pub mod report;
