//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - result exports (CSV/JSON) (`export`)
//! - calibration JSON read/write (`calibration`)

pub mod calibration;
pub mod export;
pub mod ingest;

pub use calibration::*;
pub use export::*;
pub use ingest::*;
