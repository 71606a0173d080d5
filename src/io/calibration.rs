//! Read/write calibration JSON files.
//!
//! A calibration file holds the breakpoints, consequents and (optionally) the
//! rule table. Files written by `pbi calibrate --output` can be fed back with
//! `pbi run --calibration`.

use std::fs::File;
use std::path::Path;

use crate::domain::Calibration;
use crate::error::AppError;

/// Write a calibration JSON file.
pub fn write_calibration_json(path: &Path, calibration: &Calibration) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create calibration JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, calibration)
        .map_err(|e| AppError::input(format!("Failed to write calibration JSON: {e}")))?;

    Ok(())
}

/// Read and validate a calibration JSON file.
pub fn read_calibration_json(path: &Path) -> Result<Calibration, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open calibration JSON '{}': {e}", path.display())))?;
    let calibration: Calibration = serde_json::from_reader(file)
        .map_err(|e| AppError::input(format!("Invalid calibration JSON: {e}")))?;
    calibration
        .validate()
        .map_err(|e| AppError::input(format!("Invalid calibration in '{}': {e}", path.display())))?;
    Ok(calibration)
}
