//! CSV ingest and normalization.
//!
//! This module is responsible for turning a monthly CSV into clean
//! `MonthRow`s that are safe to predict.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level tolerance** (rows that fail numeric coercion are skipped and
//!   counted, never fatal)
//! - **Separation of concerns**: no inference logic here

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use csv::StringRecord;
use tracing::debug;

use crate::domain::MonthRow;
use crate::error::AppError;

const LABEL_COLUMNS: [&str; 3] = ["bulan", "month", "label"];
const ACTUAL_COLUMNS: [&str; 3] = ["pbi_asli", "pbi", "actual"];

/// Summary stats about the rows actually used.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetStats {
    pub n_rows: usize,
    pub n_with_actual: usize,
    pub bpbi_min: f64,
    pub bpbi_max: f64,
    pub jamkesda_min: f64,
    pub jamkesda_max: f64,
}

/// A row that was skipped during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub label: Option<String>,
    pub message: String,
}

/// Ingest output: normalized rows + stats + skipped rows.
#[derive(Debug, Clone)]
pub struct IngestedData {
    /// Human-readable origin ("built-in reference year" or a file path).
    pub source: String,
    pub rows: Vec<MonthRow>,
    pub stats: DatasetStats,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

impl IngestedData {
    /// Wrap already-clean rows (e.g. the built-in reference year).
    pub fn from_rows(source: impl Into<String>, rows: Vec<MonthRow>) -> Result<Self, AppError> {
        let stats = compute_stats(&rows).ok_or_else(|| AppError::no_data("No usable rows."))?;
        Ok(Self {
            source: source.into(),
            rows_read: rows.len(),
            rows,
            stats,
            row_errors: Vec::new(),
        })
    }
}

/// Load and normalize a monthly CSV (comma or semicolon delimited).
pub fn load_month_rows(path: &Path) -> Result<IngestedData, AppError> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::input(format!("Failed to open CSV '{}': {e}", path.display())))?;
    let mut data = parse_month_rows(&content)?;
    data.source = path.display().to_string();
    Ok(data)
}

/// Parse CSV text into monthly rows.
pub fn parse_month_rows(content: &str) -> Result<IngestedData, AppError> {
    let delimiter = sniff_delimiter(content);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;

    let label_col = find_column(&header_map, &LABEL_COLUMNS);
    let actual_col = find_column(&header_map, &ACTUAL_COLUMNS);

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: header is line 1 and lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    label: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let label = label_col
            .and_then(|i| get_cell(&record, i))
            .map(str::to_string)
            .unwrap_or_else(|| format!("Bulan-{}", idx + 1));

        match parse_row(&record, &header_map, actual_col, label.clone()) {
            Ok(row) => rows.push(row),
            Err(message) => {
                debug!(line, label = %label, reason = %message, "skipping row");
                row_errors.push(RowError {
                    line,
                    label: Some(label),
                    message,
                });
            }
        }
    }

    let stats = compute_stats(&rows).ok_or_else(|| {
        AppError::no_data("No valid rows remain after numeric coercion.")
    })?;

    Ok(IngestedData {
        source: "<csv>".to_string(),
        rows,
        stats,
        row_errors,
        rows_read,
    })
}

fn sniff_delimiter(content: &str) -> u8 {
    let header = content.lines().next().unwrap_or("");
    let commas = header.matches(',').count();
    let semicolons = header.matches(';').count();
    if semicolons > commas { b';' } else { b',' }
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

fn find_column(header_map: &HashMap<String, usize>, aliases: &[&str]) -> Option<usize> {
    aliases.iter().find_map(|name| header_map.get(*name).copied())
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    for name in ["bpbi", "jamkesda"] {
        if !header_map.contains_key(name) {
            return Err(AppError::input(format!("Missing required column: `{name}`")));
        }
    }
    Ok(())
}

fn parse_row(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    actual_col: Option<usize>,
    label: String,
) -> Result<MonthRow, String> {
    let bpbi = parse_required_f64(record, header_map, "bpbi")?;
    let jamkesda = parse_required_f64(record, header_map, "jamkesda")?;

    let actual = match actual_col.and_then(|i| get_cell(record, i)) {
        None => None,
        Some(s) => Some(parse_f64(s).ok_or_else(|| format!("Invalid actual PBI value '{s}'."))?),
    };

    Ok(MonthRow {
        label,
        actual,
        bpbi,
        jamkesda,
    })
}

fn parse_required_f64(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<f64, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    let raw = get_cell(record, *idx).ok_or_else(|| format!("Missing required value: `{name}`"))?;
    parse_f64(raw).ok_or_else(|| format!("Invalid `{name}` value '{raw}'."))
}

fn get_cell(record: &StringRecord, idx: usize) -> Option<&str> {
    record.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_f64(s: &str) -> Option<f64> {
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

fn compute_stats(rows: &[MonthRow]) -> Option<DatasetStats> {
    if rows.is_empty() {
        return None;
    }

    let mut stats = DatasetStats {
        n_rows: rows.len(),
        n_with_actual: 0,
        bpbi_min: f64::INFINITY,
        bpbi_max: f64::NEG_INFINITY,
        jamkesda_min: f64::INFINITY,
        jamkesda_max: f64::NEG_INFINITY,
    };

    for r in rows {
        stats.bpbi_min = stats.bpbi_min.min(r.bpbi);
        stats.bpbi_max = stats.bpbi_max.max(r.bpbi);
        stats.jamkesda_min = stats.jamkesda_min.min(r.jamkesda);
        stats.jamkesda_max = stats.jamkesda_max.max(r.jamkesda);
        if r.actual.is_some() {
            stats.n_with_actual += 1;
        }
    }

    Some(stats)
}
