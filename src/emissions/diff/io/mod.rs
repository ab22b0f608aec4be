//! Adapters between on-disk tables and the in-memory model.

use std::path::Path;

use crate::emissions::diff::error::{DiffError, Result};

pub mod edgar;
pub mod excel_read;
pub mod excel_write;
pub mod mapping;
pub mod report_csv;
pub mod simulation;

/// Column carrying the simulation step offset.
pub const TIME_PERIOD_COLUMN: &str = "time_period";
/// Column carrying the simulation entity identifier.
pub const PRIMARY_ID_COLUMN: &str = "primary_id";

/// Position of a header, ignoring surrounding whitespace, if present.
pub(crate) fn find_column(headers: &[String], column: &str) -> Option<usize> {
    headers.iter().position(|header| header.trim() == column)
}

/// Position of a header that must be present in `source_path`.
pub(crate) fn require_column(
    headers: &[String],
    column: &str,
    source_path: &Path,
) -> Result<usize> {
    find_column(headers, column).ok_or_else(|| DiffError::MissingColumn {
        column: column.to_string(),
        source_path: source_path.to_path_buf(),
    })
}

/// Parses a numeric cell. Blank cells are `None`.
pub(crate) fn parse_number(column: &str, value: &str) -> Result<Option<f64>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<f64>()
        .map(Some)
        .map_err(|_| invalid_value(column, value))
}

/// Parses an integer cell, accepting integral floats such as `5.0`.
pub(crate) fn parse_integer(column: &str, value: &str) -> Result<i64> {
    let trimmed = value.trim();
    if let Ok(parsed) = trimmed.parse::<i64>() {
        return Ok(parsed);
    }
    match trimmed.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() && parsed.fract() == 0.0 => Ok(parsed as i64),
        _ => Err(invalid_value(column, value)),
    }
}

pub(crate) fn invalid_value(column: &str, value: &str) -> DiffError {
    DiffError::InvalidValue {
        column: column.to_string(),
        value: value.to_string(),
    }
}
