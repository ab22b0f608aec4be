use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};
use tracing::{info, instrument};

use crate::emissions::diff::error::{DiffError, Result};
use crate::emissions::diff::io::simulation::SimulationLayout;
use crate::emissions::diff::io::{
    PRIMARY_ID_COLUMN, TIME_PERIOD_COLUMN, invalid_value, parse_integer, parse_number,
};
use crate::emissions::diff::model::{SimulationRecord, SimulationTable};

/// Reads a wide simulation table from the first worksheet of a workbook. The
/// first row holds the headers, the layout rules match the CSV reader.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn read_simulation_workbook(path: &Path) -> Result<SimulationTable> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| DiffError::EmptyWorkbook(path.to_path_buf()))?
        .map_err(DiffError::from)?;

    let headers: Vec<String> = match range.rows().next() {
        Some(first_row) => first_row
            .iter()
            .map(|cell| cell_to_string(Some(cell)))
            .collect(),
        None => Vec::new(),
    };
    let layout = SimulationLayout::from_headers(&headers, path)?;
    let mut table = SimulationTable::new(layout.variable_names(&headers));

    for row in range.rows().skip(1) {
        if row.iter().all(|cell| matches!(cell, DataType::Empty)) {
            continue;
        }
        let time_period = cell_to_integer(TIME_PERIOD_COLUMN, row.get(layout.time_period))?;
        let primary_id = cell_to_integer(PRIMARY_ID_COLUMN, row.get(layout.primary_id))?;
        let values = layout
            .variables
            .iter()
            .map(|&index| cell_to_number(&headers[index], row.get(index)))
            .collect::<Result<Vec<_>>>()?;
        table.push(SimulationRecord::new(time_period, primary_id, values))?;
    }

    info!(
        record_count = table.len(),
        variable_count = table.variables().len(),
        "simulation workbook loaded"
    );
    Ok(table)
}

fn cell_to_number(column: &str, cell: Option<&DataType>) -> Result<f64> {
    match cell {
        Some(DataType::Float(value)) => Ok(*value),
        Some(DataType::Int(value)) => Ok(*value as f64),
        Some(DataType::String(value)) => {
            Ok(parse_number(column, value)?.unwrap_or(f64::NAN))
        }
        Some(DataType::Empty) | None => Ok(f64::NAN),
        Some(other) => Err(invalid_value(column, &other.to_string())),
    }
}

fn cell_to_integer(column: &str, cell: Option<&DataType>) -> Result<i64> {
    match cell {
        Some(DataType::Int(value)) => Ok(*value),
        Some(DataType::Float(value)) if value.fract() == 0.0 => Ok(*value as i64),
        Some(DataType::String(value)) => parse_integer(column, value),
        other => Err(invalid_value(column, &cell_to_string(other))),
    }
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
