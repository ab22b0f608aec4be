use std::fs::File;
use std::path::Path;

use csv::ReaderBuilder;
use tracing::{info, instrument};

use crate::emissions::diff::error::{DiffError, Result};
use crate::emissions::diff::io::{
    PRIMARY_ID_COLUMN, TIME_PERIOD_COLUMN, excel_read, parse_integer, parse_number,
    require_column,
};
use crate::emissions::diff::model::{SimulationRecord, SimulationTable};

/// Reads simulation output from disk. `.xlsx` files are read from their first
/// worksheet, everything else is parsed as CSV.
pub fn read_simulation(path: &Path) -> Result<SimulationTable> {
    if !path.exists() {
        return Err(DiffError::MissingInput(path.to_path_buf()));
    }
    let is_workbook = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"));
    if is_workbook {
        excel_read::read_simulation_workbook(path)
    } else {
        read_simulation_csv(path)
    }
}

/// Reads a wide simulation table from CSV. Every column other than
/// `time_period` and `primary_id` is a variable; blank cells become NaN.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn read_simulation_csv(path: &Path) -> Result<SimulationTable> {
    let file = File::open(path).map_err(|source| DiffError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = ReaderBuilder::new().from_reader(file);
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let layout = SimulationLayout::from_headers(&headers, path)?;
    let mut table = SimulationTable::new(layout.variable_names(&headers));

    for record in reader.records() {
        let record = record?;
        let cell = |index: usize| record.get(index).unwrap_or_default();
        let time_period = parse_integer(TIME_PERIOD_COLUMN, cell(layout.time_period))?;
        let primary_id = parse_integer(PRIMARY_ID_COLUMN, cell(layout.primary_id))?;
        let values = layout
            .variables
            .iter()
            .map(|&index| {
                parse_number(&headers[index], cell(index)).map(|value| value.unwrap_or(f64::NAN))
            })
            .collect::<Result<Vec<_>>>()?;
        table.push(SimulationRecord::new(time_period, primary_id, values))?;
    }

    info!(
        record_count = table.len(),
        variable_count = table.variables().len(),
        "simulation output loaded"
    );
    Ok(table)
}

/// Column positions of a wide simulation table.
pub(crate) struct SimulationLayout {
    pub time_period: usize,
    pub primary_id: usize,
    pub variables: Vec<usize>,
}

impl SimulationLayout {
    pub(crate) fn from_headers(headers: &[String], path: &Path) -> Result<Self> {
        let time_period = require_column(headers, TIME_PERIOD_COLUMN, path)?;
        let primary_id = require_column(headers, PRIMARY_ID_COLUMN, path)?;
        let variables = (0..headers.len())
            .filter(|&index| index != time_period && index != primary_id)
            .collect();
        Ok(Self {
            time_period,
            primary_id,
            variables,
        })
    }

    pub(crate) fn variable_names(&self, headers: &[String]) -> Vec<String> {
        self.variables
            .iter()
            .map(|&index| headers[index].clone())
            .collect()
    }
}
