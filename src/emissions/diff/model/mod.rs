use std::collections::HashMap;

use serde::Serialize;

use crate::emissions::diff::error::{DiffError, Result};

/// Separator used both inside `Vars` cells and in the composite
/// `Subsector:Gas` class key.
pub const CLASS_SEPARATOR: char = ':';

/// Builds the composite `Subsector:Gas` key identifying one reference bucket.
pub fn edgar_class(subsector: &str, gas: &str) -> String {
    format!("{subsector}{CLASS_SEPARATOR}{gas}")
}

/// One row of the variable → sector/gas mapping table.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingRow {
    pub sector: String,
    pub subsector: String,
    /// Simulation variable names summed into this bucket, in file order.
    pub vars: Vec<String>,
    pub edgar_class: String,
}

impl MappingRow {
    /// Creates a mapping row, splitting the colon-delimited `Vars` cell.
    pub fn new(
        sector: impl Into<String>,
        subsector: impl Into<String>,
        vars: &str,
        edgar_class: impl Into<String>,
    ) -> Self {
        Self {
            sector: sector.into(),
            subsector: subsector.into(),
            vars: split_vars(vars),
            edgar_class: edgar_class.into(),
        }
    }
}

/// Splits a `Vars` cell into variable names. An empty cell references nothing.
pub fn split_vars(cell: &str) -> Vec<String> {
    if cell.is_empty() {
        return Vec::new();
    }
    cell.split(CLASS_SEPARATOR).map(str::to_string).collect()
}

/// One row of simulation output in wide form. `values` is aligned with the
/// owning table's variable columns; missing cells are stored as NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRecord {
    pub time_period: i64,
    pub primary_id: i64,
    pub values: Vec<f64>,
}

impl SimulationRecord {
    pub fn new(time_period: i64, primary_id: i64, values: Vec<f64>) -> Self {
        Self {
            time_period,
            primary_id,
            values,
        }
    }
}

/// In-memory simulation output: a fixed, ordered set of variable columns and
/// the records carrying one value per column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimulationTable {
    variables: Vec<String>,
    index: HashMap<String, usize>,
    records: Vec<SimulationRecord>,
}

impl SimulationTable {
    /// Creates an empty table with the given variable columns. A repeated
    /// column name resolves to its first occurrence.
    pub fn new(variables: Vec<String>) -> Self {
        let mut index = HashMap::with_capacity(variables.len());
        for (position, name) in variables.iter().enumerate() {
            index.entry(name.clone()).or_insert(position);
        }
        Self {
            variables,
            index,
            records: Vec::new(),
        }
    }

    /// Creates a table and appends every record, validating row widths.
    pub fn from_records(
        variables: Vec<String>,
        records: impl IntoIterator<Item = SimulationRecord>,
    ) -> Result<Self> {
        let mut table = Self::new(variables);
        for record in records {
            table.push(record)?;
        }
        Ok(table)
    }

    /// Appends a record. Its width must match the declared variables.
    pub fn push(&mut self, record: SimulationRecord) -> Result<()> {
        if record.values.len() != self.variables.len() {
            return Err(DiffError::RecordWidth {
                expected: self.variables.len(),
                found: record.values.len(),
            });
        }
        self.records.push(record);
        Ok(())
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn records(&self) -> &[SimulationRecord] {
        &self.records
    }

    /// Position of a variable column, matched exactly and case-sensitively.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns a new table with the same columns holding only the records
    /// accepted by `keep`.
    pub fn retain_records(&self, mut keep: impl FnMut(&SimulationRecord) -> bool) -> Self {
        Self {
            variables: self.variables.clone(),
            index: self.index.clone(),
            records: self
                .records
                .iter()
                .filter(|record| keep(record))
                .cloned()
                .collect(),
        }
    }
}

/// Reference inventory value for one class in long form.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgarRecord {
    pub edgar_class: String,
    pub year: i32,
    /// `None` when the inventory cell for the year is empty.
    pub edgar_values: Option<f64>,
}

/// A mapping row augmented with the simulated total of its variables.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedRow {
    pub mapping: MappingRow,
    pub simulation_values: f64,
}

/// Fine-grained report row: one per (Subsector, Edgar_Class).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailedDiffRow {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Subsector")]
    pub subsector: String,
    #[serde(rename = "Edgar_Class")]
    pub edgar_class: String,
    #[serde(rename = "Simulation_Values")]
    pub simulation_values: f64,
    /// `None` when the class has no reference match.
    #[serde(rename = "Edgar_Values")]
    pub edgar_values: Option<f64>,
    pub diff: Option<f64>,
}

/// Coarse report row: one per Subsector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubsectorDiffRow {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Subsector")]
    pub subsector: String,
    #[serde(rename = "Simulation_Values")]
    pub simulation_values: f64,
    #[serde(rename = "Edgar_Values")]
    pub edgar_values: Option<f64>,
    pub diff: Option<f64>,
}
