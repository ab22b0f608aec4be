use std::fs::File;
use std::path::Path;

use csv::ReaderBuilder;
use tracing::{debug, instrument};

use crate::emissions::diff::error::{DiffError, Result};
use crate::emissions::diff::io::{find_column, require_column};
use crate::emissions::diff::model::{MappingRow, edgar_class};

pub const SECTOR_COLUMN: &str = "Sector";
pub const SUBSECTOR_COLUMN: &str = "Subsector";
pub const VARS_COLUMN: &str = "Vars";
pub const EDGAR_CLASS_COLUMN: &str = "Edgar_Class";
pub const GAS_COLUMN: &str = "Gas";

/// Where the mapping table gets its `Edgar_Class` from.
enum ClassSource {
    Column(usize),
    Gas(usize),
}

/// Loads the mapping table, preserving file order.
///
/// The table must carry `Sector`, `Subsector` and `Vars`. The join key comes
/// from an `Edgar_Class` column when one exists, otherwise it is built from a
/// `Gas` column the same way the reference inventory builds it.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn load_mapping_table(path: &Path) -> Result<Vec<MappingRow>> {
    let file = File::open(path).map_err(|source| DiffError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = ReaderBuilder::new().from_reader(file);
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let sector = require_column(&headers, SECTOR_COLUMN, path)?;
    let subsector = require_column(&headers, SUBSECTOR_COLUMN, path)?;
    let vars = require_column(&headers, VARS_COLUMN, path)?;
    let class_source = match find_column(&headers, EDGAR_CLASS_COLUMN) {
        Some(index) => ClassSource::Column(index),
        None => match find_column(&headers, GAS_COLUMN) {
            Some(index) => ClassSource::Gas(index),
            None => {
                return Err(DiffError::MissingColumn {
                    column: EDGAR_CLASS_COLUMN.to_string(),
                    source_path: path.to_path_buf(),
                });
            }
        },
    };

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let cell = |index: usize| record.get(index).unwrap_or_default();

        let subsector_name = cell(subsector);
        let class = match class_source {
            ClassSource::Column(index) => cell(index).to_string(),
            ClassSource::Gas(index) => edgar_class(subsector_name, cell(index)),
        };
        rows.push(MappingRow::new(
            cell(sector),
            subsector_name,
            cell(vars),
            class,
        ));
    }

    debug!(row_count = rows.len(), "mapping table loaded");
    Ok(rows)
}
