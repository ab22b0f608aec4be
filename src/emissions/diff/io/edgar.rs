use std::fs;
use std::path::Path;

use csv::ReaderBuilder;
use encoding_rs::mem::decode_latin1;
use tracing::{debug, info, instrument, warn};

use crate::emissions::diff::error::{DiffError, Result};
use crate::emissions::diff::io::{parse_number, require_column};
use crate::emissions::diff::model::{EdgarRecord, edgar_class};

pub const CODE_COLUMN: &str = "Code";
pub const SUBSECTOR_COLUMN: &str = "CSC Subsector";
pub const GAS_COLUMN: &str = "Gas";

/// Loads the EDGAR inventory and reshapes it into one long-form record per
/// retained row for `iso_alpha_3` and `year`.
///
/// The file is decoded as ISO-8859-1, every byte mapping to the code point
/// of the same value. Country codes are compared exactly. Only the column named after `year` is unpivoted; a missing year
/// column is reported as [`DiffError::MissingColumn`].
#[instrument(
    level = "info",
    skip_all,
    fields(path = %path.display(), iso_alpha_3 = %iso_alpha_3, year = year)
)]
pub fn edgar_data_etl(path: &Path, iso_alpha_3: &str, year: i32) -> Result<Vec<EdgarRecord>> {
    let bytes = fs::read(path).map_err(|source| DiffError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let text = decode_latin1(&bytes);

    let mut reader = ReaderBuilder::new().from_reader(text.as_bytes());
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let code = require_column(&headers, CODE_COLUMN, path)?;
    let subsector = require_column(&headers, SUBSECTOR_COLUMN, path)?;
    let gas = require_column(&headers, GAS_COLUMN, path)?;
    let year_label = year.to_string();
    let value = require_column(&headers, &year_label, path)?;

    let mut records = Vec::new();
    let mut scanned = 0usize;
    for record in reader.records() {
        let record = record?;
        scanned += 1;
        let cell = |index: usize| record.get(index).unwrap_or_default();
        if cell(code) != iso_alpha_3 {
            continue;
        }

        records.push(EdgarRecord {
            edgar_class: edgar_class(cell(subsector), cell(gas)),
            year,
            edgar_values: parse_number(&year_label, cell(value))?,
        });
    }

    if records.is_empty() {
        warn!(
            scanned,
            "no reference rows matched the country code; every class will be unmatched"
        );
    } else {
        info!(record_count = records.len(), scanned, "reference inventory reshaped");
    }
    debug!(
        unset = records.iter().filter(|r| r.edgar_values.is_none()).count(),
        "reference cells without a value"
    );
    Ok(records)
}
