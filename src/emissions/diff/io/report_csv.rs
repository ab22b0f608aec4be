use std::fs;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use serde::Serialize;
use tracing::debug;

use crate::emissions::diff::error::{DiffError, Result};
use crate::emissions::diff::model::{DetailedDiffRow, SubsectorDiffRow};

/// Header of the detailed report, in column order.
pub const DETAILED_COLUMNS: [&str; 6] = [
    "Year",
    "Subsector",
    "Edgar_Class",
    "Simulation_Values",
    "Edgar_Values",
    "diff",
];

/// Header of the subsector report, in column order.
pub const SUBSECTOR_COLUMNS: [&str; 5] = [
    "Year",
    "Subsector",
    "Simulation_Values",
    "Edgar_Values",
    "diff",
];

/// Renders the detailed report as CSV. Undefined values become empty cells.
pub fn render_detailed(rows: &[DetailedDiffRow]) -> Result<Vec<u8>> {
    render(&DETAILED_COLUMNS, rows)
}

/// Renders the subsector report as CSV. Undefined values become empty cells.
pub fn render_subsector(rows: &[SubsectorDiffRow]) -> Result<Vec<u8>> {
    render(&SUBSECTOR_COLUMNS, rows)
}

// The header is written by hand so that an empty report still carries it.
fn render<T: Serialize>(columns: &[&str], rows: &[T]) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(columns)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|err| DiffError::Io(err.into_error()))
}

/// Writes every rendered report or none of them.
///
/// Each document is first written to a `.tmp` sibling and then renamed into
/// place. If any step fails, the staged files and the reports already moved
/// into place by this call are removed.
pub fn write_reports(reports: &[(PathBuf, Vec<u8>)]) -> Result<()> {
    let staged: Vec<PathBuf> = reports
        .iter()
        .map(|(path, _)| staging_path(path))
        .collect();

    for ((_, contents), temp) in reports.iter().zip(&staged) {
        if let Err(source) = fs::write(temp, contents) {
            remove_all(&staged);
            return Err(DiffError::Write {
                path: temp.clone(),
                source,
            });
        }
    }

    for (position, ((path, _), temp)) in reports.iter().zip(&staged).enumerate() {
        if let Err(source) = fs::rename(temp, path) {
            let placed: Vec<PathBuf> = reports[..position]
                .iter()
                .map(|(path, _)| path.clone())
                .collect();
            remove_all(&placed);
            remove_all(&staged[position..]);
            return Err(DiffError::Write {
                path: path.clone(),
                source,
            });
        }
    }
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

fn remove_all(paths: &[PathBuf]) {
    for path in paths {
        if let Err(err) = fs::remove_file(path) {
            debug!(path = %path.display(), error = %err, "cleanup skipped");
        }
    }
}
