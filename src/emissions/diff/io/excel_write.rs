use std::path::Path;

use rust_xlsxwriter::{Table, TableColumn, Workbook, Worksheet};
use tracing::instrument;

use crate::emissions::diff::error::Result;
use crate::emissions::diff::io::report_csv::{DETAILED_COLUMNS, SUBSECTOR_COLUMNS};
use crate::emissions::diff::model::{DetailedDiffRow, SubsectorDiffRow};

pub const DETAILED_SHEET: &str = "Detailed";
pub const SUBSECTOR_SHEET: &str = "Subsector";

/// A report cell. Undefined numbers are left blank.
enum Cell<'a> {
    Text(&'a str),
    Number(Option<f64>),
}

/// Writes both reports into one workbook, each sheet holding an
/// auto-filtered table.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn write_report_workbook(
    path: &Path,
    detailed: &[DetailedDiffRow],
    subsector: &[SubsectorDiffRow],
) -> Result<()> {
    let mut workbook_writer = Workbook::new();

    let detailed_rows: Vec<Vec<Cell<'_>>> = detailed
        .iter()
        .map(|row| {
            vec![
                Cell::Number(Some(f64::from(row.year))),
                Cell::Text(&row.subsector),
                Cell::Text(&row.edgar_class),
                Cell::Number(Some(row.simulation_values)),
                Cell::Number(row.edgar_values),
                Cell::Number(row.diff),
            ]
        })
        .collect();
    let worksheet = workbook_writer.add_worksheet();
    write_table(worksheet, DETAILED_SHEET, &DETAILED_COLUMNS, &detailed_rows)?;

    let subsector_rows: Vec<Vec<Cell<'_>>> = subsector
        .iter()
        .map(|row| {
            vec![
                Cell::Number(Some(f64::from(row.year))),
                Cell::Text(&row.subsector),
                Cell::Number(Some(row.simulation_values)),
                Cell::Number(row.edgar_values),
                Cell::Number(row.diff),
            ]
        })
        .collect();
    let worksheet = workbook_writer.add_worksheet();
    write_table(worksheet, SUBSECTOR_SHEET, &SUBSECTOR_COLUMNS, &subsector_rows)?;

    workbook_writer.save(path)?;
    Ok(())
}

fn write_table(
    worksheet: &mut Worksheet,
    sheet_name: &str,
    columns: &[&str],
    rows: &[Vec<Cell<'_>>],
) -> Result<()> {
    worksheet.set_name(sheet_name)?;

    for (col_idx, header) in columns.iter().enumerate() {
        worksheet.write_string(0, col_idx as u16, *header)?;
    }

    for (row_idx, row) in rows.iter().enumerate() {
        let excel_row = (row_idx + 1) as u32;
        for (col_idx, cell) in row.iter().enumerate() {
            match cell {
                Cell::Text(value) => {
                    worksheet.write_string(excel_row, col_idx as u16, *value)?;
                }
                Cell::Number(Some(value)) if value.is_finite() => {
                    worksheet.write_number(excel_row, col_idx as u16, *value)?;
                }
                Cell::Number(_) => {}
            }
        }
    }

    let table_columns: Vec<TableColumn> = columns
        .iter()
        .map(|header| TableColumn::new().set_header(*header))
        .collect();
    let mut excel_table = Table::new();
    excel_table.set_autofilter(true).set_columns(&table_columns);

    let col_end = (columns.len() as u16).saturating_sub(1);
    // A table needs at least one data row below its header.
    let row_end = rows.len().max(1) as u32;
    worksheet.add_table(0, 0, row_end, col_end, &excel_table)?;
    Ok(())
}
