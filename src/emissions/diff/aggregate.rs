//! Selection of the simulation slice and mapping-driven aggregation.

use std::collections::BTreeSet;

use tracing::{debug, info, instrument, warn};

use crate::emissions::diff::model::{AggregatedRow, MappingRow, SimulationTable};

/// Result of applying the mapping to a simulation slice.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    /// Mapping rows in their original order, each with its simulated total.
    pub rows: Vec<AggregatedRow>,
    /// Variables referenced by the mapping but absent from the simulation.
    pub missing_variables: BTreeSet<String>,
}

/// Keeps the records whose calendar year (`time_period + init_year`) equals
/// `ref_year` and whose entity equals `ref_primary_id`. The input is left
/// untouched; the returned table keeps every variable column even when no
/// record survives.
#[instrument(level = "info", skip(simulation), fields(input_records = simulation.len()))]
pub fn filter_simulation(
    simulation: &SimulationTable,
    init_year: i32,
    ref_year: i32,
    ref_primary_id: i64,
) -> SimulationTable {
    let slice = simulation.retain_records(|record| {
        record.primary_id == ref_primary_id
            && record
                .time_period
                .checked_add(i64::from(init_year))
                .is_some_and(|year| year == i64::from(ref_year))
    });
    if slice.is_empty() {
        warn!("no simulation records match the reference year and entity");
    } else {
        debug!(record_count = slice.len(), "simulation slice selected");
    }
    slice
}

/// Sums, for every mapping row, each of its variables present in the slice
/// across every slice record, then across those variables. Rows with no
/// present variable total zero.
///
/// A variable listed by several rows is summed into each of them. NaN cells
/// are skipped. Variables absent from the slice's columns are collected once
/// each and logged as a schema drift warning.
#[instrument(level = "info", skip_all, fields(mapping_rows = mapping.len()))]
pub fn calculate_emission_totals(
    simulation: &SimulationTable,
    mapping: &[MappingRow],
) -> Aggregation {
    let mut missing_variables = BTreeSet::new();
    let mut rows = Vec::with_capacity(mapping.len());

    for mapping_row in mapping {
        let mut matching_columns = Vec::with_capacity(mapping_row.vars.len());
        for var in &mapping_row.vars {
            match simulation.column_index(var) {
                Some(index) => matching_columns.push(index),
                None => {
                    missing_variables.insert(var.clone());
                }
            }
        }

        // Column totals first, then the sum of those totals.
        let simulation_values = matching_columns
            .iter()
            .map(|&index| {
                simulation
                    .records()
                    .iter()
                    .map(|record| record.values[index])
                    .filter(|value| !value.is_nan())
                    .sum::<f64>()
            })
            .fold(0.0, |total, column_total| total + column_total);

        rows.push(AggregatedRow {
            mapping: mapping_row.clone(),
            simulation_values,
        });
    }

    if missing_variables.is_empty() {
        info!("every mapped variable is present in the simulation output");
    } else {
        warn!(
            missing_count = missing_variables.len(),
            missing_variables = ?missing_variables,
            "mapped variables are not present in the simulation output"
        );
    }

    Aggregation {
        rows,
        missing_variables,
    }
}
