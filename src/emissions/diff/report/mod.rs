//! Two-level roll-up of aggregated simulation totals against the reference.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, instrument};

use crate::emissions::diff::model::{
    AggregatedRow, DetailedDiffRow, EdgarRecord, SubsectorDiffRow,
};

/// Relative difference `(simulation - reference) / reference`.
///
/// Returns `None` when the reference is missing or zero, or when the quotient
/// is not finite.
pub fn relative_difference(simulation: f64, reference: Option<f64>) -> Option<f64> {
    let reference = reference?;
    if reference == 0.0 {
        return None;
    }
    let diff = (simulation - reference) / reference;
    diff.is_finite().then_some(diff)
}

/// Groups the aggregated rows by (Subsector, Edgar_Class), left-joins the
/// reference values on `Edgar_Class`, and computes the relative difference.
///
/// Rows come out sorted by (Subsector, Edgar_Class) and all carry
/// `ref_year`. Classes without a reference match keep `edgar_values = None`.
#[instrument(level = "info", skip(aggregated, edgar), fields(rows = aggregated.len()))]
pub fn generate_detailed_diff_report(
    aggregated: &[AggregatedRow],
    edgar: &[EdgarRecord],
    ref_year: i32,
) -> Vec<DetailedDiffRow> {
    let mut groups: BTreeMap<(&str, &str), f64> = BTreeMap::new();
    for row in aggregated {
        let key = (row.mapping.subsector.as_str(), row.mapping.edgar_class.as_str());
        *groups.entry(key).or_insert(0.0) += row.simulation_values;
    }

    let reference = index_reference(edgar);
    let report: Vec<DetailedDiffRow> = groups
        .into_iter()
        .map(|((subsector, edgar_class), simulation_values)| {
            let edgar_values = reference.get(edgar_class).copied().flatten();
            DetailedDiffRow {
                year: ref_year,
                subsector: subsector.to_string(),
                edgar_class: edgar_class.to_string(),
                simulation_values,
                edgar_values,
                diff: relative_difference(simulation_values, edgar_values),
            }
        })
        .collect();

    debug!(
        classes = report.len(),
        unmatched = report.iter().filter(|row| row.edgar_values.is_none()).count(),
        undefined_diffs = report.iter().filter(|row| row.diff.is_none()).count(),
        "detailed diff built"
    );
    report
}

/// Rolls the detailed report up to one row per Subsector. Simulation and
/// reference values are summed separately before the difference is taken.
#[instrument(level = "info", skip(detailed), fields(rows = detailed.len()))]
pub fn generate_subsector_diff_report(
    detailed: &[DetailedDiffRow],
    ref_year: i32,
) -> Vec<SubsectorDiffRow> {
    let mut groups: BTreeMap<&str, (f64, Option<f64>)> = BTreeMap::new();
    for row in detailed {
        let (simulation, reference) = groups
            .entry(row.subsector.as_str())
            .or_insert((0.0, None));
        *simulation += row.simulation_values;
        *reference = add_present(*reference, row.edgar_values);
    }

    groups
        .into_iter()
        .map(|(subsector, (simulation_values, edgar_values))| SubsectorDiffRow {
            year: ref_year,
            subsector: subsector.to_string(),
            simulation_values,
            edgar_values,
            diff: relative_difference(simulation_values, edgar_values),
        })
        .collect()
}

/// Join index keyed by `Edgar_Class`. Duplicate classes are summed.
fn index_reference(edgar: &[EdgarRecord]) -> HashMap<&str, Option<f64>> {
    let mut index: HashMap<&str, Option<f64>> = HashMap::with_capacity(edgar.len());
    for record in edgar {
        index
            .entry(record.edgar_class.as_str())
            .and_modify(|value| {
                debug!(edgar_class = %record.edgar_class, "duplicate reference class summed");
                *value = add_present(*value, record.edgar_values);
            })
            .or_insert(record.edgar_values);
    }
    index
}

fn add_present(lhs: Option<f64>, rhs: Option<f64>) -> Option<f64> {
    match (lhs, rhs) {
        (Some(lhs), Some(rhs)) => Some(lhs + rhs),
        (Some(value), None) | (None, Some(value)) => Some(value),
        (None, None) => None,
    }
}
