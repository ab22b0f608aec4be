use std::collections::BTreeSet;
use std::path::Path;

use tracing::{debug, info, instrument};

use crate::emissions::diff::aggregate::{self, Aggregation};
use crate::emissions::diff::config::ReportConfig;
use crate::emissions::diff::error::Result;
use crate::emissions::diff::io::{edgar, excel_write, mapping, report_csv};
use crate::emissions::diff::model::{
    DetailedDiffRow, EdgarRecord, MappingRow, SimulationTable, SubsectorDiffRow,
};
use crate::emissions::diff::report;

/// Both reports of a run together with the schema drift diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffReports {
    pub detailed: Vec<DetailedDiffRow>,
    pub subsector: Vec<SubsectorDiffRow>,
    /// Mapped variables that the simulation output does not provide.
    pub missing_variables: BTreeSet<String>,
}

impl DiffReports {
    /// Writes both reports into a single Excel workbook.
    pub fn write_workbook(&self, path: &Path) -> Result<()> {
        excel_write::write_report_workbook(path, &self.detailed, &self.subsector)
    }
}

/// Compares simulation output against the EDGAR inventory for one country,
/// one reference year, and one simulation entity.
#[derive(Debug, Clone)]
pub struct SectoralDiffReport {
    config: ReportConfig,
}

impl SectoralDiffReport {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    pub fn load_mapping_table(&self) -> Result<Vec<MappingRow>> {
        mapping::load_mapping_table(&self.config.mapping_table_path())
    }

    pub fn filter_simulation(&self, simulation: &SimulationTable) -> SimulationTable {
        aggregate::filter_simulation(
            simulation,
            self.config.init_year,
            self.config.ref_year,
            self.config.ref_primary_id,
        )
    }

    pub fn edgar_data_etl(&self) -> Result<Vec<EdgarRecord>> {
        edgar::edgar_data_etl(
            &self.config.edgar_file_path(),
            &self.config.iso_alpha_3,
            self.config.ref_year,
        )
    }

    pub fn calculate_emission_totals(
        &self,
        simulation: &SimulationTable,
        mapping: &[MappingRow],
    ) -> Aggregation {
        aggregate::calculate_emission_totals(simulation, mapping)
    }

    pub fn generate_detailed_diff_report(
        &self,
        aggregation: &Aggregation,
        edgar: &[EdgarRecord],
    ) -> Vec<DetailedDiffRow> {
        report::generate_detailed_diff_report(&aggregation.rows, edgar, self.config.ref_year)
    }

    pub fn generate_subsector_diff_report(
        &self,
        detailed: &[DetailedDiffRow],
    ) -> Vec<SubsectorDiffRow> {
        report::generate_subsector_diff_report(detailed, self.config.ref_year)
    }

    /// Runs every stage for `simulation`, writes the detailed and subsector
    /// CSV reports under the configured directory, and returns them.
    ///
    /// Both documents are rendered before either file is written, and they
    /// are moved into place together, so a failed run leaves no report files
    /// behind.
    #[instrument(
        level = "info",
        skip_all,
        fields(
            iso_alpha_3 = %self.config.iso_alpha_3,
            ref_year = self.config.ref_year,
            ref_primary_id = self.config.ref_primary_id
        )
    )]
    pub fn generate_diff_reports(&self, simulation: &SimulationTable) -> Result<DiffReports> {
        let mapping = self.load_mapping_table()?;
        let slice = self.filter_simulation(simulation);
        let edgar = self.edgar_data_etl()?;
        let aggregation = self.calculate_emission_totals(&slice, &mapping);
        let detailed = self.generate_detailed_diff_report(&aggregation, &edgar);
        let subsector = self.generate_subsector_diff_report(&detailed);

        let detailed_csv = report_csv::render_detailed(&detailed)?;
        let subsector_csv = report_csv::render_subsector(&subsector)?;
        let detailed_path = self.config.detailed_report_path();
        let subsector_path = self.config.subsector_report_path();
        report_csv::write_reports(&[
            (detailed_path.clone(), detailed_csv),
            (subsector_path.clone(), subsector_csv),
        ])?;
        debug!(
            detailed = %detailed_path.display(),
            subsector = %subsector_path.display(),
            "reports written"
        );

        info!(
            detailed_rows = detailed.len(),
            subsector_rows = subsector.len(),
            missing_variables = aggregation.missing_variables.len(),
            "diff reports generated"
        );
        Ok(DiffReports {
            detailed,
            subsector,
            missing_variables: aggregation.missing_variables,
        })
    }
}
