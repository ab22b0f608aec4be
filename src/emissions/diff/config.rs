use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::emissions::diff::error::{DiffError, Result};

/// File name of the variable → sector/gas mapping table.
pub const MAPPING_FILE: &str = "mapping.csv";
/// File name of the EDGAR reference inventory.
pub const EDGAR_FILE: &str = "CSC-GHG_emissions-April2024_to_calibrate.csv";
/// Report type used to name the output files.
pub const DEFAULT_REPORT_TYPE: &str = "all-sectors";
pub const DEFAULT_REF_YEAR: i32 = 2015;
pub const DEFAULT_REF_PRIMARY_ID: i64 = 0;

/// Settings captured once per run. Every input and output path is derived
/// from `misc_dir_path`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    pub misc_dir_path: PathBuf,
    /// ISO 3166-1 alpha-3 code selecting the inventory rows.
    pub iso_alpha_3: String,
    /// Calendar year of simulation `time_period` 0.
    pub init_year: i32,
    #[serde(default = "default_ref_year")]
    pub ref_year: i32,
    #[serde(default)]
    pub ref_primary_id: i64,
    #[serde(default = "default_report_type")]
    pub report_type: String,
}

fn default_ref_year() -> i32 {
    DEFAULT_REF_YEAR
}

fn default_report_type() -> String {
    DEFAULT_REPORT_TYPE.to_string()
}

impl ReportConfig {
    /// Creates a configuration with the default reference year, entity id,
    /// and report type.
    pub fn new(
        misc_dir_path: impl Into<PathBuf>,
        iso_alpha_3: impl Into<String>,
        init_year: i32,
    ) -> Self {
        Self {
            misc_dir_path: misc_dir_path.into(),
            iso_alpha_3: iso_alpha_3.into(),
            init_year,
            ref_year: DEFAULT_REF_YEAR,
            ref_primary_id: DEFAULT_REF_PRIMARY_ID,
            report_type: default_report_type(),
        }
    }

    pub fn with_ref_year(mut self, ref_year: i32) -> Self {
        self.ref_year = ref_year;
        self
    }

    pub fn with_ref_primary_id(mut self, ref_primary_id: i64) -> Self {
        self.ref_primary_id = ref_primary_id;
        self
    }

    /// Loads a configuration from a JSON document.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path).map_err(|source| DiffError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn mapping_table_path(&self) -> PathBuf {
        self.misc_dir_path.join(MAPPING_FILE)
    }

    pub fn edgar_file_path(&self) -> PathBuf {
        self.misc_dir_path.join(EDGAR_FILE)
    }

    pub fn detailed_report_path(&self) -> PathBuf {
        self.misc_dir_path
            .join(format!("detailed_diff_report_{}.csv", self.report_type))
    }

    pub fn subsector_report_path(&self) -> PathBuf {
        self.misc_dir_path
            .join(format!("subsector_diff_report_{}.csv", self.report_type))
    }
}
