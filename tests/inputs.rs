use std::fs;
use std::path::PathBuf;

use calamine::{DataType, Reader, Xlsx, open_workbook};
use rust_xlsxwriter::Workbook;
use sectoral_diff::DiffError;
use sectoral_diff::config::ReportConfig;
use sectoral_diff::io::{edgar, mapping, simulation};
use sectoral_diff::model::{SimulationRecord, SimulationTable};
use sectoral_diff::pipeline::SectoralDiffReport;
use tempfile::tempdir;

#[test]
fn mapping_keeps_file_order_and_splits_vars() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("mapping.csv");
    fs::write(
        &path,
        "Sector,Subsector,Vars,Edgar_Class,Notes\n\
         Waste,Landfill,CH4_LANDFILL,Landfill:CH4,\n\
         Energy,Power,co2_coal:CO2_GAS,Power:CO2,mixed case\n\
         Energy,Power,,Power:N2O,\n",
    )
    .expect("mapping written");

    let rows = mapping::load_mapping_table(&path).expect("mapping loaded");

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].subsector, "Landfill");
    assert_eq!(rows[1].vars, vec!["co2_coal".to_string(), "CO2_GAS".to_string()]);
    assert_eq!(rows[1].edgar_class, "Power:CO2");
    assert!(rows[2].vars.is_empty());
}

#[test]
fn mapping_headers_are_matched_without_surrounding_whitespace() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("mapping.csv");
    fs::write(
        &path,
        "Sector, Subsector, Vars, Edgar_Class\nEnergy,Power,CO2_COAL,Power:CO2\n",
    )
    .expect("mapping written");

    let rows = mapping::load_mapping_table(&path).expect("mapping loaded");

    assert_eq!(rows[0].subsector, "Power");
    assert_eq!(rows[0].vars, vec!["CO2_COAL".to_string()]);
    assert_eq!(rows[0].edgar_class, "Power:CO2");
}

#[test]
fn mapping_without_class_column_derives_it_from_gas() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("mapping.csv");
    fs::write(&path, "Sector,Subsector,Gas,Vars\nEnergy,Power,CO2,CO2_COAL\n")
        .expect("mapping written");

    let rows = mapping::load_mapping_table(&path).expect("mapping loaded");

    assert_eq!(rows[0].edgar_class, "Power:CO2");
    assert_eq!(rows[0].sector, "Energy");
}

#[test]
fn mapping_schema_errors_name_the_column() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("mapping.csv");

    fs::write(&path, "Sector,Subsector,Edgar_Class\nEnergy,Power,Power:CO2\n")
        .expect("mapping written");
    match mapping::load_mapping_table(&path) {
        Err(DiffError::MissingColumn { column, .. }) => assert_eq!(column, "Vars"),
        other => panic!("unexpected result: {other:?}"),
    }

    fs::write(&path, "Sector,Subsector,Vars\nEnergy,Power,CO2_COAL\n").expect("mapping written");
    match mapping::load_mapping_table(&path) {
        Err(DiffError::MissingColumn { column, .. }) => assert_eq!(column, "Edgar_Class"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn missing_mapping_file_reports_its_path() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("mapping.csv");

    match mapping::load_mapping_table(&path) {
        Err(DiffError::Read { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn inventory_is_decoded_as_latin1_and_filtered_by_exact_code() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("inventory.csv");
    let mut bytes = b"Code,CSC Subsector,Gas,2015,2016\n".to_vec();
    bytes.extend_from_slice(b"MEX,Energ\xeda,CO2,12.5,13\n");
    bytes.extend_from_slice(b"MEX,Waste,CH4,,4\n");
    bytes.extend_from_slice(b"mex,Waste,N2O,1,1\n");
    bytes.extend_from_slice(b"USA,Waste,CH4,99,98\n");
    fs::write(&path, bytes).expect("inventory written");

    let records = edgar::edgar_data_etl(&path, "MEX", 2015).expect("inventory loaded");

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].edgar_class, "Energía:CO2");
    assert_eq!(records[0].year, 2015);
    assert_eq!(records[0].edgar_values, Some(12.5));
    assert_eq!(records[1].edgar_class, "Waste:CH4");
    assert_eq!(records[1].edgar_values, None);
}

#[test]
fn inventory_decoding_maps_every_byte_to_the_same_code_point() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("inventory.csv");
    fs::write(&path, b"Code,CSC Subsector,Gas,2015\nMEX,Fuel\x92s,CO2,1\n")
        .expect("inventory written");

    let records = edgar::edgar_data_etl(&path, "MEX", 2015).expect("inventory loaded");

    assert_eq!(records[0].edgar_class, "Fuel\u{92}s:CO2");
}

#[test]
fn inventory_rejects_non_numeric_values() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("inventory.csv");
    fs::write(&path, "Code,CSC Subsector,Gas,2015\nMEX,Waste,CH4,n/a\n")
        .expect("inventory written");

    match edgar::edgar_data_etl(&path, "MEX", 2015) {
        Err(DiffError::InvalidValue { column, value }) => {
            assert_eq!(column, "2015");
            assert_eq!(value, "n/a");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn simulation_csv_reads_wide_layout() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("simulation.csv");
    fs::write(
        &path,
        "primary_id,time_period,CO2_A,CO2_B\n0,5.0,10,\n1,5,2.5,1\n",
    )
    .expect("simulation written");

    let table = simulation::read_simulation(&path).expect("simulation loaded");

    assert_eq!(table.variables(), ["CO2_A".to_string(), "CO2_B".to_string()]);
    assert_eq!(table.len(), 2);
    let first = &table.records()[0];
    assert_eq!((first.time_period, first.primary_id), (5, 0));
    assert_eq!(first.values[0], 10.0);
    assert!(first.values[1].is_nan());
    assert_eq!(table.column_index("CO2_B"), Some(1));
    assert_eq!(table.column_index("co2_b"), None);
}

#[test]
fn repeated_variable_column_resolves_to_first_occurrence() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("simulation.csv");
    fs::write(&path, "time_period,primary_id,CO2_A,CO2_A\n5,0,1,2\n")
        .expect("simulation written");

    let table = simulation::read_simulation(&path).expect("simulation loaded");

    assert_eq!(table.column_index("CO2_A"), Some(0));
    assert_eq!(table.records()[0].values, vec![1.0, 2.0]);
}

#[test]
fn simulation_requires_identifier_columns() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("simulation.csv");
    fs::write(&path, "time_period,CO2_A\n5,1\n").expect("simulation written");

    match simulation::read_simulation(&path) {
        Err(DiffError::MissingColumn { column, .. }) => assert_eq!(column, "primary_id"),
        other => panic!("unexpected result: {other:?}"),
    }

    match simulation::read_simulation(&temp_dir.path().join("absent.csv")) {
        Err(DiffError::MissingInput(_)) => {}
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn simulation_workbook_matches_csv_semantics() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("simulation.xlsx");
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (col, header) in ["time_period", "primary_id", "CO2_A"].iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *header)
            .expect("header written");
    }
    worksheet.write_number(1, 0, 5.0).expect("cell written");
    worksheet.write_number(1, 1, 0.0).expect("cell written");
    worksheet.write_number(1, 2, 7.5).expect("cell written");
    worksheet.write_number(2, 0, 5.0).expect("cell written");
    worksheet.write_number(2, 1, 0.0).expect("cell written");
    workbook.save(&path).expect("workbook saved");

    let table = simulation::read_simulation(&path).expect("workbook loaded");

    assert_eq!(table.variables(), ["CO2_A".to_string()]);
    assert_eq!(table.len(), 2);
    assert_eq!(table.records()[0].values, vec![7.5]);
    assert!(table.records()[1].values[0].is_nan());
}

#[test]
fn record_width_must_match_variables() {
    let result = SimulationTable::from_records(
        vec!["CO2_A".to_string()],
        vec![SimulationRecord::new(0, 0, vec![1.0, 2.0])],
    );

    match result {
        Err(DiffError::RecordWidth { expected, found }) => assert_eq!((expected, found), (1, 2)),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn config_file_applies_defaults() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("config.json");
    fs::write(
        &path,
        r#"{"misc_dir_path": "/data/misc", "iso_alpha_3": "MEX", "init_year": 2015}"#,
    )
    .expect("config written");

    let config = ReportConfig::from_json_file(&path).expect("config loaded");

    assert_eq!(config, ReportConfig::new("/data/misc", "MEX", 2015));
    assert_eq!(config.ref_year, 2015);
    assert_eq!(config.ref_primary_id, 0);
    assert_eq!(
        config.subsector_report_path(),
        PathBuf::from("/data/misc/subsector_diff_report_all-sectors.csv")
    );
}

#[test]
fn report_workbook_holds_both_reports() {
    let temp_dir = tempdir().expect("temporary directory");
    fs::write(
        temp_dir.path().join("mapping.csv"),
        "Sector,Subsector,Vars,Edgar_Class\nEnergy,Power,CO2_A,Power:CO2\nEnergy,Power,CH4_A,Power:CH4\n",
    )
    .expect("mapping written");
    fs::write(
        temp_dir.path().join("CSC-GHG_emissions-April2024_to_calibrate.csv"),
        "Code,CSC Subsector,Gas,2020\nMEX,Power,CO2,8\n",
    )
    .expect("inventory written");
    let table = SimulationTable::from_records(
        vec!["CO2_A".to_string(), "CH4_A".to_string()],
        vec![SimulationRecord::new(0, 3, vec![10.0, 1.0])],
    )
    .expect("simulation table built");
    let config = ReportConfig::new(temp_dir.path(), "MEX", 2020)
        .with_ref_year(2020)
        .with_ref_primary_id(3);

    let reports = SectoralDiffReport::new(config)
        .generate_diff_reports(&table)
        .expect("reports generated");
    let xlsx_path = temp_dir.path().join("reports.xlsx");
    reports.write_workbook(&xlsx_path).expect("workbook written");

    let mut workbook: Xlsx<_> = open_workbook(&xlsx_path).expect("workbook opened");
    let detailed = workbook
        .worksheet_range("Detailed")
        .expect("detailed sheet present")
        .expect("detailed sheet read");
    assert_eq!(detailed.get_size(), (3, 6));
    assert_eq!(
        detailed.get_value((0, 2)),
        Some(&DataType::String("Edgar_Class".to_string()))
    );
    assert_eq!(
        detailed.get_value((1, 2)),
        Some(&DataType::String("Power:CH4".to_string()))
    );
    assert_eq!(detailed.get_value((2, 5)), Some(&DataType::Float(0.25)));

    let subsector = workbook
        .worksheet_range("Subsector")
        .expect("subsector sheet present")
        .expect("subsector sheet read");
    assert_eq!(subsector.get_size(), (2, 5));
    assert_eq!(subsector.get_value((1, 2)), Some(&DataType::Float(11.0)));
}
