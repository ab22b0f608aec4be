use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sectoral_diff::config::ReportConfig;
use sectoral_diff::io::simulation;
use sectoral_diff::pipeline::SectoralDiffReport;
use sectoral_diff::{DiffError, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging().and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| DiffError::Logging(err.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Report(args) => execute_report(args),
    }
}

fn execute_report(args: ReportArgs) -> Result<()> {
    let config = args.resolve_config()?;
    let simulation = simulation::read_simulation(&args.simulation)?;
    let reports = SectoralDiffReport::new(config).generate_diff_reports(&simulation)?;

    if let Some(path) = &args.workbook {
        reports.write_workbook(path)?;
        info!(path = %path.display(), "report workbook written");
    }

    if args.json {
        let payload = serde_json::json!({
            "detailed": reports.detailed,
            "subsector": reports.subsector,
            "missing_variables": reports.missing_variables,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    }
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Compare simulated emissions against the EDGAR inventory by sector and gas."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the detailed and subsector diff reports.
    Report(ReportArgs),
}

#[derive(clap::Args)]
struct ReportArgs {
    /// Simulation output table (CSV, or the first sheet of an .xlsx file).
    #[arg(long)]
    simulation: PathBuf,

    /// JSON file providing the report settings. Flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the mapping table and inventory; reports go here too.
    #[arg(long)]
    misc_dir: Option<PathBuf>,

    /// ISO 3166-1 alpha-3 country code.
    #[arg(long)]
    iso_alpha_3: Option<String>,

    /// Calendar year of simulation time period 0.
    #[arg(long)]
    init_year: Option<i32>,

    /// Reference year to compare (defaults to 2015).
    #[arg(long)]
    ref_year: Option<i32>,

    /// Simulation entity to compare (defaults to 0).
    #[arg(long)]
    ref_primary_id: Option<i64>,

    /// Also write both reports into this Excel workbook.
    #[arg(long)]
    workbook: Option<PathBuf>,

    /// Print the reports as JSON on stdout.
    #[arg(long)]
    json: bool,
}

impl ReportArgs {
    fn resolve_config(&self) -> Result<ReportConfig> {
        let mut config = match &self.config {
            Some(path) => {
                if !path.exists() {
                    return Err(DiffError::MissingInput(path.clone()));
                }
                ReportConfig::from_json_file(path)?
            }
            None => ReportConfig::new(
                self.misc_dir
                    .clone()
                    .ok_or(DiffError::MissingSetting("misc_dir"))?,
                self.iso_alpha_3
                    .clone()
                    .ok_or(DiffError::MissingSetting("iso_alpha_3"))?,
                self.init_year.ok_or(DiffError::MissingSetting("init_year"))?,
            ),
        };

        if let Some(misc_dir) = &self.misc_dir {
            config.misc_dir_path = misc_dir.clone();
        }
        if let Some(iso_alpha_3) = &self.iso_alpha_3 {
            config.iso_alpha_3 = iso_alpha_3.clone();
        }
        if let Some(init_year) = self.init_year {
            config.init_year = init_year;
        }
        if let Some(ref_year) = self.ref_year {
            config.ref_year = ref_year;
        }
        if let Some(ref_primary_id) = self.ref_primary_id {
            config.ref_primary_id = ref_primary_id;
        }
        Ok(config)
    }
}
