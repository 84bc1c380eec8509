use anyhow::Context;
use clap::Parser;
use spandex_coverage::config::Config;
use spandex_coverage::constants::{CONFIG_ENV_VAR, DEFAULT_LOG_DIR};
use spandex_coverage::pipeline::Pipeline;
use spandex_coverage::{logging, metrics, report};
use std::path::PathBuf;
use tracing::{error, info};

/// Extract Spandex suggest request logs, join them with dataset and domain
/// metadata and report index coverage.
#[derive(Parser)]
#[command(name = "spandex_coverage")]
#[command(version)]
struct Cli {
    /// A tab delimited file mapping dataset IDs to FXFs
    #[arg(long, alias = "dataset_id_fxf_map_file")]
    dataset_id_fxf_map_file: Option<PathBuf>,

    /// A tab delimited file mapping FXFs to domains
    #[arg(long, alias = "fxf_domain_map_file")]
    fxf_domain_map_file: Option<PathBuf>,

    /// A file containing the set of dataset IDs currently indexed in Spandex
    #[arg(long, alias = "spandex_dataset_ids")]
    spandex_dataset_ids: Option<PathBuf>,

    /// A Spandex request log file (JSON lines); may be repeated
    #[arg(long = "logfile")]
    logfiles: Vec<PathBuf>,

    /// A directory containing Spandex request log files
    #[arg(long, alias = "logfile_dir")]
    logfile_dir: Option<PathBuf>,

    /// Read previously extracted requests from a snapshot instead of raw logs
    #[arg(long, alias = "log_dataframe", conflicts_with_all = ["logfiles", "logfile_dir"])]
    log_snapshot: Option<PathBuf>,

    /// Where to write the IDs of indexed datasets that received 0 requests
    #[arg(long, alias = "zero_request_datasets")]
    zero_request_datasets: Option<PathBuf>,

    /// Where to write the enriched request snapshot
    #[arg(long, alias = "output_file")]
    output_file: Option<PathBuf>,

    /// TOML config file supplying defaults for any of the above
    #[arg(long, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    /// Directory for the JSON run log
    #[arg(long, default_value = DEFAULT_LOG_DIR)]
    log_dir: PathBuf,

    /// Write run metrics in Prometheus text format to this file
    #[arg(long)]
    metrics_file: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> Config {
        Config {
            dataset_id_fxf_map_file: self.dataset_id_fxf_map_file.clone(),
            fxf_domain_map_file: self.fxf_domain_map_file.clone(),
            spandex_dataset_ids: self.spandex_dataset_ids.clone(),
            logfile_dir: self.logfile_dir.clone(),
            logfiles: self.logfiles.clone(),
            log_snapshot: self.log_snapshot.clone(),
            zero_request_datasets: self.zero_request_datasets.clone(),
            output_file: self.output_file.clone(),
            ..Default::default()
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let settings = Config::load_optional(cli.config.as_deref())
        .context("Failed to load config file")?
        .merge(cli.overrides())
        .resolve()
        .context("Invalid run configuration")?;

    let result = Pipeline::run(&settings).context("Coverage run failed")?;
    print!("{}", report::render(&result));

    if let Some(path) = &cli.metrics_file {
        metrics::write_to_file(path).context("Failed to write metrics file")?;
    }
    Ok(())
}

fn main() {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let guard = match logging::init_logging(&cli.log_dir) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("❌ Failed to initialize logging: {}", e);
            std::process::exit(1);
        }
    };
    metrics::init_metrics();
    info!("Starting Spandex coverage run");

    if let Err(e) = run(&cli) {
        error!("{:#}", e);
        eprintln!("❌ {:#}", e);
        // process::exit skips destructors
        drop(guard);
        std::process::exit(1);
    }
}
