use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use color_eyre::eyre::WrapErr;
use fraudsim::settings::{self, Overrides};
use fraudsim::{default_data_dir, default_settings_path, init_logging, run_pipeline, write_report};
use fraudsim_core::SimConfig;

#[derive(Parser, Debug)]
#[command(name = "fraudsim")]
#[command(about = "Monte Carlo simulator for fraud losses and detection trade-offs")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the analysis and write a report
    Run(RunArgs),
    /// Interactive terminal dashboard
    Dashboard {
        /// Settings file (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Log level (debug, info, warn, error)
        #[arg(short, long, default_value = "info")]
        log_level: String,
    },
    /// Write the default settings file
    InitConfig {
        /// Destination (default: ~/.fraudsim/settings.yaml)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },
}

#[derive(ClapArgs, Debug)]
struct RunArgs {
    /// Settings file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory for the report artifacts
    #[arg(short, long, default_value = "out")]
    out: PathBuf,

    /// Number of Monte Carlo paths
    #[arg(long)]
    paths: Option<usize>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Base fraud rate per transaction
    #[arg(long)]
    fraud_rate: Option<f64>,

    /// Fraction of frauds detected (ignored when a model quality is set)
    #[arg(long)]
    detection_rate: Option<f64>,

    /// Fraud model AUC; enables threshold-derived detection
    #[arg(long)]
    auc: Option<f64>,

    /// Fraud model alerting threshold
    #[arg(long)]
    threshold: Option<f64>,

    /// Horizon in months
    #[arg(long)]
    horizon: Option<u32>,

    /// Latin-hypercube samples for parameter uncertainty (0 to skip)
    #[arg(long, default_value_t = 0)]
    lhs_samples: usize,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

impl RunArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            n_paths: self.paths,
            seed: self.seed,
            base_fraud_rate: self.fraud_rate,
            detection_rate: self.detection_rate,
            auc: self.auc,
            threshold: self.threshold,
            horizon_months: self.horizon,
        }
    }
}

fn run(args: RunArgs) -> color_eyre::Result<()> {
    init_logging(&default_data_dir(), &args.log_level, true)?;

    let config = settings::resolve(args.config.as_deref(), &args.overrides())?;
    let artifacts = run_pipeline(&config, args.lhs_samples).wrap_err("simulation failed")?;
    let report_path = write_report(&artifacts, &args.out)
        .wrap_err_with(|| format!("failed to write report to {}", args.out.display()))?;

    println!("Report written to {}", report_path.display());
    Ok(())
}

fn dashboard(config: Option<PathBuf>, log_level: &str) -> color_eyre::Result<()> {
    init_logging(&default_data_dir(), log_level, false)?;

    let config = settings::resolve(config.as_deref(), &Overrides::default())?;
    fraudsim::dashboard::run(config)
}

fn init_config(path: Option<PathBuf>) -> color_eyre::Result<()> {
    let path = path.unwrap_or_else(default_settings_path);
    settings::save_settings(&path, &SimConfig::default())?;
    println!("Settings written to {}", path.display());
    Ok(())
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    match args.command {
        Command::Run(run_args) => run(run_args),
        Command::Dashboard { config, log_level } => dashboard(config, &log_level),
        Command::InitConfig { path } => init_config(path),
    }
}
