//! knn-sweep - find the best neighbour count for a user-based KNN recommender
//!
//! Usage:
//!   knn-sweep taste_profile                       # sweep the default K grid
//!   knn-sweep taste_profile --k-values 1,5,10     # custom grid
//!   knn-sweep data/plays.tsv --runs 3 --seed 42   # explicit file, fixed seed
//!   knn-sweep taste_profile --format json         # machine-readable result

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use aprender_knn_sweep::config::SweepConfig;
use aprender_knn_sweep::data::TripletLoader;
use aprender_knn_sweep::evaluate::HoldoutEvaluator;
use aprender_knn_sweep::{Result, SweepDriver, SweepResult};

/// Output format for the sweep result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// knn-sweep - K selection for user-based KNN recommenders
///
/// Evaluates each K over repeated cross-validation runs and reports
/// min/avg/max accuracy per K plus the best K.
#[derive(Parser)]
#[command(name = "knn-sweep")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Dataset name (resolved under the data directory) or path
    #[arg(value_name = "DATASET")]
    dataset: String,

    /// Directory holding dataset files
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Comma-separated neighbour counts to sweep
    #[arg(short, long, value_delimiter = ',', value_name = "K,...")]
    k_values: Option<Vec<usize>>,

    /// Runs per K
    #[arg(short, long)]
    runs: Option<usize>,

    /// Cross-validation folds
    #[arg(short, long)]
    folds: Option<usize>,

    /// Items recommended per user
    #[arg(short = 'n', long)]
    recommendations: Option<usize>,

    /// Seed for fold assignment
    #[arg(short, long)]
    seed: Option<u64>,

    /// Assign users to folds in dataset order
    #[arg(long)]
    no_shuffle: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn sweep_config(&self) -> Result<SweepConfig> {
        let mut config = match &self.config {
            Some(path) => SweepConfig::from_file(path)?,
            None => SweepConfig::default(),
        };

        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(k_values) = &self.k_values {
            config = config.with_k_values(k_values.clone());
        }
        if let Some(runs) = self.runs {
            config = config.with_runs(runs);
        }
        if let Some(folds) = self.folds {
            config = config.with_folds(folds);
        }
        if let Some(n) = self.recommendations {
            config = config.with_num_recommendations(n);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if self.no_shuffle {
            config.shuffle = false;
        }

        Ok(config)
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_result(result: &SweepResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => println!("{result}"),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(result).map_err(std::io::Error::other)?;
            println!("{json}");
        }
    }
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.sweep_config()?;
    debug!(?config, "resolved configuration");

    let loader = TripletLoader::new(&config.data_dir);
    let driver = SweepDriver::new(config, HoldoutEvaluator::new())?;
    let result = driver.run_named(&loader, &cli.dataset)?;

    print_result(&result, cli.format)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error[{}]: {e}", e.kind().as_str());
            e.exit_code()
        }
    }
}
