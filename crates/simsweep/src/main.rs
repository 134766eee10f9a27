//! simsweep - parameter sweep driver for external stochastic executables
//!
//! Usage:
//!   simsweep run --plan sweep.yaml                     # Run the sweep
//!   simsweep run --plan sweep.yaml --strict            # Nonzero exit on trial failures
//!   simsweep run --plan sweep.yaml --summary-json s.json
//!   simsweep shape --plan sweep.yaml --table results/sweep.csv

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod commands;
mod logging;
mod plan;

#[derive(Parser, Debug)]
#[command(name = "simsweep")]
#[command(about = "Sweep an external executable across a grid of named parameters")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Execute the sweep described by a plan file
    Run {
        /// Path to the YAML sweep plan
        #[arg(long)]
        plan: PathBuf,

        /// Override the plan's result directory
        #[arg(long)]
        results_dir: Option<PathBuf>,

        /// Override the plan's concurrent process cap
        #[arg(long)]
        max_processes: Option<usize>,

        /// Exit nonzero when any trial failed
        #[arg(long)]
        strict: bool,

        /// Write a machine-readable outcome summary to this path
        #[arg(long, value_name = "PATH")]
        summary_json: Option<PathBuf>,
    },

    /// Reshape a persisted result table against its plan
    Shape {
        /// Path to the YAML sweep plan
        #[arg(long)]
        plan: PathBuf,

        /// Path to the CSV result table
        #[arg(long)]
        table: PathBuf,
    },
}

fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();
    logging::init_logging(&cli.log_level);

    match cli.command {
        Commands::Run {
            plan,
            results_dir,
            max_processes,
            strict,
            summary_json,
        } => commands::run_sweep(
            &plan,
            results_dir,
            max_processes,
            strict,
            summary_json.as_deref(),
        ),
        Commands::Shape { plan, table } => commands::show_shape(&plan, &table),
    }
}
