use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use enn_eval::pipeline::{self, CompareArgs, RunArgs, ShowArgs};

/// enn-eval: evaluate and compare epistemic image classifiers.
#[derive(Parser)]
#[command(name = "enn-eval", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate every configured model on the batch and print the table.
    Run {
        /// Path to eval config TOML file.
        #[arg(long, default_value = "configs/eval.toml")]
        config: PathBuf,
        /// Override the number of epistemic samples per model.
        #[arg(long)]
        num_samples: Option<usize>,
        /// Override the sampler seed.
        #[arg(long)]
        seed: Option<u64>,
        /// Write the long-form (model, metric, value) table. `.json` or Parquet.
        #[arg(long)]
        long_form: Option<PathBuf>,
        /// Write a JSON report for later `compare`.
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Print a results table from a long-form Parquet file.
    Show {
        /// Path to the long-form Parquet file.
        #[arg(long)]
        input: PathBuf,
        /// Output as JSON instead of a text table.
        #[arg(long)]
        json: bool,
    },
    /// Merge saved reports and compare their models.
    Compare {
        /// Paths to report JSON files.
        #[arg(long, required = true, num_args = 1..)]
        reports: Vec<PathBuf>,
        /// Write the merged long-form table.
        #[arg(long)]
        long_form: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            config,
            num_samples,
            seed,
            long_form,
            report,
        } => pipeline::run_eval(RunArgs {
            config,
            num_samples,
            seed,
            long_form,
            report,
        }),
        Command::Show { input, json } => pipeline::run_show(ShowArgs { input, json }),
        Command::Compare { reports, long_form } => {
            pipeline::run_compare(CompareArgs { reports, long_form })
        }
    }
}
