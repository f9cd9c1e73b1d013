use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Pluvio rolling-window quantile delta mapping.
#[derive(Parser)]
#[command(
    name = "pluvio",
    version,
    about = "Rolling-window quantile delta mapping for daily precipitation"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Bias-correct one model run against the reference.
    Correct(CorrectArgs),
    /// Print the target-year window table without reading any data.
    Plan(PlanArgs),
}

/// Arguments for the `correct` subcommand.
#[derive(clap::Args)]
pub struct CorrectArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "pluvio.toml")]
    pub config: PathBuf,

    /// Index (0-based) of the historical input processed by this run.
    #[arg(short, long, default_value_t = 0)]
    pub job: usize,

    /// Model-historical inputs; overrides `[io].historical`.
    pub inputs: Vec<PathBuf>,

    /// Override global RNG seed from config.
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Override output directory from config.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

/// Arguments for the `plan` subcommand.
#[derive(clap::Args)]
pub struct PlanArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "pluvio.toml")]
    pub config: PathBuf,
}
