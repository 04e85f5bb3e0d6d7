use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "BDSS CLI - Runs, evaluates and validates layered workflows driven by multi-criteria optimizers.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Optimize a workflow with the MCO strategy named in its model.
    Run(RunArgs),
    /// Evaluate a workflow once for parameter values read from standard input.
    Evaluate(EvaluateArgs),
    /// Check a workflow for structural errors without running it.
    Validate(ValidateArgs),
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the workflow file (JSON).
    #[arg(value_name = "WORKFLOW")]
    pub workflow: PathBuf,

    /// Path to a TOML run configuration overriding the MCO settings of the workflow.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Seed for the weight sampler and random backends, overriding the config file.
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Number of weight divisions for the weighted MCO, overriding the config file.
    #[arg(short = 'n', long, value_name = "NUM")]
    pub num_points: Option<usize>,

    /// Print the progress bar only, without one line per optimal point.
    #[arg(long)]
    pub no_points: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S mco.budget=50
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `evaluate` subcommand.
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Path to the workflow file (JSON).
    #[arg(value_name = "WORKFLOW")]
    pub workflow: PathBuf,
}

/// Arguments for the `validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the workflow file (JSON).
    #[arg(value_name = "WORKFLOW")]
    pub workflow: PathBuf,

    /// Treat warnings as errors.
    #[arg(long)]
    pub strict: bool,
}
