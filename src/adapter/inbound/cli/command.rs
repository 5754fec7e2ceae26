//! Command-line interface definitions.
//!
//! Defines the CLI structure for the datasolver binary using `clap`.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Compile database-backed optimization problems and solve them
#[derive(Parser, Debug)]
#[command(name = "datasolver")]
#[command(version)]
pub struct Cli {
    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile a problem file and solve it
    Solve(SolveArgs),

    /// Compile a problem file and print the model without solving
    Check(CheckArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Subcommands for `datasolver config`.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Validate a configuration file
    Validate(ConfigPathArg),
}

/// Shared argument for commands that only need a config path.
#[derive(Args, Debug)]
pub struct ConfigPathArg {
    /// Path to configuration file [default: datasolver.toml if present]
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the `solve` subcommand.
#[derive(Args, Debug)]
pub struct SolveArgs {
    /// Problem definition file
    pub problem: PathBuf,

    #[command(flatten)]
    pub config: ConfigPathArg,

    /// Time limit in seconds, overriding the configuration
    #[arg(long, value_name = "SECS")]
    pub time_limit: Option<f64>,
}

/// Arguments for the `check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Problem definition file
    pub problem: PathBuf,

    #[command(flatten)]
    pub config: ConfigPathArg,
}
