//! CLI module graph.

pub mod check;
pub mod command;
pub mod config;
pub mod diagnostic;
pub mod output;
pub mod solve;

use std::path::{Path, PathBuf};

use command::{Cli, ColorChoice, Commands, ConfigCommand};
use output::OutputConfig;

use crate::infrastructure::config::Config;

/// Configuration file read when `--config` is not given.
pub const DEFAULT_CONFIG: &str = "datasolver.toml";

/// Run a parsed command line.
///
/// # Errors
///
/// Returns a rendered report for any failure; the caller exits non-zero.
pub fn execute(cli: Cli) -> miette::Result<()> {
    apply_color(&cli.color);
    output::configure(OutputConfig::new(cli.json, cli.quiet));

    match cli.command {
        Commands::Solve(args) => solve::execute(&args),
        Commands::Check(args) => check::execute(&args),
        Commands::Config(ConfigCommand::Validate(args)) => config::execute_validate(args.config.as_deref()),
    }
}

fn apply_color(choice: &ColorChoice) {
    let enabled = match choice {
        ColorChoice::Auto => return,
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };
    owo_colors::set_override(enabled);
    let _ = miette::set_hook(Box::new(move |_| {
        Box::new(miette::MietteHandlerOpts::new().color(enabled).build())
    }));
}

/// Load the configuration the command should use.
///
/// An explicit path must exist. Without one, [`DEFAULT_CONFIG`] is used when
/// present and built-in defaults otherwise. Logging is initialised from the
/// result.
///
/// # Errors
///
/// Returns a rendered report if the file cannot be read, parsed or
/// validated.
pub fn load_config(path: Option<&Path>) -> miette::Result<(Config, Option<PathBuf>)> {
    let path = match path {
        Some(path) => Some(path.to_path_buf()),
        None => Some(PathBuf::from(DEFAULT_CONFIG)).filter(|p| p.exists()),
    };

    let config = match &path {
        Some(path) => {
            let content = diagnostic::read_source(path)?;
            Config::parse_toml(&content)
                .map_err(|e| diagnostic::report_in_file(e, path, &content))?
        }
        None => Config::default(),
    };
    config.init_logging();
    Ok((config, path))
}
