//! Command-line interface.
//!
//! [`run`] applies the global flags, loads configuration, initializes
//! logging and dispatches to the subcommand handlers.

pub mod command;
pub mod inspect;
pub mod output;
pub mod solve;

use anyhow::Context;

use command::{Cli, ColorChoice, Commands};
use crate::infrastructure::config::settings::Config;

/// Execute a parsed command line.
///
/// # Errors
///
/// Returns an error if configuration loading or the subcommand fails.
pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.color {
        ColorChoice::Auto => owo_colors::unset_override(),
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
    }
    output::configure(output::OutputConfig::new(cli.json, cli.quiet, cli.verbose));

    let mut config = match cli.command.config_path() {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    match (cli.quiet, cli.verbose) {
        (true, _) => config.logging.level = "error".into(),
        (false, 0) => {}
        (false, 1) => config.logging.level = "debug".into(),
        (false, _) => config.logging.level = "trace".into(),
    }
    config.init_logging();

    match &cli.command {
        Commands::Solve(args) => solve::execute(args, &config)
            .with_context(|| format!("failed to solve {}", args.instance.display()))?,
        Commands::Inspect(args) => inspect::execute(args)
            .with_context(|| format!("failed to inspect {}", args.instance.display()))?,
    }
    Ok(())
}
