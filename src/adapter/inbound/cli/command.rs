//! Command-line interface definitions.
//!
//! Defines the CLI structure using `clap`: `solve` runs the decomposition or
//! the monolithic model on one instance, `inspect` summarizes an instance.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::adapter::inbound::instance::InstanceFormat;
use crate::application::benders::BendersMode;

/// Benders decomposition for capacitated lot sizing
#[derive(Parser, Debug)]
#[command(name = "lotsizing-benders")]
#[command(version, about)]
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

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
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
    /// Solve an instance
    Solve(SolveArgs),

    /// Print instance dimensions and derived quantities
    Inspect(InspectArgs),
}

impl Commands {
    /// Configuration file requested by the subcommand, if any.
    #[must_use]
    pub fn config_path(&self) -> Option<&Path> {
        match self {
            Self::Solve(args) => args.config.as_deref(),
            Self::Inspect(_) => None,
        }
    }
}

/// Solution method selected on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Algorithm {
    /// Benders with repeated master MIP solves
    Loop,
    /// Benders with cuts injected during one branch-and-bound
    Callback,
    /// Monolithic MIP without decomposition
    Mip,
}

impl Algorithm {
    /// Decomposition mode for the Benders algorithms.
    #[must_use]
    pub const fn benders_mode(self) -> Option<BendersMode> {
        match self {
            Self::Loop => Some(BendersMode::Loop),
            Self::Callback => Some(BendersMode::Callback),
            Self::Mip => None,
        }
    }
}

/// Arguments for the `solve` subcommand.
#[derive(Parser, Debug)]
pub struct SolveArgs {
    /// Instance file.
    #[arg(short, long)]
    pub instance: PathBuf,

    /// Instance layout [trigeiro, large].
    #[arg(short, long, default_value = "trigeiro")]
    pub format: InstanceFormat,

    /// Solution method. Defaults to the mode in the configuration file.
    #[arg(short, long, value_enum)]
    pub algorithm: Option<Algorithm>,

    /// Path to a TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the `inspect` subcommand.
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Instance file.
    #[arg(short, long)]
    pub instance: PathBuf,

    /// Instance layout [trigeiro, large].
    #[arg(short, long, default_value = "trigeiro")]
    pub format: InstanceFormat,
}
