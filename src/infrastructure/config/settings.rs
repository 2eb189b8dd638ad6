//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all run settings.
//! Every section is optional; missing fields take their defaults.
//!
//! # Example
//!
//! ```no_run
//! use lotsizing_benders::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use serde::Deserialize;

use super::logging::LoggingConfig;
use super::solver::SolverConfig;
use crate::application::benders::{BendersConfig, StabilizationConfig};
use crate::error::{ConfigError, Result};

/// Main run configuration.
///
/// Load from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// In-out stabilization parameters.
    #[serde(default)]
    pub stabilization: StabilizationConfig,

    /// Driver mode, tolerance and budgets.
    #[serde(default)]
    pub benders: BendersConfig,

    /// LP/MIP backend settings.
    #[serde(default)]
    pub solver: SolverConfig,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The TOML content is malformed
    /// - Validation fails (e.g., `alpha` outside `(0, 1)`)
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Initialize tracing from the `[logging]` section.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(invalid("format", "must be \"pretty\" or \"json\""));
        }

        let stab = &self.stabilization;
        if !(stab.alpha > 0.0 && stab.alpha < 1.0) {
            return Err(invalid("alpha", "must be in (0, 1)"));
        }
        if !(stab.lambda > 0.0 && stab.lambda <= 1.0) {
            return Err(invalid("lambda", "must be in (0, 1]"));
        }
        if !(stab.delta >= 0.0 && stab.delta.is_finite()) {
            return Err(invalid("delta", "must be 0 or greater"));
        }
        if stab.max_iterations == 0 {
            return Err(invalid("stabilization.max_iterations", "must be greater than 0"));
        }
        if stab.improvement_tolerance < 0.0 {
            return Err(invalid("improvement_tolerance", "must be 0 or greater"));
        }

        let benders = &self.benders;
        if !(benders.gap_tolerance > 0.0 && benders.gap_tolerance.is_finite()) {
            return Err(invalid("gap_tolerance", "must be greater than 0"));
        }
        if benders.max_iterations == 0 {
            return Err(invalid("benders.max_iterations", "must be greater than 0"));
        }
        check_time_limit("benders.time_limit_secs", benders.time_limit_secs)?;

        let solver = &self.solver;
        if solver.threads != 1 {
            return Err(invalid(
                "threads",
                "cut separation requires a single solver thread",
            ));
        }
        check_time_limit("solver.time_limit_secs", solver.time_limit_secs)?;
        if !(solver.mip_rel_gap >= 0.0 && solver.mip_rel_gap < 1.0) {
            return Err(invalid("mip_rel_gap", "must be in [0, 1)"));
        }
        if solver.incumbent_limit == Some(0) {
            return Err(invalid("incumbent_limit", "must be greater than 0"));
        }
        if !(solver.cut_tolerance > 0.0 && solver.cut_tolerance.is_finite()) {
            return Err(invalid("cut_tolerance", "must be greater than 0"));
        }

        Ok(())
    }
}

fn check_time_limit(field: &'static str, value: Option<f64>) -> Result<()> {
    match value {
        Some(secs) if !(secs > 0.0 && secs.is_finite()) => {
            Err(invalid(field, "must be a positive number of seconds"))
        }
        _ => Ok(()),
    }
}

fn invalid(field: &'static str, reason: &str) -> crate::error::Error {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
    .into()
}
