use thiserror::Error;

use crate::domain::error::DomainError;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Errors raised by an LP/MIP backend or by model bookkeeping.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// The solver finished with a status that is neither optimal nor
    /// infeasible. Fatal for the run.
    #[error("{solver} returned status {status} for {model}")]
    Status {
        solver: &'static str,
        model: &'static str,
        status: String,
    },

    #[error("row {0} does not exist")]
    UnknownRow(usize),

    #[error("variable {0} does not exist")]
    UnknownVariable(usize),

    #[error("{solver} did not report row duals")]
    MissingDuals { solver: &'static str },

    #[error("solver backend error: {0}")]
    Backend(String),
}

/// Errors while reading an instance file.
#[derive(Error, Debug)]
pub enum InstanceError {
    #[error("{path}: unexpected end of file, expected {expected}")]
    UnexpectedEof { path: String, expected: String },

    #[error("{path}:{line}: cannot parse '{token}' as {expected}")]
    InvalidToken {
        path: String,
        line: usize,
        token: String,
        expected: &'static str,
    },

    #[error("{path}:{line}: {reason}")]
    Malformed {
        path: String,
        line: usize,
        reason: String,
    },

    #[error("unknown instance format '{0}'")]
    UnknownFormat(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error(transparent)]
    Instance(#[from] InstanceError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
