//! Driver configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How branch-and-bound is combined with cut separation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BendersMode {
    /// Re-solve the master MIP and add one cut per iteration.
    #[default]
    Loop,
    /// One branch-and-bound with cuts injected at each incumbent.
    ///
    /// On HiGHS the search is emulated: every injected cut triggers a fresh
    /// branch-and-bound on a working copy of the master, so there is no
    /// incremental tree and the cost per incumbent matches a loop iteration.
    Callback,
}

impl std::fmt::Display for BendersMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Loop => write!(f, "loop"),
            Self::Callback => write!(f, "callback"),
        }
    }
}

/// Configuration for the decomposition driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BendersConfig {
    pub mode: BendersMode,
    /// Relative gap below which the run is optimal.
    pub gap_tolerance: f64,
    /// Outer iteration cap for the loop mode.
    pub max_iterations: usize,
    /// Wall-clock budget for the whole run.
    pub time_limit_secs: Option<f64>,
    /// Outer iterations between summary logs.
    pub summary_interval: usize,
}

impl Default for BendersConfig {
    fn default() -> Self {
        Self {
            mode: BendersMode::Loop,
            gap_tolerance: 1e-6,
            max_iterations: 500,
            time_limit_secs: None,
            summary_interval: 10,
        }
    }
}

impl BendersConfig {
    #[must_use]
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_secs.map(Duration::from_secs_f64)
    }
}
