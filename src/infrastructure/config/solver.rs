//! LP/MIP backend settings.

use serde::Deserialize;

use crate::adapter::outbound::solver::HighsSolver;

/// `[solver]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Backend worker threads. The decomposition requires exactly one.
    pub threads: u32,
    /// Per-call wall-clock limit in seconds.
    pub time_limit_secs: Option<f64>,
    /// Relative MIP gap at which branch-and-bound stops.
    pub mip_rel_gap: f64,
    /// Incumbents presented to the lazy-cut callback before giving up.
    pub incumbent_limit: Option<usize>,
    /// Violation above which a lazy cut rejects an incumbent.
    pub cut_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            threads: 1,
            time_limit_secs: None,
            mip_rel_gap: 0.0,
            incumbent_limit: None,
            cut_tolerance: 1e-6,
        }
    }
}

impl SolverConfig {
    /// Build the configured HiGHS backend.
    #[must_use]
    pub fn build(&self) -> HighsSolver {
        HighsSolver::new()
            .with_threads(self.threads)
            .with_time_limit(self.time_limit_secs.map(std::time::Duration::from_secs_f64))
            .with_mip_rel_gap(self.mip_rel_gap)
            .with_incumbent_limit(self.incumbent_limit)
            .with_cut_tolerance(self.cut_tolerance)
    }
}
