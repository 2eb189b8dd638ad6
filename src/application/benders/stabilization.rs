//! In-out stabilized cut loop on the master LP relaxation.
//!
//! Instead of separating at the LP optimum `y*` (usually a degenerate
//! vertex), cuts are separated at
//!
//! ```text
//! yy = min(1, lambda * y* + (1 - lambda) * yTilde + delta)
//! ```
//!
//! where the stability center `yTilde` is an exponentially smoothed average
//! of past optima. When the LP bound stops improving the loop escalates:
//! first `lambda -> 1` (separate at `y*`), then `delta -> 0`, then stop.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::cut_builder::Separator;
use super::master::{MasterOutcome, MasterProblem};
use crate::domain::{CutKind, Grid};
use crate::error::Result;
use crate::port::Solver;

/// Configuration for the in-out loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilizationConfig {
    /// Smoothing weight of the old stability center, in `(0, 1)`.
    pub alpha: f64,
    /// Initial weight of the LP optimum in the separation point, in `(0, 1]`.
    pub lambda: f64,
    /// Initial interior perturbation, `>= 0`.
    pub delta: f64,
    /// Non-improving iterations tolerated before escalating.
    pub stall_limit: usize,
    /// Hard cap on loop iterations.
    pub max_iterations: usize,
    /// Iterations between progress logs at info level.
    pub log_interval: usize,
    /// Relative margin a bound must clear to count as an improvement.
    pub improvement_tolerance: f64,
}

impl Default for StabilizationConfig {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            lambda: 0.2,
            delta: 2e-5,
            stall_limit: 5,
            max_iterations: 1000,
            log_interval: 50,
            improvement_tolerance: 1e-9,
        }
    }
}

/// How far stabilization has been relaxed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Escalation {
    /// Configured `lambda` and `delta`.
    Stabilized,
    /// `lambda = 1`.
    FullStep,
    /// `lambda = 1`, `delta = 0`.
    Unperturbed,
}

/// Bound tracking and the escalating stall policy.
#[derive(Debug, Clone, PartialEq)]
pub struct StallPolicy {
    lambda: f64,
    delta: f64,
    stall_limit: usize,
    tolerance: f64,
    stalled_for: usize,
    best_bound: f64,
    escalation: Escalation,
}

impl StallPolicy {
    #[must_use]
    pub fn new(config: &StabilizationConfig) -> Self {
        let escalation = match (config.lambda >= 1.0, config.delta <= 0.0) {
            (true, true) => Escalation::Unperturbed,
            (true, false) => Escalation::FullStep,
            _ => Escalation::Stabilized,
        };
        Self {
            lambda: config.lambda.min(1.0),
            delta: config.delta.max(0.0),
            stall_limit: config.stall_limit,
            tolerance: config.improvement_tolerance,
            stalled_for: 0,
            // Costs are non-negative, so 0 is a valid initial bound.
            best_bound: 0.0,
            escalation,
        }
    }

    /// Record a new LP bound. Returns `true` when the loop should stop after
    /// this iteration's separation.
    pub fn observe(&mut self, bound: f64) -> bool {
        let margin = self.tolerance * self.best_bound.abs().max(1.0);
        if bound > self.best_bound + margin {
            self.best_bound = bound;
            self.stalled_for = 0;
            return false;
        }
        if self.stalled_for <= self.stall_limit {
            self.stalled_for += 1;
            return false;
        }

        match self.escalation {
            Escalation::Unperturbed => true,
            Escalation::FullStep => {
                self.delta = 0.0;
                self.escalation = Escalation::Unperturbed;
                self.stalled_for = 0;
                false
            }
            Escalation::Stabilized => {
                self.lambda = 1.0;
                self.escalation = Escalation::FullStep;
                self.stalled_for = 0;
                false
            }
        }
    }

    #[must_use]
    pub const fn lambda(&self) -> f64 {
        self.lambda
    }

    #[must_use]
    pub const fn delta(&self) -> f64 {
        self.delta
    }

    #[must_use]
    pub const fn best_bound(&self) -> f64 {
        self.best_bound
    }

    #[must_use]
    pub const fn escalation(&self) -> Escalation {
        self.escalation
    }
}

/// Why the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StabilizationStatus {
    /// Bound stalled with stabilization fully relaxed.
    Stalled,
    /// Iteration cap or deadline reached.
    BudgetExhausted,
    /// The master relaxation became infeasible.
    Infeasible,
}

/// Summary of one in-out run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StabilizationReport {
    pub status: StabilizationStatus,
    pub iterations: usize,
    pub optimality_cuts: usize,
    pub feasibility_cuts: usize,
    /// Best LP bound observed.
    pub bound: f64,
    pub escalation: Escalation,
}

/// In-out stabilized separation driver.
#[derive(Debug, Clone, Default)]
pub struct InOutStabilizer {
    config: StabilizationConfig,
}

impl InOutStabilizer {
    #[must_use]
    pub const fn new(config: StabilizationConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &StabilizationConfig {
        &self.config
    }

    /// Build a cut pool on the master relaxation.
    ///
    /// The master must not be in its integer phase; it is moved to the
    /// stabilizing phase for the duration of the loop.
    ///
    /// # Errors
    ///
    /// Propagates solver failures from the master or the subproblem.
    pub fn run(
        &self,
        master: &mut MasterProblem,
        separator: &mut Separator<'_>,
        solver: &dyn Solver,
        deadline: Option<Instant>,
    ) -> Result<StabilizationReport> {
        master.begin_stabilization();

        let alpha = self.config.alpha;
        let setup_vars = master.setup_vars();
        let mut center = Grid::filled(setup_vars.items(), setup_vars.periods(), 1.0);
        let mut policy = StallPolicy::new(&self.config);
        let mut iterations = 0;
        let mut optimality_cuts = 0;
        let mut feasibility_cuts = 0;
        let mut status = StabilizationStatus::BudgetExhausted;

        while iterations < self.config.max_iterations {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                break;
            }
            iterations += 1;

            // ====================================================================
            // STEP 1: Solve the master relaxation
            // ====================================================================
            let solution = match master.solve(solver)? {
                MasterOutcome::Solved(solution) => solution,
                MasterOutcome::Infeasible => {
                    status = StabilizationStatus::Infeasible;
                    break;
                }
                MasterOutcome::Stopped(_) => break,
            };

            // ====================================================================
            // STEP 2: Track the bound and escalate on stalls
            // ====================================================================
            let stop = policy.observe(solution.objective);

            if iterations % self.config.log_interval.max(1) == 0 {
                info!(
                    iteration = iterations,
                    best_bound = policy.best_bound(),
                    lp_bound = solution.objective,
                    "in-out progress"
                );
            }
            debug!(
                iteration = iterations,
                lp_bound = solution.objective,
                lambda = policy.lambda(),
                delta = policy.delta(),
                "in-out iteration"
            );

            // ====================================================================
            // STEP 3: Move the stability center and pick the separation point
            // ====================================================================
            let (lambda, delta) = (policy.lambda(), policy.delta());
            let optimum = &solution.setups;
            center = Grid::from_fn(center.items(), center.periods(), |j, t| {
                alpha * center[(j, t)] + (1.0 - alpha) * optimum[(j, t)]
            });
            let point = Grid::from_fn(center.items(), center.periods(), |j, t| {
                (lambda * optimum[(j, t)] + (1.0 - lambda) * center[(j, t)] + delta).min(1.0)
            });

            // ====================================================================
            // STEP 4: Separate and grow the pool
            // ====================================================================
            let separation = separator.separate(solver, &point)?;
            match separation.cut.kind {
                CutKind::Optimality => optimality_cuts += 1,
                CutKind::Feasibility => feasibility_cuts += 1,
            }
            master.add_cut(separation.cut)?;

            if stop {
                status = StabilizationStatus::Stalled;
                break;
            }
        }

        info!(
            iterations,
            bound = policy.best_bound(),
            optimality_cuts,
            feasibility_cuts,
            status = ?status,
            "in-out stabilization finished"
        );

        Ok(StabilizationReport {
            status,
            iterations,
            optimality_cuts,
            feasibility_cuts,
            bound: policy.best_bound(),
            escalation: policy.escalation(),
        })
    }
}
