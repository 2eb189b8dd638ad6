//! HiGHS solver implementation via good_lp.
//!
//! HiGHS is a high-performance open-source linear/mixed-integer programming solver.
//! The model is rebuilt from the [`LpModel`] description on every call, which
//! keeps the adapter stateless and safe to share.

use std::time::{Duration, Instant};

use good_lp::solvers::highs::highs;
use good_lp::{
    constraint, variable, variables, DualValues, Expression, ResolutionError, Solution,
    SolutionStatus, SolutionWithDual, SolverModel, Variable,
};
use tracing::{debug, trace};

use super::farkas;
use crate::domain::{ConstraintSense, LpModel, VarKind};
use crate::error::{Result, SolverError};
use crate::port::{IncumbentCallback, IncumbentContext, LpSolution, SolveOutcome, Solver};

/// Absolute MIP gap at which HiGHS stops.
const MIP_ABS_GAP: f64 = 1e-6;

/// HiGHS-based LP/MIP solver.
#[derive(Debug, Clone)]
pub struct HighsSolver {
    threads: u32,
    time_limit: Option<Duration>,
    mip_rel_gap: f64,
    incumbent_limit: Option<usize>,
    cut_tolerance: f64,
}

impl Default for HighsSolver {
    fn default() -> Self {
        Self {
            threads: 1,
            time_limit: None,
            mip_rel_gap: 0.0,
            incumbent_limit: None,
            cut_tolerance: 1e-6,
        }
    }
}

impl HighsSolver {
    /// Create a single-threaded solver with an exact MIP gap.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_threads(mut self, threads: u32) -> Self {
        self.threads = threads;
        self
    }

    /// Wall-clock limit applied to each backend call.
    #[must_use]
    pub const fn with_time_limit(mut self, limit: Option<Duration>) -> Self {
        self.time_limit = limit;
        self
    }

    #[must_use]
    pub const fn with_mip_rel_gap(mut self, gap: f64) -> Self {
        self.mip_rel_gap = gap;
        self
    }

    /// Maximum number of incumbents presented to a callback in one search.
    #[must_use]
    pub const fn with_incumbent_limit(mut self, limit: Option<usize>) -> Self {
        self.incumbent_limit = limit;
        self
    }

    /// Violation above which an injected lazy cut rejects an incumbent.
    #[must_use]
    pub const fn with_cut_tolerance(mut self, tolerance: f64) -> Self {
        self.cut_tolerance = tolerance;
        self
    }

    fn solve_once(&self, model: &LpModel) -> Result<SolveOutcome> {
        let n = model.num_vars();

        // Handle empty problem
        if n == 0 {
            return Ok(SolveOutcome::Optimal(LpSolution {
                values: vec![],
                objective: 0.0,
                best_bound: 0.0,
                duals: Some(vec![0.0; model.num_rows()]),
            }));
        }

        // Create variables
        let mut vars = variables!();
        let mut var_list: Vec<Variable> = Vec::with_capacity(n);

        for var in model.variables() {
            let mut v = variable().name(var.name.clone());
            let (mut lower, mut upper) = (var.bounds.lower, var.bounds.upper);

            // Mark as integer and clamp into [0, 1]
            if var.kind == VarKind::Binary {
                v = v.integer();
                lower = Some(lower.map_or(0.0, |lb| lb.max(0.0)));
                upper = Some(upper.map_or(1.0, |ub| ub.min(1.0)));
            }
            if let Some(lb) = lower {
                v = v.min(lb);
            }
            if let Some(ub) = upper {
                v = v.max(ub);
            }

            var_list.push(vars.add(v));
        }

        let objective: Expression = model
            .variables()
            .iter()
            .zip(&var_list)
            .filter(|(var, _)| var.objective != 0.0)
            .map(|(var, v)| var.objective * *v)
            .sum();

        let mut problem = vars.minimise(&objective).using(highs);
        problem.set_verbose(false);
        let mut problem = problem
            .set_option("threads", i32::try_from(self.threads).unwrap_or(1))
            .set_option("mip_rel_gap", self.mip_rel_gap)
            .set_option("mip_abs_gap", MIP_ABS_GAP);
        if let Some(limit) = self.time_limit {
            problem = problem.set_option("time_limit", limit.as_secs_f64());
        }

        let mut refs = Vec::with_capacity(model.num_rows());
        for row in model.rows() {
            let lhs: Expression = row
                .terms
                .iter()
                .map(|(var, coef)| *coef * var_list[var.index()])
                .sum();
            let rhs = row.rhs;

            let reference = match row.sense {
                ConstraintSense::GreaterEqual => problem.add_constraint(constraint!(lhs >= rhs)),
                ConstraintSense::LessEqual => problem.add_constraint(constraint!(lhs <= rhs)),
                ConstraintSense::Equal => problem.add_constraint(constraint!(lhs == rhs)),
            };
            refs.push(reference);
        }

        let started = Instant::now();
        let result = problem.solve();
        let elapsed = started.elapsed();
        trace!(
            vars = n,
            rows = model.num_rows(),
            mip = model.is_mip(),
            elapsed_ms = elapsed.as_millis() as u64,
            "highs solve finished"
        );

        match result {
            Ok(mut solution) => {
                let status = solution.status();
                let values: Vec<f64> = var_list.iter().map(|v| solution.value(*v)).collect();

                // Re-evaluate objective with the solved values
                let objective = model.objective_value(&values);

                let duals = if model.is_mip() {
                    None
                } else {
                    let dual = solution.compute_dual();
                    Some(refs.iter().map(|r| dual.dual(r.clone())).collect())
                };

                let mut solution = LpSolution {
                    values,
                    objective,
                    best_bound: objective,
                    duals,
                };

                match status {
                    SolutionStatus::Optimal => Ok(SolveOutcome::Optimal(solution)),
                    SolutionStatus::GapLimit => {
                        solution.best_bound = self.gap_bound(objective);
                        debug!(
                            objective,
                            best_bound = solution.best_bound,
                            "mip stopped at the relative gap"
                        );
                        Ok(SolveOutcome::Optimal(solution))
                    }
                    SolutionStatus::TimeLimit => {
                        // No bound is reported on a budget stop.
                        solution.best_bound = f64::NEG_INFINITY;
                        debug!(objective, "budget reached with a feasible point");
                        Ok(SolveOutcome::Stopped(Some(solution)))
                    }
                }
            }
            Err(ResolutionError::Infeasible) => self.infeasible(model),
            Err(ResolutionError::Unbounded) => {
                // Presolve can report unbounded for a primal-infeasible model.
                if model.is_mip() {
                    return Err(status_error(model, "unbounded"));
                }
                match farkas::certificate(self, model)? {
                    Some(ray) => Ok(SolveOutcome::Infeasible(Some(ray))),
                    None => Err(status_error(model, "unbounded")),
                }
            }
            // Budget stop before any feasible point was found.
            Err(ResolutionError::Other("NoSolutionFound")) => Ok(SolveOutcome::Stopped(None)),
            Err(ResolutionError::Other(message)) => Err(status_error(model, message)),
            Err(other) => Err(SolverError::Backend(other.to_string()).into()),
        }
    }

    /// Weakest lower bound consistent with a stop at the configured gap.
    fn gap_bound(&self, objective: f64) -> f64 {
        objective - (self.mip_rel_gap * objective.abs()).max(MIP_ABS_GAP)
    }

    /// Copy whose per-call limit does not run past `deadline`.
    fn within(&self, deadline: Option<Instant>) -> Option<Self> {
        let Some(deadline) = deadline else {
            return Some(self.clone());
        };
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return None;
        }
        let limit = self.time_limit.map_or(remaining, |limit| limit.min(remaining));
        Some(self.clone().with_time_limit(Some(limit)))
    }

    fn infeasible(&self, model: &LpModel) -> Result<SolveOutcome> {
        if model.is_mip() {
            return Ok(SolveOutcome::Infeasible(None));
        }
        match farkas::certificate(self, model)? {
            Some(ray) => Ok(SolveOutcome::Infeasible(Some(ray))),
            None => Err(SolverError::Backend(
                "model reported infeasible but no Farkas ray exists".into(),
            )
            .into()),
        }
    }
}

fn status_error(model: &LpModel, status: &str) -> crate::error::Error {
    SolverError::Status {
        solver: "highs",
        model: if model.is_mip() { "mip" } else { "lp" },
        status: status.to_string(),
    }
    .into()
}

impl Solver for HighsSolver {
    fn name(&self) -> &'static str {
        "highs"
    }

    fn solve(&self, model: &LpModel) -> Result<SolveOutcome> {
        self.solve_once(model)
    }

    /// HiGHS exposes no incumbent callback through good_lp, so the search is
    /// emulated: solve a working copy, hand the optimum to the callback, add
    /// every injected cut to the copy and re-solve until no injected cut is
    /// violated at the incumbent. Each re-solve starts branch-and-bound from
    /// scratch, and every re-solve is capped at the time left before
    /// `deadline`.
    fn solve_with_callback(
        &self,
        model: &LpModel,
        callback: &mut dyn IncumbentCallback,
        deadline: Option<Instant>,
    ) -> Result<SolveOutcome> {
        let mut working = model.clone();
        let mut incumbents = 0usize;

        loop {
            let Some(solver) = self.within(deadline) else {
                debug!(incumbents, "search deadline reached");
                return Ok(SolveOutcome::Stopped(None));
            };
            let solution = match solver.solve_once(&working)? {
                SolveOutcome::Optimal(solution) => solution,
                other => return Ok(other),
            };
            incumbents += 1;

            let mut context =
                IncumbentContext::new(&solution.values, solution.objective, solution.best_bound);
            callback.on_incumbent(&mut context)?;
            let injected = context.into_injected();

            let violated = injected
                .iter()
                .filter(|cut| cut.violation(&solution.values) > self.cut_tolerance)
                .count();
            debug!(
                incumbent = incumbents,
                objective = solution.objective,
                injected = injected.len(),
                violated,
                "incumbent processed"
            );

            if violated == 0 {
                return Ok(SolveOutcome::Optimal(solution));
            }
            for cut in injected {
                working.add_constraint(cut)?;
            }

            if self.incumbent_limit.is_some_and(|limit| incumbents >= limit) {
                debug!(incumbents, "incumbent limit reached");
                return Ok(SolveOutcome::Stopped(None));
            }
        }
    }
}
