//! End-to-end Benders decomposition.
//!
//! Both modes start with the in-out loop on the master relaxation and then
//! switch the master to binary setups:
//!
//! - [`BendersMode::Loop`]: solve the master MIP from scratch, separate at its
//!   optimum, add the cut, repeat until the bounds meet.
//! - [`BendersMode::Callback`]: one branch-and-bound run in which a cut is
//!   separated and injected at every incumbent.

use std::time::Instant;

use tracing::{info, warn};

use super::callback::{count_kinds, round_setups, LazyCutCallback};
use super::config::{BendersConfig, BendersMode};
use super::cut_builder::Separator;
use super::master::{MasterOutcome, MasterProblem};
use super::report::{BendersReport, Bounds, RunStatus};
use super::stabilization::{InOutStabilizer, StabilizationConfig, StabilizationStatus};
use crate::domain::{CutKind, ProblemData};
use crate::error::Result;
use crate::port::Solver;

/// Orchestrates stabilization and the integer phase for one instance.
pub struct BendersDriver<'a> {
    data: &'a ProblemData,
    solver: &'a dyn Solver,
    config: BendersConfig,
    stabilizer: InOutStabilizer,
}

impl<'a> BendersDriver<'a> {
    #[must_use]
    pub fn new(
        data: &'a ProblemData,
        solver: &'a dyn Solver,
        config: BendersConfig,
        stabilization: StabilizationConfig,
    ) -> Self {
        Self {
            data,
            solver,
            config,
            stabilizer: InOutStabilizer::new(stabilization),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &BendersConfig {
        &self.config
    }

    /// Run the decomposition in the configured mode.
    ///
    /// Budget exhaustion and infeasibility are reported through
    /// [`BendersReport::status`], not as errors.
    ///
    /// # Errors
    ///
    /// Returns an error if the solver fails on the master or the subproblem.
    pub fn run(&self) -> Result<BendersReport> {
        let started = Instant::now();
        let deadline = self.config.time_limit().map(|limit| started + limit);

        let mut master = MasterProblem::new(self.data);
        let mut separator = Separator::new(self.data)?;

        info!(
            solver = self.solver.name(),
            mode = %self.config.mode,
            items = self.data.n_items(),
            periods = self.data.n_periods(),
            "starting benders decomposition"
        );

        let stabilization = self
            .stabilizer
            .run(&mut master, &mut separator, self.solver, deadline)?;

        let mut run = Run {
            status: RunStatus::ConvergenceTimeout,
            bounds: Bounds::new(),
            iterations: 0,
        };

        if stabilization.status == StabilizationStatus::Infeasible {
            warn!("master relaxation infeasible after stabilization");
            run.status = RunStatus::Infeasible;
        } else {
            master.enter_integer_phase()?;
            match self.config.mode {
                BendersMode::Loop => self.iterate(&mut master, &mut separator, deadline, &mut run)?,
                BendersMode::Callback => {
                    self.search(&mut master, &mut separator, deadline, &mut run)?
                }
            }
        }

        let report = BendersReport {
            status: run.status,
            mode: self.config.mode,
            lower_bound: BendersReport::finite(run.bounds.lower()),
            upper_bound: BendersReport::finite(run.bounds.upper()),
            gap: BendersReport::finite(run.bounds.gap()),
            iterations: run.iterations,
            stabilization,
            optimality_cuts: master.cut_count(CutKind::Optimality),
            feasibility_cuts: master.cut_count(CutKind::Feasibility),
            setups: run.bounds.incumbent().map(|plan| plan.to_rows()),
            elapsed_secs: started.elapsed().as_secs_f64(),
        };

        info!(
            status = %report.status,
            lower_bound = run.bounds.lower(),
            upper_bound = run.bounds.upper(),
            iterations = report.iterations,
            elapsed_secs = report.elapsed_secs,
            "benders decomposition finished"
        );
        Ok(report)
    }

    /// Mode A: iterate master MIP solves until the bounds close.
    fn iterate(
        &self,
        master: &mut MasterProblem,
        separator: &mut Separator<'a>,
        deadline: Option<Instant>,
        run: &mut Run,
    ) -> Result<()> {
        let summary_interval = self.config.summary_interval.max(1);

        loop {
            if run.iterations >= self.config.max_iterations {
                warn!(iterations = run.iterations, "iteration budget exhausted");
                return Ok(());
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                warn!(iterations = run.iterations, "time budget exhausted");
                return Ok(());
            }
            run.iterations += 1;

            let solution = match master.solve(self.solver)? {
                MasterOutcome::Solved(solution) => solution,
                MasterOutcome::Infeasible => {
                    warn!(iteration = run.iterations, "master infeasible");
                    run.status = RunStatus::Infeasible;
                    return Ok(());
                }
                MasterOutcome::Stopped(_) => {
                    warn!(iteration = run.iterations, "master solve stopped early");
                    return Ok(());
                }
            };
            run.bounds.raise_lower(solution.bound);

            let setups = round_setups(&solution.setups);
            let separation = separator.separate(self.solver, &setups)?;
            if let Some(cost) = separation.subproblem_cost {
                let upper = self.data.fixed_setup_cost(&setups) + cost;
                run.bounds.offer_upper(upper, &setups);
            }

            info!(
                iteration = run.iterations,
                lower_bound = run.bounds.lower(),
                upper_bound = run.bounds.upper(),
                surrogate = solution.surrogate,
                cut_kind = %separation.cut.kind,
                "benders iteration"
            );
            if run.iterations % summary_interval == 0 {
                info!(
                    iteration = run.iterations,
                    cuts = master.model().num_rows(),
                    best_upper = run.bounds.upper(),
                    best_lower = run.bounds.lower(),
                    "benders summary"
                );
            }

            master.add_cut(separation.cut)?;

            if run.bounds.converged(self.config.gap_tolerance) {
                run.status = RunStatus::Optimal;
                return Ok(());
            }
        }
    }

    /// Mode B: a single branch-and-bound with lazy cuts, then replay the
    /// injected pool into the master.
    fn search(
        &self,
        master: &mut MasterProblem,
        separator: &mut Separator<'a>,
        deadline: Option<Instant>,
        run: &mut Run,
    ) -> Result<()> {
        let mut callback = LazyCutCallback::new(self.data, master, separator, self.solver);
        let outcome = master.solve_with_callback(self.solver, &mut callback, deadline)?;
        run.iterations = callback.incumbents();
        let (bounds, pool) = callback.finish();
        run.bounds = bounds;

        match outcome {
            MasterOutcome::Solved(solution) => {
                run.bounds.raise_lower(solution.bound);
                run.status = if run.bounds.converged(self.config.gap_tolerance) {
                    RunStatus::Optimal
                } else {
                    warn!(
                        lower_bound = run.bounds.lower(),
                        upper_bound = run.bounds.upper(),
                        "search finished with an open gap"
                    );
                    RunStatus::ConvergenceTimeout
                };
            }
            MasterOutcome::Infeasible => run.status = RunStatus::Infeasible,
            MasterOutcome::Stopped(_) => {
                warn!(incumbents = run.iterations, "search stopped by solver budget");
            }
        }

        let (optimality, feasibility) = count_kinds(&pool);
        info!(optimality, feasibility, "replaying lazy cuts into master");
        for cut in pool {
            master.add_cut(cut)?;
        }
        Ok(())
    }
}

struct Run {
    status: RunStatus,
    bounds: Bounds,
    iterations: usize,
}
