//! Lazy-constraint callback used by the callback mode.
//!
//! Each incumbent moves through `ReadIncumbent -> SolveSubproblem -> BuildCut
//! -> InjectCut` and returns to idle. Only bounds, counters and the pool of
//! injected cuts persist between invocations.

use tracing::{debug, info};

use super::cut_builder::Separator;
use super::master::MasterProblem;
use super::report::Bounds;
use crate::domain::{ConstraintSense, Cut, CutKind, Grid, ProblemData};
use crate::error::Result;
use crate::port::{IncumbentCallback, IncumbentContext, Solver};

/// Separation state owned by the driver for one branch-and-bound run.
pub struct LazyCutCallback<'s, 'a> {
    data: &'a ProblemData,
    master: &'s MasterProblem,
    separator: &'s mut Separator<'a>,
    solver: &'s dyn Solver,
    bounds: Bounds,
    pool: Vec<Cut>,
    incumbents: usize,
}

impl<'s, 'a> LazyCutCallback<'s, 'a> {
    pub fn new(
        data: &'a ProblemData,
        master: &'s MasterProblem,
        separator: &'s mut Separator<'a>,
        solver: &'s dyn Solver,
    ) -> Self {
        Self {
            data,
            master,
            separator,
            solver,
            bounds: Bounds::new(),
            pool: Vec::new(),
            incumbents: 0,
        }
    }

    #[must_use]
    pub const fn incumbents(&self) -> usize {
        self.incumbents
    }

    /// Bounds and the injected cut pool, for replay into the master.
    #[must_use]
    pub fn finish(self) -> (Bounds, Vec<Cut>) {
        (self.bounds, self.pool)
    }
}

impl IncumbentCallback for LazyCutCallback<'_, '_> {
    fn on_incumbent(&mut self, context: &mut IncumbentContext<'_>) -> Result<()> {
        self.incumbents += 1;

        let (raw, surrogate) = self.master.decode(context.values());
        let setups = round_setups(&raw);
        self.bounds.raise_lower(context.best_bound());

        let separation = self.separator.separate(self.solver, &setups)?;
        if let Some(cost) = separation.subproblem_cost {
            let upper = self.data.fixed_setup_cost(&setups) + cost;
            if self.bounds.offer_upper(upper, &setups) {
                info!(
                    incumbent = self.incumbents,
                    upper_bound = upper,
                    "new incumbent"
                );
            }
        }

        let cut = separation.cut;
        debug!(
            incumbent = self.incumbents,
            objective = context.objective(),
            surrogate,
            cut_kind = %cut.kind,
            violation = cut.violation(&setups, surrogate),
            "injecting lazy cut"
        );
        context.inject_cut(
            cut.terms(self.master.setup_vars(), self.master.surrogate_var()),
            ConstraintSense::LessEqual,
            cut.rhs,
        );
        self.pool.push(cut);
        Ok(())
    }
}

/// Snap near-integral master values to exact 0/1.
#[must_use]
pub fn round_setups(setups: &Grid<f64>) -> Grid<f64> {
    setups.map(|y| if *y > 0.5 { 1.0 } else { 0.0 })
}

/// Counts of each cut kind in a pool.
#[must_use]
pub fn count_kinds(cuts: &[Cut]) -> (usize, usize) {
    cuts.iter().fold((0, 0), |(opt, feas), cut| match cut.kind {
        CutKind::Optimality => (opt + 1, feas),
        CutKind::Feasibility => (opt, feas + 1),
    })
}
