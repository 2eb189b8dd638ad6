//! Benders master problem: setups, surrogate cost and the cut pool.

use std::time::Instant;

use serde::Serialize;

use crate::domain::{
    Constraint, ConstraintSense, Cut, CutKind, Grid, LpModel, ProblemData, RowId, VarId, VarKind,
    VariableBounds,
};
use crate::error::Result;
use crate::port::{IncumbentCallback, LpSolution, SolveOutcome, Solver};

/// Domain of the setup variables over the run. Transitions only go forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MasterPhase {
    /// Continuous `y`, no cuts yet.
    Relaxed,
    /// Continuous `y` while the in-out loop builds the cut pool.
    Stabilizing,
    /// Binary `y`.
    Integer,
}

/// Values read back from a master solve.
#[derive(Debug, Clone, PartialEq)]
pub struct MasterSolution {
    /// `sum f y + zHat`.
    pub objective: f64,
    /// Best proven bound of the solve.
    pub bound: f64,
    pub setups: Grid<f64>,
    pub surrogate: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MasterOutcome {
    Solved(MasterSolution),
    Infeasible,
    Stopped(Option<MasterSolution>),
}

/// `min sum f[j][t] y[j][t] + zHat` subject to accumulated cuts.
#[derive(Debug, Clone)]
pub struct MasterProblem {
    model: LpModel,
    setups: Grid<VarId>,
    surrogate: VarId,
    phase: MasterPhase,
    cuts: Vec<(RowId, Cut)>,
}

impl MasterProblem {
    #[must_use]
    pub fn new(data: &ProblemData) -> Self {
        let mut model = LpModel::new();
        let setups = Grid::from_fn(data.n_items(), data.n_periods(), |j, t| {
            model.add_variable(
                format!("y.{j}.{t}"),
                VarKind::Continuous,
                VariableBounds::unit(),
                data.setup_cost(j, t),
            )
        });
        let surrogate = model.add_variable(
            "zHat",
            VarKind::Continuous,
            VariableBounds::non_negative(),
            1.0,
        );

        Self {
            model,
            setups,
            surrogate,
            phase: MasterPhase::Relaxed,
            cuts: Vec::new(),
        }
    }

    #[must_use]
    pub const fn phase(&self) -> MasterPhase {
        self.phase
    }

    #[must_use]
    pub const fn model(&self) -> &LpModel {
        &self.model
    }

    #[must_use]
    pub const fn setup_vars(&self) -> &Grid<VarId> {
        &self.setups
    }

    #[must_use]
    pub const fn surrogate_var(&self) -> VarId {
        self.surrogate
    }

    /// Every cut added so far, in insertion order.
    pub fn cuts(&self) -> impl Iterator<Item = &Cut> {
        self.cuts.iter().map(|(_, cut)| cut)
    }

    #[must_use]
    pub fn cut_count(&self, kind: CutKind) -> usize {
        self.cuts.iter().filter(|(_, cut)| cut.kind == kind).count()
    }

    /// `Relaxed -> Stabilizing`. Returns `false` if the master is already past
    /// the relaxed phase.
    pub fn begin_stabilization(&mut self) -> bool {
        if self.phase != MasterPhase::Relaxed {
            return false;
        }
        self.phase = MasterPhase::Stabilizing;
        true
    }

    /// Switch every setup variable to binary. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error only if the model bookkeeping is inconsistent.
    pub fn enter_integer_phase(&mut self) -> Result<()> {
        if self.phase == MasterPhase::Integer {
            return Ok(());
        }
        for (_, var) in self.setups.iter() {
            self.model.set_kind(*var, VarKind::Binary)?;
        }
        self.phase = MasterPhase::Integer;
        Ok(())
    }

    /// Append a cut as a `<=` row.
    ///
    /// # Errors
    ///
    /// Returns an error only if the model bookkeeping is inconsistent.
    pub fn add_cut(&mut self, cut: Cut) -> Result<RowId> {
        let terms = cut.terms(&self.setups, self.surrogate);
        let name = format!("{}.{}", cut.kind, self.cuts.len());
        let row = self.model.add_constraint(Constraint {
            name,
            terms,
            sense: ConstraintSense::LessEqual,
            rhs: cut.rhs,
        })?;
        self.cuts.push((row, cut));
        Ok(row)
    }

    /// Solve the master in its current phase.
    ///
    /// # Errors
    ///
    /// Propagates solver failures.
    pub fn solve(&self, solver: &dyn Solver) -> Result<MasterOutcome> {
        Ok(self.read(solver.solve(&self.model)?))
    }

    /// Run one branch-and-bound with an incumbent callback, stopping at
    /// `deadline`.
    ///
    /// # Errors
    ///
    /// Propagates solver and callback failures.
    pub fn solve_with_callback(
        &self,
        solver: &dyn Solver,
        callback: &mut dyn IncumbentCallback,
        deadline: Option<Instant>,
    ) -> Result<MasterOutcome> {
        Ok(self.read(solver.solve_with_callback(&self.model, callback, deadline)?))
    }

    /// Setup and surrogate values of a raw master point.
    #[must_use]
    pub fn decode(&self, values: &[f64]) -> (Grid<f64>, f64) {
        (
            self.setups.map(|var| values[var.index()]),
            values[self.surrogate.index()],
        )
    }

    fn read(&self, outcome: SolveOutcome) -> MasterOutcome {
        match outcome {
            SolveOutcome::Optimal(solution) => MasterOutcome::Solved(self.solution(&solution)),
            SolveOutcome::Infeasible(_) => MasterOutcome::Infeasible,
            SolveOutcome::Stopped(solution) => {
                MasterOutcome::Stopped(solution.map(|s| self.solution(&s)))
            }
        }
    }

    fn solution(&self, solution: &LpSolution) -> MasterSolution {
        let (setups, surrogate) = self.decode(&solution.values);
        MasterSolution {
            objective: solution.objective,
            bound: solution.best_bound,
            setups,
            surrogate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::solver::HighsSolver;
    use crate::domain::InstanceParams;

    fn data() -> ProblemData {
        let mut params = InstanceParams::uniform(1, 2);
        params.demand = vec![vec![5.0, 5.0]];
        params.setup_cost = vec![vec![10.0, 10.0]];
        params.holding_cost = vec![vec![1.0, 1.0]];
        params.capacity = vec![10.0, 10.0];
        ProblemData::try_new(params).unwrap()
    }

    #[test]
    fn phases_only_move_forward() {
        let mut master = MasterProblem::new(&data());
        assert_eq!(master.phase(), MasterPhase::Relaxed);
        assert!(!master.model().is_mip());

        assert!(master.begin_stabilization());
        master.enter_integer_phase().unwrap();
        assert_eq!(master.phase(), MasterPhase::Integer);
        assert!(master.model().is_mip());

        assert!(!master.begin_stabilization());
        assert_eq!(master.phase(), MasterPhase::Integer);
    }

    #[test]
    fn empty_master_opens_nothing() {
        let master = MasterProblem::new(&data());
        match master.solve(&HighsSolver::new()).unwrap() {
            MasterOutcome::Solved(solution) => {
                assert!(solution.objective.abs() < 1e-9);
                assert!(solution.setups.as_slice().iter().all(|y| y.abs() < 1e-9));
            }
            other => panic!("expected solved master, got {other:?}"),
        }
    }

    #[test]
    fn cuts_become_rows() {
        let mut master = MasterProblem::new(&data());
        // y0 + y1 >= 1 written as -y0 - y1 <= -1
        let cut = Cut::feasibility(Grid::from_rows(vec![vec![-1.0, -1.0]]).unwrap(), -1.0);
        let row = master.add_cut(cut).unwrap();

        assert_eq!(master.model().num_rows(), 1);
        assert_eq!(master.model().row(row).unwrap().name, "feasibility.0");
        assert_eq!(master.cut_count(CutKind::Feasibility), 1);
        assert_eq!(master.cut_count(CutKind::Optimality), 0);

        match master.solve(&HighsSolver::new()).unwrap() {
            MasterOutcome::Solved(solution) => assert!((solution.objective - 10.0).abs() < 1e-6),
            other => panic!("expected solved master, got {other:?}"),
        }
    }
}
