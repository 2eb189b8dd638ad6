use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Instant;

use lotsizing_benders::domain::LpModel;
use lotsizing_benders::error::{Result, SolverError};
use lotsizing_benders::port::{IncumbentCallback, SolveOutcome, Solver};

/// Deterministic test double returning pre-scripted outcomes in order.
#[derive(Default)]
pub struct ScriptedSolver {
    outcomes: Mutex<VecDeque<Result<SolveOutcome>>>,
    calls: Mutex<usize>,
}

impl ScriptedSolver {
    pub fn push(&self, outcome: Result<SolveOutcome>) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }

    pub fn push_infeasible(&self) {
        self.push(Ok(SolveOutcome::Infeasible(None)));
    }

    pub fn push_backend_error(&self, message: &str) {
        self.push(Err(SolverError::Backend(message.to_string()).into()));
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    fn next(&self) -> Result<SolveOutcome> {
        *self.calls.lock().unwrap() += 1;
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(SolverError::Backend("script exhausted".into()).into()))
    }
}

impl Solver for ScriptedSolver {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn solve(&self, _model: &LpModel) -> Result<SolveOutcome> {
        self.next()
    }

    fn solve_with_callback(
        &self,
        _model: &LpModel,
        _callback: &mut dyn IncumbentCallback,
        deadline: Option<Instant>,
    ) -> Result<SolveOutcome> {
        self.next()
    }
}
