use std::sync::Mutex;
use std::time::Instant;

use lotsizing_benders::domain::LpModel;
use lotsizing_benders::error::Result;
use lotsizing_benders::port::{IncumbentCallback, SolveOutcome, Solver};

/// One call observed by [`RecordingSolver`].
#[derive(Debug, Clone, PartialEq)]
pub struct SolveRecord {
    pub is_mip: bool,
    pub rows: usize,
    pub outcome: &'static str,
    pub objective: Option<f64>,
}

/// Delegates to an inner solver and records every call.
pub struct RecordingSolver<S> {
    inner: S,
    records: Mutex<Vec<SolveRecord>>,
}

impl<S: Solver> RecordingSolver<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn records(&self) -> Vec<SolveRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Objectives of optimal MIP solves, in call order.
    pub fn mip_objectives(&self) -> Vec<f64> {
        self.records()
            .into_iter()
            .filter(|r| r.is_mip && r.outcome == "optimal")
            .filter_map(|r| r.objective)
            .collect()
    }

    fn record(&self, model: &LpModel, outcome: &SolveOutcome) {
        let objective = match outcome {
            SolveOutcome::Optimal(solution) => Some(solution.objective),
            _ => None,
        };
        self.records.lock().unwrap().push(SolveRecord {
            is_mip: model.is_mip(),
            rows: model.num_rows(),
            outcome: outcome.label(),
            objective,
        });
    }
}

impl<S: Solver> Solver for RecordingSolver<S> {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn solve(&self, model: &LpModel) -> Result<SolveOutcome> {
        let outcome = self.inner.solve(model)?;
        self.record(model, &outcome);
        Ok(outcome)
    }

    fn solve_with_callback(
        &self,
        model: &LpModel,
        callback: &mut dyn IncumbentCallback,
        deadline: Option<Instant>,
    ) -> Result<SolveOutcome> {
        let outcome = self.inner.solve_with_callback(model, callback, deadline)?;
        self.record(model, &outcome);
        Ok(outcome)
    }
}
