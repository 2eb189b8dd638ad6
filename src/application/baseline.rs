//! Monolithic MIP for the same lot-sizing model.
//!
//! The facility-location style reformulation with setups and production
//! allocations in one model. Used as a reference for the decomposition.

use std::time::Instant;

use serde::Serialize;
use tracing::info;

use super::benders::{round_setups, RunStatus};
use crate::domain::{
    Constraint, Grid, LpModel, ProblemData, Triangle, VarId, VarKind, VariableBounds,
};
use crate::error::Result;
use crate::port::{LpSolution, SolveOutcome, Solver};

/// Result of a monolithic solve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaselineReport {
    pub status: RunStatus,
    pub objective: Option<f64>,
    /// Proven bound. Below `objective` when the MIP stopped at its gap.
    pub lower_bound: Option<f64>,
    pub setups: Option<Vec<Vec<f64>>>,
    pub elapsed_secs: f64,
}

/// The full MIP with handles to its setup and production columns.
#[derive(Debug, Clone)]
pub struct BaselineModel {
    pub model: LpModel,
    pub setups: Grid<VarId>,
    pub production: Triangle<VarId>,
}

impl BaselineModel {
    /// Build the model for `data`.
    ///
    /// # Errors
    ///
    /// Returns an error only if the model bookkeeping is inconsistent.
    pub fn build(data: &ProblemData) -> Result<Self> {
        let (items, periods) = (data.n_items(), data.n_periods());
        let mut model = LpModel::new();

        let setups = Grid::from_fn(items, periods, |j, t| {
            model.add_variable(
                format!("y.{j}.{t}"),
                VarKind::Binary,
                VariableBounds::unit(),
                data.setup_cost(j, t),
            )
        });
        let production = Triangle::from_fn(items, periods, |j, t, r| {
            model.add_variable(
                format!("z.{j}.{t}.{r}"),
                VarKind::Continuous,
                VariableBounds::non_negative(),
                data.allocation_cost(j, t, r),
            )
        });

        for j in 0..items {
            for r in 0..periods {
                let terms = (0..=r).map(|t| (production[(j, t, r)], 1.0)).collect();
                model.add_constraint(Constraint::geq(
                    format!("demand.{j}.{r}"),
                    terms,
                    data.demand(j, r),
                ))?;
            }
        }

        for t in 0..periods {
            let mut terms = Vec::new();
            for j in 0..items {
                let usage = data.resource_usage(j, t);
                terms.extend((t..periods).map(|r| (production[(j, t, r)], usage)));
                terms.push((setups[(j, t)], data.setup_usage(j, t)));
            }
            model.add_constraint(Constraint::leq(
                format!("capacity.{t}"),
                terms,
                data.capacity(t),
            ))?;
        }

        for ((j, t, r), z) in production.iter() {
            model.add_constraint(Constraint::leq(
                format!("logic.{j}.{t}.{r}"),
                vec![(*z, 1.0), (setups[(j, t)], -data.demand(j, r))],
                0.0,
            ))?;
        }

        Ok(Self {
            model,
            setups,
            production,
        })
    }

    fn plan(&self, solution: &LpSolution) -> Vec<Vec<f64>> {
        round_setups(&self.setups.map(|var| solution.value(*var))).to_rows()
    }
}

/// Build and solve the monolithic MIP.
///
/// # Errors
///
/// Propagates solver failures.
pub fn solve_baseline(data: &ProblemData, solver: &dyn Solver) -> Result<BaselineReport> {
    let started = Instant::now();
    let baseline = BaselineModel::build(data)?;
    info!(
        vars = baseline.model.num_vars(),
        rows = baseline.model.num_rows(),
        "solving monolithic model"
    );

    let (status, solution) = match solver.solve(&baseline.model)? {
        SolveOutcome::Optimal(solution) => (RunStatus::Optimal, Some(solution)),
        SolveOutcome::Infeasible(_) => (RunStatus::Infeasible, None),
        SolveOutcome::Stopped(solution) => (RunStatus::ConvergenceTimeout, solution),
    };

    let report = BaselineReport {
        status,
        objective: solution.as_ref().map(|s| s.objective),
        lower_bound: solution
            .as_ref()
            .map(|s| s.best_bound)
            .filter(|bound| bound.is_finite()),
        setups: solution.as_ref().map(|s| baseline.plan(s)),
        elapsed_secs: started.elapsed().as_secs_f64(),
    };
    info!(status = %report.status, objective = ?report.objective, "monolithic solve finished");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::solver::HighsSolver;
    use crate::domain::InstanceParams;

    #[test]
    fn two_period_instance_holds_instead_of_setting_up() {
        let mut params = InstanceParams::uniform(1, 2);
        params.demand = vec![vec![5.0, 5.0]];
        params.setup_cost = vec![vec![10.0, 10.0]];
        params.holding_cost = vec![vec![1.0, 1.0]];
        params.capacity = vec![10.0, 10.0];
        let data = ProblemData::try_new(params).unwrap();

        let report = solve_baseline(&data, &HighsSolver::new()).unwrap();

        assert_eq!(report.status, RunStatus::Optimal);
        assert!((report.objective.unwrap() - 15.0).abs() < 1e-6);
        assert!(report.lower_bound.unwrap() <= 15.0 + 1e-9);
        assert!(report.lower_bound.unwrap() > 15.0 - 1e-5);
        assert_eq!(report.setups.unwrap(), vec![vec![1.0, 0.0]]);
    }

    #[test]
    fn model_has_one_column_per_triangle_slot() {
        let data = ProblemData::try_new(InstanceParams::uniform(2, 3)).unwrap();
        let baseline = BaselineModel::build(&data).unwrap();

        assert_eq!(baseline.production.len(), 2 * 6);
        assert_eq!(baseline.model.num_vars(), 2 * 3 + 2 * 6);
        // demand + capacity + logic
        assert_eq!(baseline.model.num_rows(), 2 * 3 + 3 + 2 * 6);
    }
}
