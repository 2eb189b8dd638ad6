//! Production/distribution subproblem for fixed setup decisions.
//!
//! Variables `z[j][t][r]` (produce item `j` in period `t` for demand of period
//! `r >= t`) cost `(r - t) * h[j][t]`. Three row families:
//!
//! ```text
//! capacity.t     sum_j sum_{r>=t} a[j][t] z[j][t][r] <= cap[t] - sum_j m[j][t] y[j][t]
//! demand.j.r     sum_{t<=r} z[j][t][r]               =  d[j][r]
//! logic.j.t.r    z[j][t][r]                          <= d[j][r] y[j][t]
//! ```
//!
//! The structure is built once; each call only rewrites the capacity and
//! logic right-hand sides.

use tracing::{debug, warn};

use crate::domain::{
    Constraint, Grid, LpModel, ProblemData, RowId, Triangle, VarId, VarKind, VariableBounds,
};
use crate::error::{Result, SolverError};
use crate::port::{SolveOutcome, Solver};

/// Multipliers of the three row families, either optimal duals or a Farkas
/// ray.
#[derive(Debug, Clone, PartialEq)]
pub struct SubproblemDuals {
    /// `lambda[t]`, non-positive.
    pub capacity: Vec<f64>,
    /// `omega[j][r]`, free.
    pub demand: Grid<f64>,
    /// `epsilon[j][t][r]`, non-positive.
    pub logic: Triangle<f64>,
}

/// Result of one subproblem solve.
#[derive(Debug, Clone, PartialEq)]
pub enum SubproblemResult {
    Optimal {
        /// Optimal holding cost `zSub`.
        cost: f64,
        duals: SubproblemDuals,
    },
    Infeasible {
        ray: SubproblemDuals,
        /// Ray contribution of column bounds.
        bound_term: f64,
    },
}

/// Reusable subproblem LP bound to one instance.
#[derive(Debug, Clone)]
pub struct Subproblem<'a> {
    data: &'a ProblemData,
    model: LpModel,
    production: Triangle<VarId>,
    capacity_rows: Vec<RowId>,
    demand_rows: Grid<RowId>,
    logic_rows: Triangle<RowId>,
}

impl<'a> Subproblem<'a> {
    /// Build the LP structure. Right-hand sides start at zero setups.
    ///
    /// # Errors
    ///
    /// Returns an error only if the model bookkeeping is inconsistent.
    pub fn new(data: &'a ProblemData) -> Result<Self> {
        let (items, periods) = (data.n_items(), data.n_periods());
        let mut model = LpModel::new();

        let production = Triangle::from_fn(items, periods, |j, t, r| {
            model.add_variable(
                format!("z.{j}.{t}.{r}"),
                VarKind::Continuous,
                VariableBounds::non_negative(),
                data.allocation_cost(j, t, r),
            )
        });

        let capacity_rows = (0..periods)
            .map(|t| {
                let terms = (0..items)
                    .flat_map(|j| (t..periods).map(move |r| (j, r)))
                    .map(|(j, r)| (production[(j, t, r)], data.resource_usage(j, t)))
                    .collect();
                model.add_constraint(Constraint::leq(format!("capacity.{t}"), terms, 0.0))
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let demand_rows = Grid::try_from_fn(items, periods, |j, r| {
            let terms = (0..=r).map(|t| (production[(j, t, r)], 1.0)).collect();
            model.add_constraint(Constraint::eq(
                format!("demand.{j}.{r}"),
                terms,
                data.demand(j, r),
            ))
        })?;

        let logic_rows = Triangle::try_from_fn(items, periods, |j, t, r| {
            model.add_constraint(Constraint::leq(
                format!("logic.{j}.{t}.{r}"),
                vec![(production[(j, t, r)], 1.0)],
                0.0,
            ))
        })?;

        Ok(Self {
            data,
            model,
            production,
            capacity_rows,
            demand_rows,
            logic_rows,
        })
    }

    /// The LP as currently parameterized.
    #[must_use]
    pub const fn model(&self) -> &LpModel {
        &self.model
    }

    /// Production variable handles.
    #[must_use]
    pub const fn production(&self) -> &Triangle<VarId> {
        &self.production
    }

    /// Rewrite the right-hand sides for setup decisions `setups`.
    ///
    /// # Errors
    ///
    /// Returns an error only if the model bookkeeping is inconsistent.
    pub fn parameterize(&mut self, setups: &Grid<f64>) -> Result<()> {
        let data = self.data;
        for (t, row) in self.capacity_rows.iter().enumerate() {
            let used: f64 = (0..data.n_items())
                .map(|j| data.setup_usage(j, t) * setups[(j, t)])
                .sum();
            self.model.set_rhs(*row, data.capacity(t) - used)?;
        }
        for ((j, t, r), row) in self.logic_rows.iter() {
            self.model.set_rhs(*row, data.demand(j, r) * setups[(j, t)])?;
        }
        Ok(())
    }

    /// Solve for fixed `setups` and extract duals or a Farkas ray.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::Status`] when the LP is neither optimal nor
    /// infeasible with a certificate, and [`SolverError::MissingDuals`] when
    /// the backend omits row duals.
    pub fn solve(&mut self, solver: &dyn Solver, setups: &Grid<f64>) -> Result<SubproblemResult> {
        self.parameterize(setups)?;

        match solver.solve(&self.model)? {
            SolveOutcome::Optimal(solution) => {
                let duals = solution.duals.as_deref().ok_or(SolverError::MissingDuals {
                    solver: solver.name(),
                })?;
                let duals = self.collect(duals);
                debug!(cost = solution.objective, "subproblem optimal");
                Ok(SubproblemResult::Optimal {
                    cost: solution.objective,
                    duals,
                })
            }
            SolveOutcome::Infeasible(Some(ray)) => {
                let multipliers = self.collect(&ray.rows);
                warn!(
                    open_setups = setups.as_slice().iter().filter(|y| **y > 0.5).count(),
                    "subproblem infeasible, building feasibility cut"
                );
                Ok(SubproblemResult::Infeasible {
                    ray: multipliers,
                    bound_term: ray.bound_term,
                })
            }
            other => Err(SolverError::Status {
                solver: solver.name(),
                model: "subproblem",
                status: match other {
                    SolveOutcome::Infeasible(None) => "infeasible without certificate".into(),
                    other => other.label().to_string(),
                },
            }
            .into()),
        }
    }

    fn collect(&self, rows: &[f64]) -> SubproblemDuals {
        SubproblemDuals {
            capacity: self.capacity_rows.iter().map(|r| rows[r.index()]).collect(),
            demand: self.demand_rows.map(|r| rows[r.index()]),
            logic: self.logic_rows.map(|r| rows[r.index()]),
        }
    }
}
