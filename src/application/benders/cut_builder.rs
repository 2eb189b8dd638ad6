//! Turns subproblem duals and Farkas rays into Benders cuts.
//!
//! With minimize-sense multipliers the subproblem's dual objective at setups
//! `y` is
//!
//! ```text
//! b(y)^T u = sum_t lambda[t] (cap[t] - sum_j m[j][t] y[j][t])
//!          + sum_{j,r} omega[j][r] d[j][r]
//!          + sum_{j,t,r>=t} epsilon[j][t][r] d[j][r] y[j][t]
//! ```
//!
//! so the coefficient of `y[j][t]` in both cut families is
//! `-m[j][t] lambda[t] + sum_{r>=t} epsilon[j][t][r] d[j][r]`.

use tracing::debug;

use super::subproblem::{Subproblem, SubproblemDuals, SubproblemResult};
use crate::domain::{Cut, Grid, ProblemData};
use crate::error::Result;
use crate::port::Solver;

/// Builds optimality and feasibility cuts for one instance.
#[derive(Debug, Clone, Copy)]
pub struct CutBuilder<'a> {
    data: &'a ProblemData,
}

impl<'a> CutBuilder<'a> {
    #[must_use]
    pub const fn new(data: &'a ProblemData) -> Self {
        Self { data }
    }

    /// `sum coeff * y - zHat <= -zSub + sum coeff * ySol`, tight at `ySol`.
    #[must_use]
    pub fn optimality(&self, duals: &SubproblemDuals, cost: f64, setups: &Grid<f64>) -> Cut {
        let coeffs = self.coefficients(duals);
        let rhs = -cost + coeffs.dot(setups);
        Cut::optimality(coeffs, rhs)
    }

    /// `sum coeff * y <= -sum d omega - sum cap lambda`, excluding every setup
    /// plan for which the ray stays positive.
    #[must_use]
    pub fn feasibility(&self, ray: &SubproblemDuals, bound_term: f64) -> Cut {
        let data = self.data;
        let coeffs = self.coefficients(ray);

        let demand_term: f64 = ray
            .demand
            .iter()
            .map(|((j, r), omega)| data.demand(j, r) * omega)
            .sum();
        let capacity_term: f64 = ray
            .capacity
            .iter()
            .enumerate()
            .map(|(t, lambda)| data.capacity(t) * lambda)
            .sum();

        Cut::feasibility(coeffs, -demand_term - capacity_term - bound_term)
    }

    fn coefficients(&self, duals: &SubproblemDuals) -> Grid<f64> {
        let data = self.data;
        let mut coeffs = Grid::from_fn(data.n_items(), data.n_periods(), |j, t| {
            -data.setup_usage(j, t) * duals.capacity[t]
        });
        for ((j, t, r), epsilon) in duals.logic.iter() {
            coeffs[(j, t)] += epsilon * data.demand(j, r);
        }
        coeffs
    }
}

/// A cut together with the subproblem cost it was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct Separation {
    pub cut: Cut,
    /// `Some(zSub)` for optimality cuts, `None` when the subproblem was
    /// infeasible.
    pub subproblem_cost: Option<f64>,
}

/// Subproblem plus cut builder: separates a setup point into a cut.
#[derive(Debug, Clone)]
pub struct Separator<'a> {
    subproblem: Subproblem<'a>,
    builder: CutBuilder<'a>,
}

impl<'a> Separator<'a> {
    /// # Errors
    ///
    /// Fails if the subproblem model cannot be built.
    pub fn new(data: &'a ProblemData) -> Result<Self> {
        Ok(Self {
            subproblem: Subproblem::new(data)?,
            builder: CutBuilder::new(data),
        })
    }

    #[must_use]
    pub const fn subproblem(&self) -> &Subproblem<'a> {
        &self.subproblem
    }

    /// Solve the subproblem at `setups` and build the matching cut.
    ///
    /// # Errors
    ///
    /// Propagates subproblem solver failures.
    pub fn separate(&mut self, solver: &dyn Solver, setups: &Grid<f64>) -> Result<Separation> {
        let separation = match self.subproblem.solve(solver, setups)? {
            SubproblemResult::Optimal { cost, duals } => Separation {
                cut: self.builder.optimality(&duals, cost, setups),
                subproblem_cost: Some(cost),
            },
            SubproblemResult::Infeasible { ray, bound_term } => Separation {
                cut: self.builder.feasibility(&ray, bound_term),
                subproblem_cost: None,
            },
        };
        debug!(
            cut_kind = %separation.cut.kind,
            rhs = separation.cut.rhs,
            "cut separated"
        );
        Ok(separation)
    }
}
