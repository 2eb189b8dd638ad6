//! Farkas certificates for infeasible continuous models.
//!
//! good_lp does not expose HiGHS dual rays, so the certificate is obtained by
//! solving the bounded ray problem
//!
//! ```text
//! maximize    b^T u + l^T nu + U^T mu
//! subject to  A^T u + nu + mu = 0        (per column)
//!             u_i in [-1, 0]  for <= rows
//!             u_i in [0, 1]   for >= rows
//!             u_i in [-1, 1]  for =  rows
//!             nu >= 0 (finite lower bound l), mu <= 0 (finite upper bound U)
//! ```
//!
//! The primal model is infeasible exactly when this optimum is positive.
//! Columns with only a zero lower bound collapse to `A^T u <= 0`.

use crate::domain::{Constraint, ConstraintSense, LpModel, VarId, VarKind, VariableBounds};
use crate::error::{Result, SolverError};
use crate::port::{FarkasCertificate, SolveOutcome, Solver};

/// Smallest ray value accepted as a proof of infeasibility.
pub const RAY_TOLERANCE: f64 = 1e-9;

/// Compute a certificate for `model`, or `None` if the model is feasible.
pub fn certificate<S: Solver + ?Sized>(
    solver: &S,
    model: &LpModel,
) -> Result<Option<FarkasCertificate>> {
    let mut ray = LpModel::new();

    let multipliers: Vec<VarId> = model
        .rows()
        .iter()
        .map(|row| {
            let bounds = match row.sense {
                ConstraintSense::LessEqual => VariableBounds::bounded(-1.0, 0.0),
                ConstraintSense::GreaterEqual => VariableBounds::bounded(0.0, 1.0),
                ConstraintSense::Equal => VariableBounds::bounded(-1.0, 1.0),
            };
            ray.add_variable(format!("u.{}", row.name), VarKind::Continuous, bounds, -row.rhs)
        })
        .collect();

    let mut columns: Vec<Vec<(VarId, f64)>> = vec![Vec::new(); model.num_vars()];
    for (row, &u) in model.rows().iter().zip(&multipliers) {
        for (var, coef) in &row.terms {
            columns[var.index()].push((u, *coef));
        }
    }

    let mut bound_vars: Vec<(VarId, f64)> = Vec::new();
    for (var, mut terms) in model.variables().iter().zip(columns) {
        let name = format!("dual.{}", var.name);
        let (lower, upper) = (var.bounds.lower, var.bounds.upper);

        if lower == Some(0.0) && upper.is_none() {
            if !terms.is_empty() {
                ray.add_constraint(Constraint::leq(name, terms, 0.0))?;
            }
            continue;
        }

        if let Some(lb) = lower {
            let nu = ray.add_variable(
                format!("nu.{}", var.name),
                VarKind::Continuous,
                VariableBounds::non_negative(),
                -lb,
            );
            terms.push((nu, 1.0));
            bound_vars.push((nu, lb));
        }
        if let Some(ub) = upper {
            let mu = ray.add_variable(
                format!("mu.{}", var.name),
                VarKind::Continuous,
                VariableBounds {
                    lower: None,
                    upper: Some(0.0),
                },
                -ub,
            );
            terms.push((mu, 1.0));
            bound_vars.push((mu, ub));
        }
        if !terms.is_empty() {
            ray.add_constraint(Constraint::eq(name, terms, 0.0))?;
        }
    }

    let solution = match solver.solve(&ray)? {
        SolveOutcome::Optimal(solution) => solution,
        other => {
            return Err(SolverError::Status {
                solver: solver.name(),
                model: "farkas ray",
                status: other.label().to_string(),
            }
            .into())
        }
    };

    let value = -solution.objective;
    if value <= RAY_TOLERANCE {
        return Ok(None);
    }

    let bound_term = bound_vars
        .iter()
        .map(|(var, bound)| bound * solution.value(*var))
        .sum();
    Ok(Some(FarkasCertificate {
        rows: multipliers.iter().map(|u| solution.value(*u)).collect(),
        bound_term,
    }))
}
