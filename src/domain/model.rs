//! Solver-agnostic description of an LP or MIP.
//!
//! An [`LpModel`] is built once, then mutated only through right-hand sides,
//! variable domains and appended rows. Solver adapters translate it into their
//! backend's representation on every solve.

use super::constraint::{Constraint, RowId, VarId, VarKind, VariableBounds};
use crate::error::SolverError;

/// A decision variable column.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub kind: VarKind,
    pub bounds: VariableBounds,
    /// Objective coefficient (minimization).
    pub objective: f64,
}

/// Minimization model `min c^T x` over linear rows and variable bounds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LpModel {
    variables: Vec<Variable>,
    rows: Vec<Constraint>,
}

impl LpModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column and return its handle.
    pub fn add_variable(
        &mut self,
        name: impl Into<String>,
        kind: VarKind,
        bounds: VariableBounds,
        objective: f64,
    ) -> VarId {
        self.variables.push(Variable {
            name: name.into(),
            kind,
            bounds,
            objective,
        });
        VarId(self.variables.len() - 1)
    }

    /// Append a row and return its handle.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::UnknownVariable`] if a term references a column
    /// that is not part of this model.
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<RowId, SolverError> {
        if let Some((var, _)) = constraint
            .terms
            .iter()
            .find(|(var, _)| var.index() >= self.variables.len())
        {
            return Err(SolverError::UnknownVariable(var.index()));
        }
        self.rows.push(constraint);
        Ok(RowId(self.rows.len() - 1))
    }

    /// Replace the right-hand side of an existing row.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::UnknownRow`] for a foreign handle.
    pub fn set_rhs(&mut self, row: RowId, value: f64) -> Result<(), SolverError> {
        let constraint = self
            .rows
            .get_mut(row.index())
            .ok_or(SolverError::UnknownRow(row.index()))?;
        constraint.rhs = value;
        Ok(())
    }

    /// Switch a column between continuous and binary.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::UnknownVariable`] for a foreign handle.
    pub fn set_kind(&mut self, var: VarId, kind: VarKind) -> Result<(), SolverError> {
        let variable = self
            .variables
            .get_mut(var.index())
            .ok_or(SolverError::UnknownVariable(var.index()))?;
        variable.kind = kind;
        Ok(())
    }

    #[must_use]
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    #[must_use]
    pub fn rows(&self) -> &[Constraint] {
        &self.rows
    }

    #[must_use]
    pub fn row(&self, row: RowId) -> Option<&Constraint> {
        self.rows.get(row.index())
    }

    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.variables.len()
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Whether any column is binary.
    #[must_use]
    pub fn is_mip(&self) -> bool {
        self.variables.iter().any(|v| v.kind == VarKind::Binary)
    }

    /// Objective value `c^T x` at a primal point.
    #[must_use]
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.variables
            .iter()
            .zip(values)
            .map(|(var, x)| var.objective * x)
            .sum()
    }

    /// Largest row violation at a primal point.
    #[must_use]
    pub fn max_violation(&self, values: &[f64]) -> f64 {
        self.rows
            .iter()
            .map(|row| row.violation(values))
            .fold(0.0, f64::max)
    }
}
