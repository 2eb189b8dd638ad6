//! Benders cuts over the setup variables and the surrogate cost.

use serde::{Deserialize, Serialize};

use super::constraint::VarId;
use super::grid::Grid;

/// Whether a cut bounds the surrogate cost or excludes infeasible setups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CutKind {
    Optimality,
    Feasibility,
}

impl std::fmt::Display for CutKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Optimality => write!(f, "optimality"),
            Self::Feasibility => write!(f, "feasibility"),
        }
    }
}

/// `sum(coeff[j][t] * y[j][t]) + surrogate_coeff * zHat <= rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct Cut {
    pub kind: CutKind,
    pub y_coeffs: Grid<f64>,
    /// `-1` for optimality cuts, `0` for feasibility cuts.
    pub surrogate_coeff: f64,
    pub rhs: f64,
}

impl Cut {
    #[must_use]
    pub fn optimality(y_coeffs: Grid<f64>, rhs: f64) -> Self {
        Self {
            kind: CutKind::Optimality,
            y_coeffs,
            surrogate_coeff: -1.0,
            rhs,
        }
    }

    #[must_use]
    pub fn feasibility(y_coeffs: Grid<f64>, rhs: f64) -> Self {
        Self {
            kind: CutKind::Feasibility,
            y_coeffs,
            surrogate_coeff: 0.0,
            rhs,
        }
    }

    /// Left-hand side at `(y, zHat)`.
    #[must_use]
    pub fn lhs_at(&self, setups: &Grid<f64>, surrogate: f64) -> f64 {
        self.y_coeffs.dot(setups) + self.surrogate_coeff * surrogate
    }

    /// Positive amount by which `(y, zHat)` violates the cut.
    #[must_use]
    pub fn violation(&self, setups: &Grid<f64>, surrogate: f64) -> f64 {
        (self.lhs_at(setups, surrogate) - self.rhs).max(0.0)
    }

    /// Sparse terms for a model whose setup columns are `y_vars`.
    ///
    /// Zero coefficients are dropped.
    #[must_use]
    pub fn terms(&self, y_vars: &Grid<VarId>, surrogate: VarId) -> Vec<(VarId, f64)> {
        let mut terms: Vec<(VarId, f64)> = self
            .y_coeffs
            .iter()
            .filter(|(_, coeff)| **coeff != 0.0)
            .map(|(cell, coeff)| (y_vars[cell], *coeff))
            .collect();
        if self.surrogate_coeff != 0.0 {
            terms.push((surrogate, self.surrogate_coeff));
        }
        terms
    }
}
