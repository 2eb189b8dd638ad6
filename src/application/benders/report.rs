//! Run summary and bound bookkeeping.

use serde::Serialize;

use super::config::BendersMode;
use super::stabilization::StabilizationReport;
use crate::domain::Grid;

/// Terminal status of a decomposition run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Bounds closed within tolerance.
    Optimal,
    /// No setup plan admits a feasible production plan.
    Infeasible,
    /// Iteration or time budget ran out with an open gap.
    ConvergenceTimeout,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Optimal => write!(f, "optimal"),
            Self::Infeasible => write!(f, "infeasible"),
            Self::ConvergenceTimeout => write!(f, "convergence timeout"),
        }
    }
}

/// Best bounds and the incumbent setup plan.
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    lower: f64,
    upper: f64,
    incumbent: Option<Grid<f64>>,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            lower: f64::NEG_INFINITY,
            upper: f64::INFINITY,
            incumbent: None,
        }
    }
}

impl Bounds {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the larger of the current and offered lower bound.
    pub fn raise_lower(&mut self, bound: f64) {
        if bound > self.lower {
            self.lower = bound;
        }
    }

    /// Record a feasible plan if it beats the incumbent. Returns whether it
    /// did.
    pub fn offer_upper(&mut self, cost: f64, setups: &Grid<f64>) -> bool {
        if cost < self.upper {
            self.upper = cost;
            self.incumbent = Some(setups.clone());
            return true;
        }
        false
    }

    #[must_use]
    pub const fn lower(&self) -> f64 {
        self.lower
    }

    #[must_use]
    pub const fn upper(&self) -> f64 {
        self.upper
    }

    #[must_use]
    pub const fn incumbent(&self) -> Option<&Grid<f64>> {
        self.incumbent.as_ref()
    }

    /// `upper - lower`, infinite until both bounds exist.
    #[must_use]
    pub fn gap(&self) -> f64 {
        self.upper - self.lower
    }

    /// `upper - lower < tolerance * max(1, |upper|)`.
    #[must_use]
    pub fn converged(&self, tolerance: f64) -> bool {
        self.upper.is_finite()
            && self.lower.is_finite()
            && self.gap() < tolerance * self.upper.abs().max(1.0)
    }
}

/// Serializable summary of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BendersReport {
    pub status: RunStatus,
    pub mode: BendersMode,
    /// `None` when no lower bound was proven.
    pub lower_bound: Option<f64>,
    /// `None` when no feasible plan was found.
    pub upper_bound: Option<f64>,
    pub gap: Option<f64>,
    /// Outer iterations (mode loop) or incumbents (mode callback).
    pub iterations: usize,
    pub stabilization: StabilizationReport,
    pub optimality_cuts: usize,
    pub feasibility_cuts: usize,
    /// Incumbent setup plan `y[item][period]`.
    pub setups: Option<Vec<Vec<f64>>>,
    pub elapsed_secs: f64,
}

impl BendersReport {
    pub(crate) fn finite(value: f64) -> Option<f64> {
        value.is_finite().then_some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_track_best_values() {
        let mut bounds = Bounds::new();
        assert!(!bounds.converged(1e-6));
        assert!(bounds.gap().is_infinite());

        bounds.raise_lower(10.0);
        bounds.raise_lower(8.0);
        assert_eq!(bounds.lower(), 10.0);

        let plan = Grid::from_rows(vec![vec![1.0, 0.0]]).unwrap();
        assert!(bounds.offer_upper(20.0, &plan));
        assert!(!bounds.offer_upper(25.0, &plan));
        assert_eq!(bounds.upper(), 20.0);
        assert!(!bounds.converged(1e-6));

        assert!(bounds.offer_upper(10.0, &plan));
        assert!(bounds.converged(1e-6));
        assert_eq!(bounds.incumbent(), Some(&plan));
    }

    #[test]
    fn tolerance_scales_with_the_objective() {
        let mut bounds = Bounds::new();
        let plan = Grid::from_rows(vec![vec![1.0]]).unwrap();
        bounds.offer_upper(1_000_000.0, &plan);
        bounds.raise_lower(999_999.5);
        assert!(bounds.converged(1e-6));

        let mut small = Bounds::new();
        small.offer_upper(10.0, &plan);
        small.raise_lower(9.5);
        assert!(!small.converged(1e-6));
    }
}
