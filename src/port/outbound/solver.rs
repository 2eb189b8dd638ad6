//! Solver port for linear and mixed-integer programming.
//!
//! The decomposition talks to its LP/MIP backend only through this module.
//!
//! # Overview
//!
//! - [`Solver`]: Core LP/MIP solver interface
//! - [`SolveOutcome`]: Optimal, infeasible (with Farkas ray) or stopped
//! - [`LpSolution`]: Primal values, objective and row duals
//! - [`IncumbentCallback`] / [`IncumbentContext`]: Lazy-constraint hook

use std::time::Instant;

use crate::domain::{Constraint, ConstraintSense, LpModel, RowId, VarId};
use crate::error::Result;

/// Linear and mixed-integer programming solver.
///
/// Implementations wrap a specific backend and translate [`LpModel`] into its
/// representation. Models always minimize.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`, but the decomposition issues calls
/// strictly one at a time and expects backends to run single-threaded so the
/// sequence of incumbents is deterministic.
pub trait Solver: Send + Sync {
    /// Return the solver name for logging and configuration.
    fn name(&self) -> &'static str;

    /// Solve an LP or MIP.
    ///
    /// For a continuous model the solution carries row duals. For an
    /// infeasible continuous model the outcome carries a Farkas certificate.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or reports a status that is
    /// neither optimal, infeasible nor a budget stop.
    fn solve(&self, model: &LpModel) -> Result<SolveOutcome>;

    /// Run branch-and-bound on a MIP, invoking `callback` at every integer
    /// incumbent.
    ///
    /// Cuts injected through the [`IncumbentContext`] are lazy constraints
    /// local to this search: `model` itself is never modified. Once
    /// `deadline` passes the search ends with [`SolveOutcome::Stopped`].
    ///
    /// # Errors
    ///
    /// Propagates backend failures and errors returned by the callback.
    fn solve_with_callback(
        &self,
        model: &LpModel,
        callback: &mut dyn IncumbentCallback,
        deadline: Option<Instant>,
    ) -> Result<SolveOutcome>;
}

/// Terminal state of a solve.
#[derive(Debug, Clone)]
pub enum SolveOutcome {
    /// Proven optimal solution.
    Optimal(LpSolution),

    /// No feasible solution exists. Continuous models carry a certificate.
    Infeasible(Option<FarkasCertificate>),

    /// A time or incumbent budget ran out, possibly with a feasible point.
    Stopped(Option<LpSolution>),
}

impl SolveOutcome {
    /// Short status label for logs and errors.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Optimal(_) => "optimal",
            Self::Infeasible(_) => "infeasible",
            Self::Stopped(_) => "stopped",
        }
    }
}

/// Solution to a linear or mixed-integer program.
#[derive(Debug, Clone, PartialEq)]
pub struct LpSolution {
    /// Value of each variable, indexed by [`VarId::index`].
    pub values: Vec<f64>,

    /// Objective function value at `values`.
    pub objective: f64,

    /// Best proven lower bound. Equals `objective` unless the MIP stopped at
    /// its relative gap, and is `-inf` on a budget stop.
    pub best_bound: f64,

    /// Row duals indexed by [`RowId::index`], minimize-sense convention:
    /// `<=` rows have non-positive duals, `>=` rows non-negative. Present only
    /// for continuous models.
    pub duals: Option<Vec<f64>>,
}

impl LpSolution {
    #[must_use]
    pub fn value(&self, var: VarId) -> f64 {
        self.values[var.index()]
    }

    #[must_use]
    pub fn dual(&self, row: RowId) -> Option<f64> {
        self.duals.as_ref().map(|duals| duals[row.index()])
    }
}

/// Dual ray proving infeasibility of a continuous model.
///
/// With rows `A x (sense) b` and column bounds, the multipliers `u` satisfy
/// the sign rule of each row (`<=`: `u <= 0`, `>=`: `u >= 0`) and
/// `b^T u + bound_term > 0` while no column can compensate.
#[derive(Debug, Clone, PartialEq)]
pub struct FarkasCertificate {
    /// Multiplier per row, indexed by [`RowId::index`].
    pub rows: Vec<f64>,

    /// Contribution of finite, non-zero column bounds to the ray value.
    pub bound_term: f64,
}

impl FarkasCertificate {
    #[must_use]
    pub fn row(&self, row: RowId) -> f64 {
        self.rows[row.index()]
    }
}

/// Hook invoked by [`Solver::solve_with_callback`] at each incumbent.
pub trait IncumbentCallback {
    /// Inspect the incumbent and optionally inject lazy cuts.
    ///
    /// # Errors
    ///
    /// Any error aborts the search and is returned by the solver.
    fn on_incumbent(&mut self, context: &mut IncumbentContext<'_>) -> Result<()>;
}

/// View of the current incumbent handed to an [`IncumbentCallback`].
#[derive(Debug)]
pub struct IncumbentContext<'a> {
    values: &'a [f64],
    objective: f64,
    best_bound: f64,
    injected: Vec<Constraint>,
}

impl<'a> IncumbentContext<'a> {
    #[must_use]
    pub fn new(values: &'a [f64], objective: f64, best_bound: f64) -> Self {
        Self {
            values,
            objective,
            best_bound,
            injected: Vec::new(),
        }
    }

    #[must_use]
    pub fn value(&self, var: VarId) -> f64 {
        self.values[var.index()]
    }

    #[must_use]
    pub const fn values(&self) -> &[f64] {
        self.values
    }

    #[must_use]
    pub const fn objective(&self) -> f64 {
        self.objective
    }

    #[must_use]
    pub const fn best_bound(&self) -> f64 {
        self.best_bound
    }

    /// Add a lazy constraint to the running search.
    pub fn inject_cut(&mut self, terms: Vec<(VarId, f64)>, sense: ConstraintSense, rhs: f64) {
        let name = format!("lazy.{}", self.injected.len());
        self.injected.push(Constraint {
            name,
            terms,
            sense,
            rhs,
        });
    }

    /// Constraints injected so far in this invocation.
    #[must_use]
    pub fn injected(&self) -> &[Constraint] {
        &self.injected
    }

    #[must_use]
    pub fn into_injected(self) -> Vec<Constraint> {
        self.injected
    }
}
