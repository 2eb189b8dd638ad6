//! Lot-sizing domain types and the solver-agnostic model description.

pub mod constraint;
pub mod cut;
pub mod error;
pub mod grid;
pub mod instance;
pub mod model;

pub use constraint::{Constraint, ConstraintSense, RowId, VarId, VarKind, VariableBounds};
pub use cut::{Cut, CutKind};
pub use error::DomainError;
pub use grid::{Grid, Triangle};
pub use instance::{InstanceParams, ProblemData};
pub use model::{LpModel, Variable};
