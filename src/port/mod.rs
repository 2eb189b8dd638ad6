//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! The decomposition has a single driven dependency: an LP/MIP backend.
//! Adapters in [`crate::adapter`] implement it.

pub mod outbound;

pub use outbound::solver::{
    FarkasCertificate, IncumbentCallback, IncumbentContext, LpSolution, SolveOutcome, Solver,
};
