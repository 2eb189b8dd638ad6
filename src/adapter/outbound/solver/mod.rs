//! LP/MIP backends implementing the [`Solver`](crate::port::Solver) port.

pub mod farkas;
mod highs;

pub use highs::HighsSolver;
