//! Adapters at the edges of the crate.
//!
//! - [`inbound`] - instance readers and the command-line interface
//! - [`outbound`] - solver backends implementing [`crate::port::Solver`]

pub mod inbound;
pub mod outbound;
