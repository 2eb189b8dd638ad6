//! Application services (use cases).
//!
//! These services orchestrate domain logic and drive the solver port.

pub mod baseline;
pub mod benders;
