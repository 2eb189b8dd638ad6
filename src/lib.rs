//! Lotsizing-benders - Benders decomposition for capacitated lot sizing.
//!
//! This crate solves the multi-item capacitated lot-sizing problem with setup
//! times by splitting it into a binary setup master and a continuous
//! production subproblem, connected by optimality and feasibility cuts.
//!
//! # Architecture
//!
//! The crate follows a hexagonal layout:
//!
//! - **`domain`** - Instance data, index grids, LP model description and cuts
//! - **`port`** - The [`port::Solver`] trait and solve outcomes
//! - **`application`** - The decomposition itself and a monolithic baseline
//!   - `benders::InOutStabilizer` - Stabilized cut loop on the master relaxation
//!   - `benders::BendersDriver` - Loop and lazy-callback integer phases
//! - **`adapter`** - HiGHS backend, instance readers and the CLI
//! - **`infrastructure`** - Configuration loading and logging setup
//!
//! # Example
//!
//! ```no_run
//! use lotsizing_benders::adapter::inbound::{read_instance, InstanceFormat};
//! use lotsizing_benders::adapter::outbound::solver::HighsSolver;
//! use lotsizing_benders::application::benders::{BendersConfig, BendersDriver};
//!
//! fn main() -> lotsizing_benders::error::Result<()> {
//!     let data = read_instance("tr6-15.dat", InstanceFormat::Trigeiro)?;
//!     let solver = HighsSolver::new();
//!     let report = BendersDriver::new(&data, &solver, BendersConfig::default(), Default::default())
//!         .run()?;
//!     println!("{} {:?}", report.status, report.upper_bound);
//!     Ok(())
//! }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;
