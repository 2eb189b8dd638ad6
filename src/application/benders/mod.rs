//! Benders decomposition for capacitated lot sizing.
//!
//! Data flow: [`ProblemData`](crate::domain::ProblemData) feeds the
//! [`MasterProblem`] and the [`Subproblem`]; the [`InOutStabilizer`] grows a
//! cut pool on the master relaxation through the [`Separator`]; the
//! [`BendersDriver`] then switches the master to binary setups and closes the
//! gap in loop or callback mode.

mod callback;
mod config;
mod cut_builder;
mod driver;
mod master;
mod report;
mod stabilization;
mod subproblem;

pub use callback::{round_setups, LazyCutCallback};
pub use config::{BendersConfig, BendersMode};
pub use cut_builder::{CutBuilder, Separation, Separator};
pub use driver::BendersDriver;
pub use master::{MasterOutcome, MasterPhase, MasterProblem, MasterSolution};
pub use report::{BendersReport, Bounds, RunStatus};
pub use stabilization::{
    Escalation, InOutStabilizer, StabilizationConfig, StabilizationReport, StabilizationStatus,
    StallPolicy,
};
pub use subproblem::{Subproblem, SubproblemDuals, SubproblemResult};
