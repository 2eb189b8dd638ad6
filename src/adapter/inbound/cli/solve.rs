//! `solve` subcommand.

use tabled::{Table, Tabled};
use tracing::info;

use super::command::{Algorithm, SolveArgs};
use super::output;
use crate::adapter::inbound::instance::read_instance;
use crate::application::baseline::{solve_baseline, BaselineReport};
use crate::application::benders::{BendersDriver, BendersMode, BendersReport, RunStatus};
use crate::domain::{Grid, ProblemData};
use crate::error::Result;
use crate::infrastructure::config::settings::Config;

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "Item")]
    item: usize,
    #[tabled(rename = "Setups")]
    setups: usize,
    #[tabled(rename = "Plan")]
    plan: String,
}

/// Solve the instance with the selected algorithm and print the report.
///
/// # Errors
///
/// Returns an error if the instance cannot be read or the solver fails.
pub fn execute(args: &SolveArgs, config: &Config) -> Result<()> {
    let data = read_instance(&args.instance, args.format)?;
    let solver = config.solver.build();
    let algorithm = args.algorithm.unwrap_or(match config.benders.mode {
        BendersMode::Loop => Algorithm::Loop,
        BendersMode::Callback => Algorithm::Callback,
    });
    info!(
        instance = %args.instance.display(),
        format = %args.format,
        algorithm = ?algorithm,
        "solving instance"
    );

    output::header(env!("CARGO_PKG_VERSION"));
    output::field("instance", args.instance.display());
    output::field(
        "size",
        format!("{} items x {} periods", data.n_items(), data.n_periods()),
    );

    let spinner = output::spinner("Solving");
    let result = match algorithm.benders_mode() {
        Some(mode) => {
            let mut benders = config.benders.clone();
            benders.mode = mode;
            BendersDriver::new(&data, &solver, benders, config.stabilization.clone())
                .run()
                .map(Solved::Benders)
        }
        None => solve_baseline(&data, &solver).map(Solved::Baseline),
    };
    output::spinner_done(&spinner);
    let solved = result?;

    if output::is_json() {
        output::json_output(&solved.to_json()?);
        return Ok(());
    }
    solved.print(&data);
    Ok(())
}

enum Solved {
    Benders(BendersReport),
    Baseline(BaselineReport),
}

impl Solved {
    fn to_json(&self) -> Result<serde_json::Value> {
        Ok(match self {
            Self::Benders(report) => serde_json::to_value(report)?,
            Self::Baseline(report) => serde_json::to_value(report)?,
        })
    }

    const fn status(&self) -> RunStatus {
        match self {
            Self::Benders(report) => report.status,
            Self::Baseline(report) => report.status,
        }
    }

    fn setups(&self) -> Option<&Vec<Vec<f64>>> {
        match self {
            Self::Benders(report) => report.setups.as_ref(),
            Self::Baseline(report) => report.setups.as_ref(),
        }
    }

    fn print(&self, data: &ProblemData) {
        match self.status() {
            RunStatus::Optimal => output::success("solved to optimality"),
            RunStatus::Infeasible => output::warning("instance is infeasible"),
            RunStatus::ConvergenceTimeout => output::warning("budget exhausted before convergence"),
        }

        output::section("Summary");
        let rows = match self {
            Self::Benders(report) => benders_rows(report),
            Self::Baseline(report) => baseline_rows(report),
        };
        output::lines(&Table::new(rows).to_string());

        if let Some(setups) = self.setups() {
            output::section("Setup plan");
            let rows = setups.iter().enumerate().map(|(item, row)| PlanRow {
                item,
                setups: row.iter().filter(|y| **y > 0.5).count(),
                plan: row
                    .iter()
                    .map(|y| if *y > 0.5 { '1' } else { '.' })
                    .collect(),
            });
            output::lines(&Table::new(rows).to_string());
            if let Some(cost) = setups_cost(data, setups) {
                output::field("setup cost", format!("{cost:.4}"));
            }
        }
    }
}

fn benders_rows(report: &BendersReport) -> Vec<SummaryRow> {
    let mut rows = vec![
        row("algorithm", format!("benders ({})", report.mode)),
        row("status", report.status.to_string()),
        row("lower bound", bound_text(report.lower_bound)),
        row("upper bound", bound_text(report.upper_bound)),
        row("gap", bound_text(report.gap)),
        row("iterations", report.iterations.to_string()),
        row("optimality cuts", report.optimality_cuts.to_string()),
        row("feasibility cuts", report.feasibility_cuts.to_string()),
        row("elapsed", format!("{:.3}s", report.elapsed_secs)),
    ];
    if output::verbosity() > 0 {
        let stab = &report.stabilization;
        rows.push(row("in-out iterations", stab.iterations.to_string()));
        rows.push(row("in-out bound", format!("{:.6}", stab.bound)));
        rows.push(row(
            "in-out cuts",
            format!("{} opt / {} feas", stab.optimality_cuts, stab.feasibility_cuts),
        ));
    }
    rows
}

fn baseline_rows(report: &BaselineReport) -> Vec<SummaryRow> {
    vec![
        row("algorithm", "monolithic mip".to_string()),
        row("status", report.status.to_string()),
        row("objective", bound_text(report.objective)),
        row("lower bound", bound_text(report.lower_bound)),
        row("elapsed", format!("{:.3}s", report.elapsed_secs)),
    ]
}

fn row(metric: &'static str, value: String) -> SummaryRow {
    SummaryRow { metric, value }
}

fn bound_text(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.6}"))
}

fn setups_cost(data: &ProblemData, setups: &[Vec<f64>]) -> Option<f64> {
    Grid::from_rows(setups.to_vec()).map(|grid| data.fixed_setup_cost(&grid))
}
