//! `inspect` subcommand.

use serde_json::json;
use tabled::{Table, Tabled};

use super::command::InspectArgs;
use super::output;
use crate::adapter::inbound::instance::read_instance;
use crate::domain::ProblemData;
use crate::error::Result;

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "Item")]
    item: usize,
    #[tabled(rename = "Demand")]
    demand: String,
    #[tabled(rename = "Setup cost")]
    setup_cost: String,
    #[tabled(rename = "Holding")]
    holding: String,
    #[tabled(rename = "Max lot (t=0)")]
    max_lot: String,
}

/// Aggregates shown by `inspect`.
struct Profile {
    total_demand: f64,
    total_capacity: f64,
    /// Capacity needed by production alone, as a share of the total.
    utilization: f64,
}

impl Profile {
    fn of(data: &ProblemData) -> Self {
        let (items, periods) = (data.n_items(), data.n_periods());
        let mut total_demand = 0.0;
        let mut load = 0.0;
        for j in 0..items {
            for t in 0..periods {
                total_demand += data.demand(j, t);
                load += data.resource_usage(j, t) * data.demand(j, t);
            }
        }
        let total_capacity: f64 = (0..periods).map(|t| data.capacity(t)).sum();
        let utilization = if total_capacity > 0.0 {
            load / total_capacity
        } else {
            f64::INFINITY
        };
        Self {
            total_demand,
            total_capacity,
            utilization,
        }
    }
}

/// Print instance dimensions and derived quantities.
///
/// # Errors
///
/// Returns an error if the instance cannot be read.
pub fn execute(args: &InspectArgs) -> Result<()> {
    let data = read_instance(&args.instance, args.format)?;
    let profile = Profile::of(&data);
    let (items, periods) = (data.n_items(), data.n_periods());

    if output::is_json() {
        let max_production: Vec<Vec<f64>> = (0..items)
            .map(|j| (0..periods).map(|t| data.max_production(j, t)).collect())
            .collect();
        output::json_output(&json!({
            "instance": args.instance.display().to_string(),
            "format": args.format.to_string(),
            "items": items,
            "periods": periods,
            "total_demand": profile.total_demand,
            "total_capacity": profile.total_capacity,
            "utilization": profile.utilization,
            "capacity": (0..periods).map(|t| data.capacity(t)).collect::<Vec<_>>(),
            "max_production": max_production,
        }));
        return Ok(());
    }
    if output::is_quiet() {
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::field("instance", args.instance.display());
    output::field("format", args.format);
    output::field("items", items);
    output::field("periods", periods);
    output::field("demand", format!("{:.2}", profile.total_demand));
    output::field("capacity", format!("{:.2}", profile.total_capacity));
    output::field("utilization", format!("{:.1}%", profile.utilization * 100.0));

    output::section("Items");
    let rows = (0..items).map(|j| ItemRow {
        item: j,
        demand: format!("{:.2}", data.cumulative_demand(j, 0)),
        setup_cost: format!("{:.2}", mean((0..periods).map(|t| data.setup_cost(j, t)))),
        holding: format!("{:.2}", mean((0..periods).map(|t| data.holding_cost(j, t)))),
        max_lot: format!("{:.2}", data.max_production(j, 0)),
    });
    output::lines(&Table::new(rows).to_string());

    if profile.utilization > 1.0 {
        output::warning("demand exceeds total capacity");
    } else {
        output::note("max lot is the remaining demand capped by capacity net of setup usage");
    }
    Ok(())
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::InstanceParams;

    #[test]
    fn profile_measures_load_against_capacity() {
        let mut params = InstanceParams::uniform(1, 2);
        params.demand = vec![vec![5.0, 5.0]];
        params.resource_usage = vec![vec![2.0, 2.0]];
        params.capacity = vec![10.0, 10.0];
        let data = ProblemData::try_new(params).unwrap();

        let profile = Profile::of(&data);
        assert_eq!(profile.total_demand, 10.0);
        assert_eq!(profile.total_capacity, 20.0);
        assert!((profile.utilization - 1.0).abs() < 1e-12);
    }

    #[test]
    fn mean_of_empty_is_zero() {
        assert_eq!(mean(std::iter::empty()), 0.0);
        assert_eq!(mean([1.0, 3.0].into_iter()), 2.0);
    }
}
