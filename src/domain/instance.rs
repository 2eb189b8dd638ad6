//! Lot-sizing instance data.

use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::grid::Grid;

/// Raw instance parameters, indexed `[item][period]`.
///
/// This is the unvalidated input shape produced by instance readers and
/// tests. Convert it with [`ProblemData::try_new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceParams {
    pub items: usize,
    pub periods: usize,
    /// Demand `d[j][t]`.
    pub demand: Vec<Vec<f64>>,
    /// Setup cost `f[j][t]`.
    pub setup_cost: Vec<Vec<f64>>,
    /// Unit production cost `c[j][t]`.
    pub production_cost: Vec<Vec<f64>>,
    /// Unit holding cost per period `h[j][t]`.
    pub holding_cost: Vec<Vec<f64>>,
    /// Capacity consumed per unit produced `a[j][t]`.
    pub resource_usage: Vec<Vec<f64>>,
    /// Capacity consumed by a setup `m[j][t]`.
    pub setup_usage: Vec<Vec<f64>>,
    /// Capacity `cap[t]`.
    pub capacity: Vec<f64>,
}

impl InstanceParams {
    /// Parameters with every table at zero except unit resource usage.
    #[must_use]
    pub fn uniform(items: usize, periods: usize) -> Self {
        let zeros = vec![vec![0.0; periods]; items];
        Self {
            items,
            periods,
            demand: zeros.clone(),
            setup_cost: zeros.clone(),
            production_cost: zeros.clone(),
            holding_cost: zeros.clone(),
            resource_usage: vec![vec![1.0; periods]; items],
            setup_usage: zeros,
            capacity: vec![0.0; periods],
        }
    }
}

/// Validated, immutable instance with derived quantities.
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemData {
    demand: Grid<f64>,
    setup_cost: Grid<f64>,
    production_cost: Grid<f64>,
    holding_cost: Grid<f64>,
    resource_usage: Grid<f64>,
    setup_usage: Grid<f64>,
    capacity: Vec<f64>,
    cumulative_demand: Grid<f64>,
    max_production: Grid<f64>,
}

impl ProblemData {
    /// Validate parameters and compute cumulative demand and production caps.
    ///
    /// # Errors
    ///
    /// Returns a [`DomainError`] when the instance is empty, a table has the
    /// wrong shape, or a value is negative or not finite.
    pub fn try_new(params: InstanceParams) -> Result<Self, DomainError> {
        let InstanceParams {
            items,
            periods,
            demand,
            setup_cost,
            production_cost,
            holding_cost,
            resource_usage,
            setup_usage,
            capacity,
        } = params;

        if items == 0 || periods == 0 {
            return Err(DomainError::EmptyInstance { items, periods });
        }

        let demand = table("demand", demand, items, periods)?;
        let setup_cost = table("setup_cost", setup_cost, items, periods)?;
        let production_cost = table("production_cost", production_cost, items, periods)?;
        let holding_cost = table("holding_cost", holding_cost, items, periods)?;
        let resource_usage = table("resource_usage", resource_usage, items, periods)?;
        let setup_usage = table("setup_usage", setup_usage, items, periods)?;

        if capacity.len() != periods {
            return Err(DomainError::DimensionMismatch {
                field: "capacity",
                expected: periods.to_string(),
                actual: capacity.len().to_string(),
            });
        }
        for (t, &value) in capacity.iter().enumerate() {
            check_value("capacity", t.to_string(), value)?;
        }

        let mut cumulative_demand = Grid::filled(items, periods, 0.0);
        for j in 0..items {
            let mut acc = 0.0;
            for t in (0..periods).rev() {
                acc += demand[(j, t)];
                cumulative_demand[(j, t)] = acc;
            }
        }

        let max_production = Grid::from_fn(items, periods, |j, t| {
            let usage = resource_usage[(j, t)];
            let by_capacity = if usage > 0.0 {
                (capacity[t] - setup_usage[(j, t)]) / usage
            } else {
                f64::INFINITY
            };
            by_capacity.min(cumulative_demand[(j, t)]).max(0.0)
        });

        Ok(Self {
            demand,
            setup_cost,
            production_cost,
            holding_cost,
            resource_usage,
            setup_usage,
            capacity,
            cumulative_demand,
            max_production,
        })
    }

    #[must_use]
    pub const fn n_items(&self) -> usize {
        self.demand.items()
    }

    #[must_use]
    pub const fn n_periods(&self) -> usize {
        self.demand.periods()
    }

    #[must_use]
    pub fn demand(&self, item: usize, period: usize) -> f64 {
        self.demand[(item, period)]
    }

    #[must_use]
    pub fn setup_cost(&self, item: usize, period: usize) -> f64 {
        self.setup_cost[(item, period)]
    }

    #[must_use]
    pub fn production_cost(&self, item: usize, period: usize) -> f64 {
        self.production_cost[(item, period)]
    }

    #[must_use]
    pub fn holding_cost(&self, item: usize, period: usize) -> f64 {
        self.holding_cost[(item, period)]
    }

    #[must_use]
    pub fn resource_usage(&self, item: usize, period: usize) -> f64 {
        self.resource_usage[(item, period)]
    }

    #[must_use]
    pub fn setup_usage(&self, item: usize, period: usize) -> f64 {
        self.setup_usage[(item, period)]
    }

    #[must_use]
    pub fn capacity(&self, period: usize) -> f64 {
        self.capacity[period]
    }

    /// Demand of `item` from `period` to the end of the horizon.
    #[must_use]
    pub fn cumulative_demand(&self, item: usize, period: usize) -> f64 {
        self.cumulative_demand[(item, period)]
    }

    /// Tightest valid bound on production of `item` in `period`.
    #[must_use]
    pub fn max_production(&self, item: usize, period: usize) -> f64 {
        self.max_production[(item, period)]
    }

    #[must_use]
    pub const fn setup_costs(&self) -> &Grid<f64> {
        &self.setup_cost
    }

    #[must_use]
    pub const fn demands(&self) -> &Grid<f64> {
        &self.demand
    }

    /// Setup cost paid by a setup plan, counting cells with `y > 0.5`.
    #[must_use]
    pub fn fixed_setup_cost(&self, setups: &Grid<f64>) -> f64 {
        self.setup_cost
            .iter()
            .filter(|(cell, _)| setups[*cell] > 0.5)
            .map(|(_, f)| *f)
            .sum()
    }

    /// Unit cost of producing `item` in `period` for demand of `target`.
    ///
    /// Production is carried as inventory from `period` to `target`.
    #[must_use]
    pub fn allocation_cost(&self, item: usize, period: usize, target: usize) -> f64 {
        debug_assert!(target >= period);
        (target - period) as f64 * self.holding_cost(item, period)
    }
}

fn table(
    field: &'static str,
    rows: Vec<Vec<f64>>,
    items: usize,
    periods: usize,
) -> Result<Grid<f64>, DomainError> {
    let shape_error = |actual: String| DomainError::DimensionMismatch {
        field,
        expected: format!("{items}x{periods}"),
        actual,
    };

    if rows.len() != items {
        return Err(shape_error(format!(
            "{}x{}",
            rows.len(),
            rows.first().map_or(0, Vec::len)
        )));
    }
    if let Some(row) = rows.iter().find(|row| row.len() != periods) {
        return Err(shape_error(format!("{}x{}", rows.len(), row.len())));
    }

    let grid = Grid::from_rows(rows).ok_or_else(|| shape_error("ragged".into()))?;
    for ((j, t), &value) in grid.iter() {
        if !value.is_finite() {
            return Err(DomainError::NonFinite {
                field,
                index: format!("{j}][{t}"),
            });
        }
        if value < 0.0 {
            return Err(DomainError::Negative {
                field,
                index: format!("{j}][{t}"),
                value,
            });
        }
    }
    Ok(grid)
}

fn check_value(field: &'static str, index: String, value: f64) -> Result<(), DomainError> {
    if !value.is_finite() {
        return Err(DomainError::NonFinite { field, index });
    }
    if value < 0.0 {
        return Err(DomainError::Negative {
            field,
            index,
            value,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_period() -> InstanceParams {
        let mut params = InstanceParams::uniform(1, 2);
        params.demand = vec![vec![5.0, 5.0]];
        params.setup_cost = vec![vec![10.0, 10.0]];
        params.holding_cost = vec![vec![1.0, 1.0]];
        params.capacity = vec![10.0, 10.0];
        params
    }

    #[test]
    fn cumulative_demand_runs_to_the_horizon() {
        let mut params = InstanceParams::uniform(2, 3);
        params.demand = vec![vec![1.0, 2.0, 3.0], vec![0.0, 4.0, 0.0]];
        params.capacity = vec![100.0; 3];
        let data = ProblemData::try_new(params).unwrap();

        assert_eq!(data.cumulative_demand(0, 0), 6.0);
        assert_eq!(data.cumulative_demand(0, 1), 5.0);
        assert_eq!(data.cumulative_demand(0, 2), 3.0);
        assert_eq!(data.cumulative_demand(1, 0), 4.0);
        assert_eq!(data.cumulative_demand(1, 2), 0.0);
        for j in 0..2 {
            for t in 0..2 {
                assert!(data.cumulative_demand(j, t) >= data.cumulative_demand(j, t + 1));
            }
        }
    }

    #[test]
    fn max_production_is_capped_by_capacity_and_demand() {
        let mut params = two_period();
        params.setup_usage = vec![vec![2.0, 2.0]];
        params.resource_usage = vec![vec![2.0, 1.0]];
        params.capacity = vec![10.0, 30.0];
        let data = ProblemData::try_new(params).unwrap();

        // (10 - 2) / 2 = 4 < 10
        assert_eq!(data.max_production(0, 0), 4.0);
        // (30 - 2) / 1 = 28 > 5
        assert_eq!(data.max_production(0, 1), 5.0);
    }

    #[test]
    fn max_production_never_goes_negative() {
        let mut params = two_period();
        params.setup_usage = vec![vec![20.0, 0.0]];
        let data = ProblemData::try_new(params).unwrap();
        assert_eq!(data.max_production(0, 0), 0.0);
    }

    #[test]
    fn zero_resource_usage_leaves_demand_as_the_cap() {
        let mut params = two_period();
        params.resource_usage = vec![vec![0.0, 0.0]];
        let data = ProblemData::try_new(params).unwrap();
        assert_eq!(data.max_production(0, 0), 10.0);
    }

    #[test]
    fn rejects_empty_instance() {
        let result = ProblemData::try_new(InstanceParams::uniform(0, 3));
        assert!(matches!(
            result,
            Err(DomainError::EmptyInstance { items: 0, periods: 3 })
        ));
    }

    #[test]
    fn rejects_mismatched_table() {
        let mut params = two_period();
        params.holding_cost = vec![vec![1.0]];
        let result = ProblemData::try_new(params);
        assert!(matches!(
            result,
            Err(DomainError::DimensionMismatch {
                field: "holding_cost",
                ..
            })
        ));
    }

    #[test]
    fn rejects_negative_demand() {
        let mut params = two_period();
        params.demand = vec![vec![5.0, -1.0]];
        let result = ProblemData::try_new(params);
        assert!(matches!(
            result,
            Err(DomainError::Negative { field: "demand", .. })
        ));
    }

    #[test]
    fn rejects_non_finite_capacity() {
        let mut params = two_period();
        params.capacity = vec![f64::NAN, 10.0];
        let result = ProblemData::try_new(params);
        assert!(matches!(
            result,
            Err(DomainError::NonFinite {
                field: "capacity",
                ..
            })
        ));
    }

    #[test]
    fn fixed_setup_cost_counts_open_setups() {
        let data = ProblemData::try_new(two_period()).unwrap();
        let setups = Grid::from_rows(vec![vec![1.0, 0.0]]).unwrap();
        assert_eq!(data.fixed_setup_cost(&setups), 10.0);
        assert_eq!(data.allocation_cost(0, 0, 1), 1.0);
    }
}
