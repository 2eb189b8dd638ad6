//! Small instances with known structure.

use lotsizing_benders::domain::{Grid, InstanceParams, ProblemData};

/// One item, two periods. Holding five units (cost 5) beats a second setup
/// (cost 10), so the optimum is 15 with setups `[1, 0]`.
pub fn two_period() -> ProblemData {
    let mut params = InstanceParams::uniform(1, 2);
    params.demand = vec![vec![5.0, 5.0]];
    params.setup_cost = vec![vec![10.0, 10.0]];
    params.holding_cost = vec![vec![1.0, 1.0]];
    params.capacity = vec![10.0, 10.0];
    ProblemData::try_new(params).unwrap()
}

/// First-period demand exceeds first-period capacity with no initial stock.
pub fn tight_capacity() -> ProblemData {
    let mut params = InstanceParams::uniform(1, 2);
    params.demand = vec![vec![8.0, 2.0]];
    params.setup_cost = vec![vec![10.0, 10.0]];
    params.holding_cost = vec![vec![1.0, 1.0]];
    params.capacity = vec![5.0, 10.0];
    ProblemData::try_new(params).unwrap()
}

/// One item, three periods with setup times: setup plans without a first
/// period setup, and `[1, 0, 0]`, are infeasible.
pub fn three_period() -> ProblemData {
    let mut params = InstanceParams::uniform(1, 3);
    params.demand = vec![vec![4.0, 6.0, 5.0]];
    params.setup_cost = vec![vec![12.0, 12.0, 12.0]];
    params.holding_cost = vec![vec![1.0, 1.0, 1.0]];
    params.setup_usage = vec![vec![2.0, 2.0, 2.0]];
    params.capacity = vec![12.0, 10.0, 10.0];
    ProblemData::try_new(params).unwrap()
}

/// Three items, four periods, shared capacity and setup times.
pub fn multi_item() -> ProblemData {
    let mut params = InstanceParams::uniform(3, 4);
    params.demand = vec![
        vec![20.0, 0.0, 30.0, 10.0],
        vec![10.0, 25.0, 0.0, 20.0],
        vec![0.0, 15.0, 15.0, 15.0],
    ];
    params.setup_cost = vec![vec![100.0; 4], vec![80.0; 4], vec![60.0; 4]];
    params.holding_cost = vec![vec![1.0; 4], vec![2.0; 4], vec![1.5; 4]];
    params.setup_usage = vec![vec![5.0; 4], vec![10.0; 4], vec![5.0; 4]];
    params.capacity = vec![60.0; 4];
    ProblemData::try_new(params).unwrap()
}

/// Every 0/1 setup plan for a single-item instance with `periods` periods.
pub fn all_plans(periods: usize) -> Vec<Grid<f64>> {
    (0..1usize << periods)
        .map(|mask| Grid::from_fn(1, periods, |_, t| ((mask >> t) & 1) as f64))
        .collect()
}

/// Text of the two-period instance in the Trigeiro layout (`a h m f` rows).
pub const TWO_PERIOD_TRIGEIRO: &str = "\
1 2
10
1 1 0 10
5
5
";
