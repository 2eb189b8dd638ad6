//! Cross-checks the subproblem duals against an explicitly built dual LP.

mod support;

use lotsizing_benders::adapter::outbound::solver::HighsSolver;
use lotsizing_benders::application::benders::{
    CutBuilder, Subproblem, SubproblemDuals, SubproblemResult,
};
use lotsizing_benders::domain::{
    Constraint, Grid, LpModel, ProblemData, Triangle, VarId, VarKind, VariableBounds,
};
use lotsizing_benders::port::{SolveOutcome, Solver};

use support::assertions::assert_near;
use support::instances;

const NON_POSITIVE: VariableBounds = VariableBounds {
    lower: None,
    upper: Some(0.0),
};

/// `max sum lambda (cap - m y) + sum omega d + sum epsilon d y`
/// s.t. `omega[j][r] + a[j][t] lambda[t] + epsilon[j][t][r] <= (r - t) h[j][t]`,
/// solved as a minimization of the negated objective.
struct ExplicitDual {
    model: LpModel,
    capacity: Vec<VarId>,
    demand: Grid<VarId>,
    logic: Triangle<VarId>,
}

impl ExplicitDual {
    fn build(data: &ProblemData, setups: &Grid<f64>) -> Self {
        let (items, periods) = (data.n_items(), data.n_periods());
        let mut model = LpModel::new();

        let capacity = (0..periods)
            .map(|t| {
                let used: f64 = (0..items).map(|j| data.setup_usage(j, t) * setups[(j, t)]).sum();
                model.add_variable(
                    format!("lambda.{t}"),
                    VarKind::Continuous,
                    NON_POSITIVE,
                    -(data.capacity(t) - used),
                )
            })
            .collect::<Vec<_>>();
        let demand = Grid::from_fn(items, periods, |j, r| {
            model.add_variable(
                format!("omega.{j}.{r}"),
                VarKind::Continuous,
                VariableBounds::free(),
                -data.demand(j, r),
            )
        });
        let logic = Triangle::from_fn(items, periods, |j, t, r| {
            model.add_variable(
                format!("epsilon.{j}.{t}.{r}"),
                VarKind::Continuous,
                NON_POSITIVE,
                -data.demand(j, r) * setups[(j, t)],
            )
        });

        for ((j, t, r), epsilon) in logic.iter() {
            model
                .add_constraint(Constraint::leq(
                    format!("z.{j}.{t}.{r}"),
                    vec![
                        (demand[(j, r)], 1.0),
                        (capacity[t], data.resource_usage(j, t)),
                        (*epsilon, 1.0),
                    ],
                    data.allocation_cost(j, t, r),
                ))
                .unwrap();
        }

        Self {
            model,
            capacity,
            demand,
            logic,
        }
    }

    /// Dual objective value and multipliers.
    fn solve(&self, solver: &dyn Solver) -> (f64, SubproblemDuals) {
        let SolveOutcome::Optimal(solution) = solver.solve(&self.model).unwrap() else {
            panic!("explicit dual must be solvable for a feasible plan");
        };
        let duals = SubproblemDuals {
            capacity: self.capacity.iter().map(|v| solution.value(*v)).collect(),
            demand: self.demand.map(|v| solution.value(*v)),
            logic: self.logic.map(|v| solution.value(*v)),
        };
        (-solution.objective, duals)
    }
}

fn dual_objective(data: &ProblemData, setups: &Grid<f64>, duals: &SubproblemDuals) -> f64 {
    let capacity: f64 = duals
        .capacity
        .iter()
        .enumerate()
        .map(|(t, lambda)| {
            let used: f64 = (0..data.n_items())
                .map(|j| data.setup_usage(j, t) * setups[(j, t)])
                .sum();
            lambda * (data.capacity(t) - used)
        })
        .sum();
    let demand: f64 = duals
        .demand
        .iter()
        .map(|((j, r), omega)| omega * data.demand(j, r))
        .sum();
    let logic: f64 = duals
        .logic
        .iter()
        .map(|((j, t, r), epsilon)| epsilon * data.demand(j, r) * setups[(j, t)])
        .sum();
    capacity + demand + logic
}

fn primal_cost(
    data: &ProblemData,
    solver: &dyn Solver,
    setups: &Grid<f64>,
) -> (f64, SubproblemDuals) {
    let mut subproblem = Subproblem::new(data).unwrap();
    match subproblem.solve(solver, setups).unwrap() {
        SubproblemResult::Optimal { cost, duals } => (cost, duals),
        SubproblemResult::Infeasible { .. } => panic!("plan must be feasible"),
    }
}

fn feasible_plans() -> Vec<(ProblemData, Grid<f64>)> {
    vec![
        (instances::two_period(), Grid::from_rows(vec![vec![1.0, 0.0]]).unwrap()),
        (instances::two_period(), Grid::filled(1, 2, 1.0)),
        (
            instances::three_period(),
            Grid::from_rows(vec![vec![1.0, 0.0, 1.0]]).unwrap(),
        ),
        (instances::multi_item(), Grid::filled(3, 4, 1.0)),
    ]
}

#[test]
fn explicit_dual_matches_primal_cost() {
    let solver = HighsSolver::new();
    for (data, setups) in feasible_plans() {
        let (cost, _) = primal_cost(&data, &solver, &setups);
        let (dual_value, _) = ExplicitDual::build(&data, &setups).solve(&solver);
        assert_near(dual_value, cost, 1e-6);
    }
}

#[test]
fn solver_duals_are_dual_optimal() {
    let solver = HighsSolver::new();
    for (data, setups) in feasible_plans() {
        let (cost, duals) = primal_cost(&data, &solver, &setups);

        assert_near(dual_objective(&data, &setups, &duals), cost, 1e-6);
        for ((j, t, r), epsilon) in duals.logic.iter() {
            let reduced = data.allocation_cost(j, t, r)
                - duals.demand[(j, r)]
                - data.resource_usage(j, t) * duals.capacity[t]
                - epsilon;
            assert!(reduced >= -1e-6, "dual infeasible at z.{j}.{t}.{r}: {reduced}");
        }
    }
}

#[test]
fn cuts_from_either_dual_are_tight_and_valid() {
    let solver = HighsSolver::new();
    let data = instances::three_period();
    let plans = instances::all_plans(3);
    let at = Grid::from_rows(vec![vec![1.0, 1.0, 0.0]]).unwrap();
    let builder = CutBuilder::new(&data);

    let (cost, solver_duals) = primal_cost(&data, &solver, &at);
    let (_, explicit_duals) = ExplicitDual::build(&data, &at).solve(&solver);

    for duals in [solver_duals, explicit_duals] {
        let cut = builder.optimality(&duals, cost, &at);
        assert!(cut.violation(&at, cost).abs() < 1e-6);

        for plan in &plans {
            let mut subproblem = Subproblem::new(&data).unwrap();
            if let SubproblemResult::Optimal { cost: other, .. } =
                subproblem.solve(&solver, plan).unwrap()
            {
                assert!(
                    cut.violation(plan, other) <= 1e-6,
                    "cut excludes {:?}",
                    plan.row(0)
                );
            }
        }
    }
}
