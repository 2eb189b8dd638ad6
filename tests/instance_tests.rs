mod support;

use std::io::Write;

use tempfile::NamedTempFile;

use lotsizing_benders::adapter::inbound::{read_instance, InstanceFormat};
use lotsizing_benders::adapter::outbound::solver::HighsSolver;
use lotsizing_benders::application::benders::{BendersConfig, BendersDriver, RunStatus};
use lotsizing_benders::error::{Error, InstanceError};

use support::assertions::assert_near;
use support::instances::TWO_PERIOD_TRIGEIRO;

fn write_instance(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp instance");
    file.write_all(contents.as_bytes()).expect("write temp instance");
    file
}

#[test]
fn trigeiro_file_round_trips_into_a_solvable_instance() {
    let file = write_instance(TWO_PERIOD_TRIGEIRO);
    let data = read_instance(file.path(), InstanceFormat::Trigeiro).unwrap();

    assert_eq!((data.n_items(), data.n_periods()), (1, 2));
    assert_eq!(data.cumulative_demand(0, 0), 10.0);

    let report = BendersDriver::new(
        &data,
        &HighsSolver::new(),
        BendersConfig::default(),
        Default::default(),
    )
    .run()
    .unwrap();
    assert_eq!(report.status, RunStatus::Optimal);
    assert_near(report.upper_bound.unwrap(), 15.0, 1e-6);
}

#[test]
fn large_file_reads_per_period_capacity() {
    // 2 items, 2 periods: each precomputed block has 2 * 3 lines
    let mut text = String::from("2 2\n0 50\n1 70\n0 1\n1 2\n");
    for (i, t, d) in [(0, 0, 4), (0, 1, 6), (1, 0, 3), (1, 1, 5)] {
        text.push_str(&format!("{i} {t} {d}\n"));
    }
    for _ in 0..12 {
        text.push_str("0 0 0 0\n");
    }
    text.push_str("0 1\n1 2\n0 30\n1 40\n");

    let file = write_instance(&text);
    let data = read_instance(file.path(), InstanceFormat::Large).unwrap();

    assert_eq!(data.setup_cost(1, 0), 70.0);
    assert_eq!(data.holding_cost(1, 1), 2.0);
    assert_eq!(data.demand(1, 1), 5.0);
    assert_eq!(data.resource_usage(1, 0), 2.0);
    assert_eq!(data.capacity(0), 30.0);
    assert_eq!(data.capacity(1), 40.0);
}

#[test]
fn negative_demand_is_a_domain_error() {
    let file = write_instance("1 2\n10\n1 1 0 10\n5\n-5\n");
    let result = read_instance(file.path(), InstanceFormat::Trigeiro);
    assert!(matches!(result, Err(Error::Domain(_))));
}

#[test]
fn short_item_row_reports_its_line() {
    let file = write_instance("1 2\n10\n1 1 0\n5\n5\n");
    match read_instance(file.path(), InstanceFormat::Trigeiro) {
        Err(Error::Instance(InstanceError::Malformed { line, .. })) => assert_eq!(line, 3),
        other => panic!("expected malformed item row, got {other:?}"),
    }
}

#[test]
fn missing_file_is_an_io_error() {
    let result = read_instance("/nonexistent/instance.dat", InstanceFormat::Trigeiro);
    assert!(matches!(result, Err(Error::Io(_))));
}
