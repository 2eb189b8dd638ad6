use std::io::Write;

use tempfile::NamedTempFile;

use lotsizing_benders::application::benders::BendersMode;
use lotsizing_benders::error::{ConfigError, Error};
use lotsizing_benders::infrastructure::config::settings::Config;

fn write_temp_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}

fn expect_invalid(toml: &str, expected_field: &str) {
    let file = write_temp_config(toml);
    match Config::load(file.path()) {
        Err(Error::Config(ConfigError::InvalidValue { field, .. })) => {
            assert_eq!(field, expected_field);
        }
        Err(err) => panic!("Expected invalid {expected_field}, got {err}"),
        Ok(_) => panic!("Expected {expected_field} to be rejected"),
    }
}

#[test]
fn config_loads_full_file() {
    let file = write_temp_config(
        r#"
[logging]
level = "debug"
format = "json"

[stabilization]
alpha = 0.3
lambda = 0.4
delta = 0.0
stall_limit = 3
max_iterations = 200
log_interval = 10

[benders]
mode = "callback"
gap_tolerance = 1e-4
max_iterations = 50
time_limit_secs = 60.0

[solver]
threads = 1
time_limit_secs = 5.0
mip_rel_gap = 0.0
incumbent_limit = 1000
"#,
    );

    let config = Config::load(file.path()).unwrap();

    assert_eq!(config.logging.format, "json");
    assert_eq!(config.stabilization.alpha, 0.3);
    assert_eq!(config.stabilization.stall_limit, 3);
    assert_eq!(config.benders.mode, BendersMode::Callback);
    assert_eq!(config.benders.time_limit().unwrap().as_secs(), 60);
    assert_eq!(config.solver.incumbent_limit, Some(1000));
}

#[test]
fn config_rejects_lambda_above_one() {
    expect_invalid("[stabilization]\nlambda = 1.5\n", "lambda");
}

#[test]
fn config_rejects_negative_delta() {
    expect_invalid("[stabilization]\ndelta = -1e-5\n", "delta");
}

#[test]
fn config_rejects_zero_gap_tolerance() {
    expect_invalid("[benders]\ngap_tolerance = 0.0\n", "gap_tolerance");
}

#[test]
fn config_rejects_non_positive_time_limit() {
    expect_invalid("[benders]\ntime_limit_secs = 0.0\n", "benders.time_limit_secs");
    expect_invalid("[solver]\ntime_limit_secs = -1.0\n", "solver.time_limit_secs");
}

#[test]
fn config_rejects_negative_mip_gap() {
    expect_invalid("[solver]\nmip_rel_gap = -0.1\n", "mip_rel_gap");
}

#[test]
fn config_rejects_unknown_log_format() {
    expect_invalid("[logging]\nformat = \"xml\"\n", "format");
}

#[test]
fn config_reports_missing_file() {
    let result = Config::load("/nonexistent/lotsizing.toml");
    assert!(matches!(result, Err(Error::Config(ConfigError::ReadFile(_)))));
}

#[test]
fn config_reports_malformed_toml() {
    let file = write_temp_config("[benders\nmode = 1\n");
    assert!(matches!(
        Config::load(file.path()),
        Err(Error::Config(ConfigError::Parse(_)))
    ));
}
