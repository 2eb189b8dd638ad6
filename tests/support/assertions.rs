pub fn assert_near(actual: f64, expected: f64, tolerance: f64) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "expected {} ± {}, got {}",
        expected,
        tolerance,
        actual
    );
}

/// Relative comparison with a floor of 1 on the scale.
pub fn assert_rel_near(actual: f64, expected: f64, tolerance: f64) {
    assert_near(actual, expected, tolerance * expected.abs().max(1.0));
}
