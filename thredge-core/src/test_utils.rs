//! Shared test utilities for `thredge-core`.

use proptest::test_runner::Config as ProptestConfig;
use thredge_test_support::ci::property_test_profile::ProptestRunProfile;

/// Builds a standard proptest configuration from the shared CI profile.
#[must_use]
pub(crate) fn suite_proptest_config(default_cases: u32) -> ProptestConfig {
    let profile = ProptestRunProfile::load(default_cases, false);
    ProptestConfig {
        cases: profile.cases(),
        fork: profile.fork(),
        ..ProptestConfig::default()
    }
}

/// Asserts that two matrices agree entry by entry within `tolerance`.
pub(crate) fn assert_matrix_close(
    actual: &nalgebra::DMatrix<f64>,
    expected: &nalgebra::DMatrix<f64>,
    tolerance: f64,
) {
    assert_eq!(actual.shape(), expected.shape(), "shape mismatch");
    for row in 0..actual.nrows() {
        for col in 0..actual.ncols() {
            let (a, e) = (actual[(row, col)], expected[(row, col)]);
            assert!(
                (a - e).abs() <= tolerance,
                "entry ({row}, {col}) differs: {a} vs {e}"
            );
        }
    }
}
