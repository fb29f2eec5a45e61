//! Threshold calibration against the standard normal tail.
//!
//! An edge is present when its standard-normal weight reaches the threshold
//! `t`, so the marginal edge probability is `ccdf(t)` and the expected degree
//! is `(N - 1) * ccdf(t)`. Calibration inverts that relation with Newton's
//! method started at `t = 0`, where `ccdf(0) = 1/2`.

use std::f64::consts::{FRAC_1_SQRT_2, PI};

use tracing::{debug, instrument};

use crate::{
    Result,
    error::{ThredgeError, ensure_finite},
};

/// Complementary CDF of the standard normal distribution, `1 - Phi(x)`.
///
/// Evaluated as `erfc(x / sqrt(2)) / 2`, which equals
/// `1 - (1 + erf(x / sqrt(2))) / 2` but keeps full relative precision in the
/// upper tail.
///
/// # Examples
/// ```
/// use thredge_core::ccdf;
///
/// assert_eq!(ccdf(0.0), 0.5);
/// assert!(ccdf(1.0) < ccdf(0.5));
/// ```
#[must_use]
pub fn ccdf(x: f64) -> f64 {
    0.5 * libm::erfc(x * FRAC_1_SQRT_2)
}

/// Standard normal density.
#[must_use]
pub fn standard_normal_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// Expected degree of a vertex when every edge is present with probability
/// `ccdf(threshold)`.
#[must_use]
pub fn mean_degree_for_threshold(vertices: usize, threshold: f64) -> f64 {
    vertices.saturating_sub(1) as f64 * ccdf(threshold)
}

/// Newton solver mapping mean-degree targets to thresholds.
///
/// # Examples
/// ```
/// use thredge_core::{ThresholdCalibrator, mean_degree_for_threshold};
///
/// let calibrator = ThresholdCalibrator::default();
/// let t = calibrator
///     .threshold_for_mean_degree(100, 10.0)
///     .expect("10 is inside (0, 99)");
/// assert!((mean_degree_for_threshold(100, t) - 10.0).abs() < 1e-9);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThresholdCalibrator {
    max_iterations: usize,
    tolerance: f64,
}

impl Default for ThresholdCalibrator {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-12,
        }
    }
}

impl ThresholdCalibrator {
    /// Creates a calibrator with the default iteration budget and tolerance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the maximum number of Newton steps.
    #[must_use]
    pub const fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Overrides the relative step size at which iteration stops.
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Returns the maximum number of Newton steps.
    #[must_use]
    pub const fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Returns the relative step tolerance.
    #[must_use]
    pub const fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Finds the threshold whose expected degree is `mean_degree`.
    ///
    /// # Errors
    /// Returns [`ThredgeError::NonFiniteParameter`] for a NaN or infinite
    /// target, [`ThredgeError::MeanDegreeOutOfRange`] unless
    /// `0 < mean_degree < vertices - 1`, and
    /// [`ThredgeError::CalibrationDiverged`] when Newton's method does not
    /// converge.
    #[instrument(
        name = "core.calibrate",
        err,
        skip_all,
        fields(vertices = vertices, mean_degree = mean_degree),
    )]
    pub fn threshold_for_mean_degree(&self, vertices: usize, mean_degree: f64) -> Result<f64> {
        ensure_finite("mean_degree", mean_degree)?;
        let max_degree = vertices.saturating_sub(1) as f64;
        if !(mean_degree > 0.0 && mean_degree < max_degree) {
            return Err(ThredgeError::MeanDegreeOutOfRange {
                mean_degree,
                vertices,
            });
        }
        let threshold = self.threshold_for_probability(mean_degree / max_degree)?;
        debug!(threshold, "threshold calibrated");
        Ok(threshold)
    }

    /// Solves `ccdf(t) = probability` for `t`.
    ///
    /// `ccdf` is smooth and strictly decreasing, concave below zero and convex
    /// above it, so Newton steps from `t = 0` approach the root monotonically.
    ///
    /// # Errors
    /// Returns [`ThredgeError::CalibrationDiverged`] when the iteration
    /// leaves the finite reals or exhausts its budget. Probabilities outside
    /// `(0, 1)` never converge.
    pub fn threshold_for_probability(&self, probability: f64) -> Result<f64> {
        let diverged = |iterations| ThredgeError::CalibrationDiverged {
            probability,
            iterations,
        };
        let mut t = 0.0_f64;
        for iteration in 1..=self.max_iterations {
            let slope = -standard_normal_pdf(t);
            if slope == 0.0 {
                return Err(diverged(iteration));
            }
            let step = (ccdf(t) - probability) / slope;
            t -= step;
            if !t.is_finite() {
                return Err(diverged(iteration));
            }
            if step.abs() <= self.tolerance * t.abs().max(1.0) {
                return Ok(t);
            }
        }
        Err(diverged(self.max_iterations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[test]
    fn ccdf_is_one_half_at_zero() {
        assert_eq!(ccdf(0.0), 0.5);
    }

    #[test]
    fn ccdf_matches_erf_formulation() {
        for x in [-3.0, -1.0, -0.25, 0.0, 0.4, 1.3, 2.5] {
            let via_erf = 1.0 - 0.5 * (1.0 + libm::erf(x * FRAC_1_SQRT_2));
            assert!((ccdf(x) - via_erf).abs() < 1e-14, "x = {x}");
        }
    }

    #[derive(serde::Deserialize)]
    struct ReferenceTable {
        points: Vec<ReferencePoint>,
    }

    #[derive(serde::Deserialize)]
    struct ReferencePoint {
        x: f64,
        ccdf: f64,
    }

    #[test]
    fn ccdf_matches_reference_table() {
        const RAW: &str = include_str!("fixtures/ccdf_reference.json");
        let table: ReferenceTable = serde_json::from_str(RAW).expect("fixture must parse");
        for ReferencePoint { x, ccdf: expected } in table.points {
            let relative = (ccdf(x) - expected).abs() / expected;
            assert!(relative < 1e-12, "x = {x}: {} vs {expected}", ccdf(x));
        }
    }

    #[test]
    fn ccdf_is_strictly_decreasing() {
        let grid: Vec<f64> = (-80..=80).map(|k| f64::from(k) * 0.1).collect();
        for pair in grid.windows(2) {
            assert!(ccdf(pair[0]) > ccdf(pair[1]), "not decreasing at {}", pair[0]);
        }
    }

    #[rstest]
    #[case(0.1, 1.281_551_565_544_600_5)]
    #[case(0.5, 0.0)]
    #[case(0.975, -1.959_963_984_540_054)]
    fn threshold_matches_normal_quantiles(#[case] probability: f64, #[case] expected: f64) {
        let t = ThresholdCalibrator::default()
            .threshold_for_probability(probability)
            .expect("probability is inside (0, 1)");
        assert!((t - expected).abs() < 1e-9, "t = {t}");
    }

    #[rstest]
    #[case(100, 10.0)]
    #[case(100, 0.5)]
    #[case(100, 97.0)]
    #[case(10_000, 0.01)]
    #[case(3, 1.0)]
    fn calibration_recovers_mean_degree(#[case] vertices: usize, #[case] degree: f64) {
        let t = ThresholdCalibrator::default()
            .threshold_for_mean_degree(vertices, degree)
            .expect("target is in range");
        let recovered = mean_degree_for_threshold(vertices, t);
        assert!(
            (recovered - degree).abs() <= 1e-9 * degree.max(1.0),
            "recovered {recovered} for {degree}"
        );
    }

    #[rstest]
    #[case(10, 0.0)]
    #[case(10, 9.0)]
    #[case(10, -1.0)]
    #[case(2, 1.0)]
    fn rejects_mean_degree_outside_open_interval(#[case] vertices: usize, #[case] degree: f64) {
        let err = ThresholdCalibrator::default()
            .threshold_for_mean_degree(vertices, degree)
            .expect_err("target must be rejected");
        assert_eq!(
            err,
            ThredgeError::MeanDegreeOutOfRange {
                mean_degree: degree,
                vertices
            }
        );
    }

    #[test]
    fn rejects_non_finite_mean_degree() {
        let err = ThresholdCalibrator::default()
            .threshold_for_mean_degree(10, f64::NAN)
            .expect_err("NaN must be rejected");
        assert!(matches!(
            err,
            ThredgeError::NonFiniteParameter {
                name: "mean_degree",
                ..
            }
        ));
    }

    #[test]
    fn reports_divergence_when_budget_is_exhausted() {
        let err = ThresholdCalibrator::default()
            .with_max_iterations(1)
            .threshold_for_probability(0.01)
            .expect_err("one step cannot reach the 1% quantile");
        assert_eq!(
            err,
            ThredgeError::CalibrationDiverged {
                probability: 0.01,
                iterations: 1
            }
        );
    }
}
