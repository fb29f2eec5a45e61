//! Summary statistics for Monte Carlo assertions.

/// Sample mean and standard error of the mean.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SampleSummary {
    /// Number of observations.
    pub count: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Unbiased sample variance. Zero for fewer than two observations.
    pub variance: f64,
}

impl SampleSummary {
    /// Summarises `values` with Welford's streaming update.
    ///
    /// ```
    /// use thredge_test_support::stats::SampleSummary;
    ///
    /// let summary = SampleSummary::from_values([1.0, 2.0, 3.0, 4.0]);
    /// assert_eq!(summary.mean, 2.5);
    /// assert!((summary.variance - 5.0 / 3.0).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let mut count = 0_usize;
        let mut mean = 0.0_f64;
        let mut sum_squares = 0.0_f64;
        for value in values {
            count += 1;
            let delta = value - mean;
            mean += delta / count as f64;
            sum_squares += delta * (value - mean);
        }
        let variance = if count > 1 {
            sum_squares / (count - 1) as f64
        } else {
            0.0
        };
        Self {
            count,
            mean,
            variance,
        }
    }

    /// Standard error of the mean.
    #[must_use]
    pub fn standard_error(&self) -> f64 {
        if self.count == 0 {
            return f64::INFINITY;
        }
        (self.variance / self.count as f64).sqrt()
    }

    /// Whether `expected` lies within `sigmas` standard errors of the mean.
    #[must_use]
    pub fn is_consistent_with(&self, expected: f64, sigmas: f64) -> bool {
        (self.mean - expected).abs() <= sigmas * self.standard_error()
    }
}
