//! Benchmark parameter types.

use std::fmt;

use thredge_core::CovarianceBackend;

/// Parameters for a sampling benchmark run.
#[derive(Clone, Copy, Debug)]
pub struct SamplingBenchParams {
    /// Number of vertices.
    pub vertices: usize,
    /// Covariance between edges that share one endpoint.
    pub correlation: f64,
    /// Target expected degree.
    pub mean_degree: f64,
    /// Graphs drawn per iteration.
    pub samples: usize,
    /// Backend that draws latent weights.
    pub backend: CovarianceBackend,
}

impl fmt::Display for SamplingBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "n={},b={},samples={},{:?}",
            self.vertices, self.correlation, self.samples, self.backend
        )
    }
}

/// Parameters for a covariance construction benchmark run.
#[derive(Clone, Copy, Debug)]
pub struct CovarianceBenchParams {
    /// Number of vertices.
    pub vertices: usize,
    /// Covariance between edges that share one endpoint.
    pub correlation: f64,
}

impl CovarianceBenchParams {
    /// Number of latent edge weights, and so the side of the covariance.
    #[must_use]
    pub const fn edge_count(&self) -> usize {
        self.vertices * self.vertices.saturating_sub(1) / 2
    }
}

impl fmt::Display for CovarianceBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={},m={}", self.vertices, self.edge_count())
    }
}
